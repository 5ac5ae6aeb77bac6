use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::ApiError;

/// Checks the gateway token from the Bearer header, falling back to the
/// `token` query parameter.
pub fn verify_token(
    expected: &str,
    auth: Option<Authorization<Bearer>>,
    query_token: Option<&str>,
) -> Result<(), ApiError> {
    let provided_token = auth
        .map(|a| a.token().to_string())
        .or_else(|| query_token.map(|s| s.to_string()));
    match provided_token {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Invalid authentication token".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_token_header() {
        let auth = Authorization::bearer("secret").unwrap();
        assert!(verify_token("secret", Some(auth), None).is_ok());
        let auth = Authorization::bearer("other").unwrap();
        assert!(verify_token("secret", Some(auth), Some("secret")).is_err());
    }

    #[test]
    fn test_verify_token_query() {
        assert!(verify_token("secret", None, Some("secret")).is_ok());
        assert!(verify_token("secret", None, Some("bad")).is_err());
        assert!(verify_token("secret", None, None).is_err());
    }
}
