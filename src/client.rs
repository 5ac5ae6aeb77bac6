use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::classifier::LessonClassifier;
use crate::models::{LessonRecord, UserProfile};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOutcome {
    Booked { reservation_id: i64 },
    /// The backend refused the seat, which the booking page reports as a
    /// missing membership card.
    MembershipRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbookOutcome {
    Cancelled { reservation_id: i64 },
    Rejected,
}

/// Client for the `/yoga/*` endpoints of the booking backend.
#[derive(Clone)]
pub struct YogaClient {
    client: reqwest::Client,
    base_url: Arc<Url>,
}

impl YogaClient {
    pub fn new(mut base_url: Url) -> Self {
        // Relative joins would drop the last path segment otherwise.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client: reqwest::Client::new(),
            base_url: Arc::new(base_url),
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ClientError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn fetch_text(&self, url: Url) -> Result<String, ClientError> {
        tracing::debug!(%url, "backend request");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(body)
    }

    pub async fn fetch_lessons(
        &self,
        start: i64,
        openid: &str,
        class_type: i32,
    ) -> Result<Vec<LessonRecord>, ClientError> {
        let url = self.endpoint(
            "yoga/lessons",
            &[
                ("start", start.to_string()),
                ("openid", openid.to_string()),
                ("class_type", class_type.to_string()),
            ],
        )?;
        let body = self.fetch_text(url).await?;
        // Anything but a JSON array on a 2xx is an empty schedule.
        let payload = serde_json::from_str::<Value>(&body).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "lesson response is not JSON, treating as empty");
            Value::Null
        });
        Ok(LessonClassifier::decode(payload))
    }

    pub async fn book(&self, lesson_id: i64, openid: &str) -> Result<BookOutcome, ClientError> {
        let url = self.endpoint(
            "yoga/book",
            &[("id", lesson_id.to_string()), ("openid", openid.to_string())],
        )?;
        let body = self.fetch_text(url).await?;
        Ok(match parse_positive_id(&body) {
            Some(reservation_id) => BookOutcome::Booked { reservation_id },
            None => {
                tracing::info!(lesson_id, response = %body.trim(), "booking refused");
                BookOutcome::MembershipRequired
            }
        })
    }

    pub async fn unbook(
        &self,
        reservation_id: i64,
        openid: &str,
    ) -> Result<UnbookOutcome, ClientError> {
        let url = self.endpoint(
            "yoga/unbook",
            &[
                ("id", reservation_id.to_string()),
                ("openid", openid.to_string()),
            ],
        )?;
        let body = self.fetch_text(url).await?;
        Ok(match parse_positive_id(&body) {
            Some(reservation_id) => UnbookOutcome::Cancelled { reservation_id },
            None => UnbookOutcome::Rejected,
        })
    }

    pub async fn fetch_user(&self, openid: &str) -> Result<Option<UserProfile>, ClientError> {
        let url = self.endpoint("yoga/user/query", &[("openid", openid.to_string())])?;
        let body = self.fetch_text(url).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&body)? {
            value @ Value::Object(_) => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }
}

/// Reads a numeric action response; only values above zero are ids.
fn parse_positive_id(body: &str) -> Option<i64> {
    let value = body.trim().trim_matches('"').parse::<f64>().ok()?;
    (value > 0.0 && value.is_finite()).then_some(value as i64)
}
