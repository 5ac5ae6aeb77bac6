use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::{NaiveDate, Utc};

use crate::{
    AppState,
    auth::verify_token,
    error::ApiError,
    models::{BookingResponse, ScheduleView},
    schedule::BookingPage,
    validation::{validate_class_type, validate_date},
};

#[derive(Debug, serde::Deserialize)]
pub struct ScheduleQuery {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub openid: String,
    pub class_type: Option<i32>,
    pub token: Option<String>,
}

struct Resolved {
    page: BookingPage,
    start: i64,
    now: i64,
}

fn resolve(
    state: &AppState,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    query: &ScheduleQuery,
) -> Result<Resolved, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings.auth_token, auth_header, query.token.as_deref())?;

    let page = match query.class_type {
        Some(class_type) => state.page.with_class_type(validate_class_type(class_type)?),
        None => (*state.page).clone(),
    };

    let now = Utc::now().timestamp();
    let start = match query.date {
        Some(date) => page.day_start(validate_date(date, page.today(now))?),
        None => page.today_start(now),
    };
    Ok(Resolved { page, start, now })
}

#[utoipa::path(get, path = "/", tag = "booking")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Yoga Booking API",
        "endpoints": {
            "/lessons": "Get the classified lesson schedule as JSON",
            "/lessons.ical": "Download the lesson schedule as iCal file",
            "/lessons/{id}/book": "Book a lesson",
            "/reservations/{id}/unbook": "Cancel a reservation"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "booking")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "booking")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/lessons",
    params(
        ("date" = Option<String>, Query, description = "First day to show (YYYY-MM-DD), defaults to today"),
        ("openid" = Option<String>, Query, description = "Viewer identity, empty for anonymous"),
        ("class_type" = Option<i32>, Query, description = "Lesson category, defaults to group classes"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Classified schedule", body = ScheduleView),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "booking"
)]
pub async fn get_lessons(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleView>, ApiError> {
    let Resolved { page, start, now } = resolve(&state, auth, &query)?;
    Ok(Json(page.load(start, &query.openid, now).await))
}

#[utoipa::path(
    get,
    path = "/lessons.ical",
    params(
        ("date" = Option<String>, Query, description = "First day to show (YYYY-MM-DD), defaults to today"),
        ("openid" = Option<String>, Query, description = "Viewer identity, empty for anonymous"),
        ("class_type" = Option<i32>, Query, description = "Lesson category, defaults to group classes"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No lessons found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "booking"
)]
pub async fn get_ical(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Resolved { page, start, now } = resolve(&state, auth, &query)?;
    let view = page.load(start, &query.openid, now).await;

    if view.lessons.is_empty() {
        return Err(ApiError::NotFound("No lessons found".into()));
    }

    let body = state.exporter.generate(&view.lessons);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=yoga_timetable.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/lessons/{id}/book",
    params(
        ("id" = i64, Path, description = "Lesson id"),
        ("openid" = String, Query, description = "Viewer identity"),
        ("date" = Option<String>, Query, description = "First day of the schedule to reload"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Booked, with the reloaded schedule", body = BookingResponse),
        (status = 401, description = "Invalid authentication token"),
        (status = 402, description = "Membership card required"),
        (status = 403, description = "Login or registration required"),
        (status = 502, description = "Booking backend unavailable")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "booking"
)]
pub async fn book_lesson(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(lesson_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<BookingResponse>, ApiError> {
    let Resolved { page, start, now } = resolve(&state, auth, &query)?;
    let (reservation_id, schedule) = page.book(lesson_id, &query.openid, start, now).await?;
    Ok(Json(BookingResponse {
        reservation_id,
        schedule,
    }))
}

#[utoipa::path(
    post,
    path = "/reservations/{id}/unbook",
    params(
        ("id" = i64, Path, description = "Reservation id"),
        ("openid" = String, Query, description = "Viewer identity"),
        ("date" = Option<String>, Query, description = "First day of the schedule to reload"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Cancelled, with the reloaded schedule", body = ScheduleView),
        (status = 401, description = "Invalid authentication token"),
        (status = 403, description = "Login required"),
        (status = 409, description = "Reservation could not be cancelled"),
        (status = 502, description = "Booking backend unavailable")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "booking"
)]
pub async fn unbook_reservation(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(reservation_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleView>, ApiError> {
    let Resolved { page, start, now } = resolve(&state, auth, &query)?;
    let schedule = page
        .unbook(reservation_id, &query.openid, start, now)
        .await?;
    Ok(Json(schedule))
}
