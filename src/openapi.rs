use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{BookingEntry, BookingResponse, EnrichedLesson, LessonRecord, ScheduleView};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_lessons,
        crate::handlers::get_ical,
        crate::handlers::book_lesson,
        crate::handlers::unbook_reservation
    ),
    components(schemas(BookingEntry, LessonRecord, EnrichedLesson, ScheduleView, BookingResponse)),
    tags(
        (name = "booking", description = "Lesson schedule and booking operations")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
