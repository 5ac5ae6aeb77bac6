use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;
use tracing::{error, info};

use crate::classifier::LessonClassifier;
use crate::client::{BookOutcome, ClientError, UnbookOutcome, YogaClient};
use crate::models::ScheduleView;

/// Group classes on the booking tab.
pub const DEFAULT_CLASS_TYPE: i32 = 4;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Login required")]
    LoginRequired,
    #[error("Registration required before booking")]
    RegistrationRequired,
    #[error("An active membership card is required to book")]
    MembershipRequired,
    #[error("Reservation could not be cancelled")]
    UnbookRejected,
    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// The booking page: loads a schedule for a viewer and runs book/unbook
/// actions, reloading the whole schedule after each successful one.
#[derive(Clone)]
pub struct BookingPage {
    client: YogaClient,
    classifier: LessonClassifier,
    class_type: i32,
}

impl BookingPage {
    pub fn new(client: YogaClient, tz: Tz, class_type: i32) -> Self {
        Self {
            client,
            classifier: LessonClassifier::new(tz),
            class_type,
        }
    }

    /// Same page showing another lesson category.
    pub fn with_class_type(&self, class_type: i32) -> Self {
        Self {
            class_type,
            ..self.clone()
        }
    }

    pub fn class_type(&self) -> i32 {
        self.class_type
    }

    /// Epoch seconds of local midnight on `date`.
    pub fn day_start(&self, date: NaiveDate) -> i64 {
        let midnight = date.and_time(NaiveTime::MIN);
        self.classifier
            .timezone()
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| midnight.and_utc().timestamp())
    }

    pub fn today(&self, now: i64) -> NaiveDate {
        self.classifier
            .timezone()
            .timestamp_opt(now, 0)
            .single()
            .map(|dt| dt.date_naive())
            .unwrap_or_default()
    }

    pub fn today_start(&self, now: i64) -> i64 {
        self.day_start(self.today(now))
    }

    /// Fetches and classifies the schedule starting at `start`.
    ///
    /// A failed fetch is not an error for the page: it shows the holiday
    /// placeholder with no lessons.
    pub async fn load(&self, start: i64, viewer: &str, now: i64) -> ScheduleView {
        match self.client.fetch_lessons(start, viewer, self.class_type).await {
            Ok(lessons) => ScheduleView {
                start,
                holiday: false,
                lessons: self.classifier.classify(lessons, now, viewer),
            },
            Err(err) => {
                error!(error = %err, start, "failed to load lessons");
                ScheduleView {
                    start,
                    holiday: true,
                    lessons: Vec::new(),
                }
            }
        }
    }

    pub async fn book(
        &self,
        lesson_id: i64,
        viewer: &str,
        start: i64,
        now: i64,
    ) -> Result<(i64, ScheduleView), BookingError> {
        if viewer.is_empty() {
            return Err(BookingError::LoginRequired);
        }
        let registered = self
            .client
            .fetch_user(viewer)
            .await?
            .is_some_and(|user| user.is_registered());
        if !registered {
            return Err(BookingError::RegistrationRequired);
        }

        match self.client.book(lesson_id, viewer).await? {
            BookOutcome::Booked { reservation_id } => {
                info!(lesson_id, reservation_id, "lesson booked");
                Ok((reservation_id, self.load(start, viewer, now).await))
            }
            BookOutcome::MembershipRequired => Err(BookingError::MembershipRequired),
        }
    }

    pub async fn unbook(
        &self,
        reservation_id: i64,
        viewer: &str,
        start: i64,
        now: i64,
    ) -> Result<ScheduleView, BookingError> {
        if viewer.is_empty() {
            return Err(BookingError::LoginRequired);
        }
        match self.client.unbook(reservation_id, viewer).await? {
            UnbookOutcome::Cancelled { .. } => {
                info!(reservation_id, "reservation cancelled");
                Ok(self.load(start, viewer, now).await)
            }
            UnbookOutcome::Rejected => Err(BookingError::UnbookRejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn page(tz: Tz) -> BookingPage {
        BookingPage::new(
            YogaClient::new(Url::parse("http://127.0.0.1:9").unwrap()),
            tz,
            DEFAULT_CLASS_TYPE,
        )
    }

    #[test]
    fn test_day_start_is_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(page(chrono_tz::Asia::Shanghai).day_start(date), 1_741_104_000);
        assert_eq!(page(chrono_tz::UTC).day_start(date), 1_741_132_800);
    }

    #[test]
    fn test_today_start() {
        let page = page(chrono_tz::Asia::Shanghai);
        // 2025-03-05 15:30 Shanghai.
        let now = 1_741_104_000 + 15 * 3600 + 1800;
        assert_eq!(page.today(now), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(page.today_start(now), 1_741_104_000);
    }

    #[test]
    fn test_with_class_type() {
        let page = page(chrono_tz::UTC);
        assert_eq!(page.class_type(), DEFAULT_CLASS_TYPE);
        assert_eq!(page.with_class_type(2).class_type(), 2);
    }

    #[tokio::test]
    async fn test_actions_require_viewer() {
        let page = page(chrono_tz::UTC);
        assert!(matches!(
            page.book(1, "", 0, 0).await,
            Err(BookingError::LoginRequired)
        ));
        assert!(matches!(
            page.unbook(1, "", 0, 0).await,
            Err(BookingError::LoginRequired)
        ));
    }

    #[tokio::test]
    async fn test_load_unreachable_backend_is_holiday() {
        let view = page(chrono_tz::UTC).load(100, "U1", 0).await;
        assert!(view.holiday);
        assert!(view.lessons.is_empty());
        assert_eq!(view.start, 100);
    }
}
