use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{EnrichedLesson, LessonMode, LessonRecord};

/// One hour, the width of the time gates around a lesson.
pub const HOUR: i64 = 3600;

const WEEKDAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

/// Keys the classifier writes itself; stale copies from the backend are dropped.
const DERIVED_KEYS: [&str; 5] = ["time", "date", "mode", "label", "reservation_id"];

#[derive(Clone, Debug)]
pub struct LessonClassifier {
    tz: Tz,
}

impl LessonClassifier {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Decodes a `/yoga/lessons` payload leniently.
    ///
    /// Anything but an array is an empty schedule. Elements that are not
    /// lessons are skipped.
    pub fn decode(payload: Value) -> Vec<LessonRecord> {
        let Value::Array(items) = payload else {
            debug!("lesson payload is not an array, treating as empty");
            return Vec::new();
        };
        items
            .into_iter()
            .filter_map(|item| {
                serde_json::from_value::<LessonRecord>(item)
                    .map_err(|err| warn!(error = %err, "skipping malformed lesson"))
                    .ok()
            })
            .collect()
    }

    /// Mode for one lesson at `now`, with the viewer's reservation when the
    /// lesson can be unbooked.
    pub fn mode_of(lesson: &LessonRecord, now: i64, viewer: &str) -> (LessonMode, Option<i64>) {
        if now.saturating_sub(lesson.ends_at()) > HOUR {
            return (LessonMode::Completed, None);
        }
        if now > lesson.starts_at() {
            return (LessonMode::InProgress, None);
        }
        if lesson.starts_at().saturating_sub(now) < HOUR {
            return (LessonMode::StartingSoon, None);
        }
        if lesson.is_cancelled() {
            if lesson.booking_of(viewer).is_some() {
                debug!(lesson_id = lesson.id, "cancelled lesson still holds viewer reservation");
            }
            return (LessonMode::Cancelled, None);
        }
        if let Some(entry) = lesson.booking_of(viewer) {
            return (LessonMode::CancelEligible, Some(entry.reservation_id));
        }
        if lesson.users.len() as i64 >= lesson.peoples {
            return (LessonMode::Full, None);
        }
        (LessonMode::Bookable, None)
    }

    pub fn enrich(&self, mut lesson: LessonRecord, now: i64, viewer: &str) -> EnrichedLesson {
        let (mode, reservation_id) = Self::mode_of(&lesson, now, viewer);
        for key in DERIVED_KEYS {
            lesson.extra.remove(key);
        }
        EnrichedLesson {
            time: format_time_range(lesson.start_time, lesson.end_time),
            date: self.format_date(lesson.date_time),
            mode,
            label: mode.label().to_string(),
            reservation_id,
            lesson,
        }
    }

    /// Annotates every lesson and orders them by start instant.
    ///
    /// The sort is stable, lessons starting together keep their input order.
    pub fn classify(
        &self,
        lessons: Vec<LessonRecord>,
        now: i64,
        viewer: &str,
    ) -> Vec<EnrichedLesson> {
        let mut enriched: Vec<EnrichedLesson> = lessons
            .into_iter()
            .map(|lesson| self.enrich(lesson, now, viewer))
            .collect();
        enriched.sort_by_key(|item| item.lesson.starts_at());
        enriched
    }

    pub fn classify_payload(&self, payload: Value, now: i64, viewer: &str) -> Vec<EnrichedLesson> {
        self.classify(Self::decode(payload), now, viewer)
    }

    /// `M月D日周X` in the classifier's timezone.
    pub fn format_date(&self, date_time: i64) -> String {
        match self.tz.timestamp_opt(date_time, 0).single() {
            Some(date) => format!(
                "{}月{}日周{}",
                date.month(),
                date.day(),
                WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
            ),
            None => String::new(),
        }
    }
}

/// `H:MM` for a seconds-of-day offset, truncating seconds.
pub fn format_clock(seconds: i64) -> String {
    let hours = seconds.div_euclid(HOUR);
    let minutes = seconds.rem_euclid(HOUR) / 60;
    format!("{hours}:{minutes:02}")
}

pub fn format_time_range(start_time: i64, end_time: i64) -> String {
    format!("{}-{}", format_clock(start_time), format_clock(end_time))
}
