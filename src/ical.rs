use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, Event, EventLike, EventStatus};

use crate::models::{EnrichedLesson, LessonMode};

#[derive(Clone, Default)]
pub struct ICalExporter;

impl ICalExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, lessons: &[EnrichedLesson]) -> Vec<u8> {
        if lessons.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name("Yoga Booking Timetable");

        for item in lessons {
            let (Some(start), Some(end)) = (
                DateTime::<Utc>::from_timestamp(item.lesson.starts_at(), 0),
                DateTime::<Utc>::from_timestamp(item.lesson.ends_at(), 0),
            ) else {
                continue;
            };

            let title = item
                .lesson
                .title()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Lesson {}", item.lesson.id));

            let mut event = Event::new();
            event.summary(&format!("{title} [{}]", item.label));
            event.starts(start);
            event.ends(end);
            if let Some(location) = item
                .lesson
                .extra
                .get("location_name")
                .and_then(|v| v.as_str())
            {
                event.location(location);
            }
            event.description(&format!("{} {}\n{}", item.date, item.time, item.label));
            if item.mode == LessonMode::Cancelled {
                event.status(EventStatus::Cancelled);
            }
            event.uid(&format!(
                "{}-{}-yoga-booking",
                item.lesson.id,
                item.lesson.starts_at()
            ));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
