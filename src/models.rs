use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One seat taken in a lesson's roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingEntry {
    #[serde(default)]
    pub open_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reservation_id: i64,
}

/// A lesson as returned by `/yoga/lessons`.
///
/// Times are epoch seconds: `date_time` anchors the day and `start_time` /
/// `end_time` are offsets from it. Fields the backend sends beyond the ones
/// used for classification are kept in `extra` and passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LessonRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub peoples: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<BookingEntry>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

impl LessonRecord {
    pub fn starts_at(&self) -> i64 {
        self.date_time.saturating_add(self.start_time)
    }

    pub fn ends_at(&self) -> i64 {
        self.date_time.saturating_add(self.end_time)
    }

    pub fn is_cancelled(&self) -> bool {
        self.hidden == -1
    }

    pub fn booking_of(&self, viewer: &str) -> Option<&BookingEntry> {
        self.users
            .iter()
            .find(|user| user.open_id.as_deref() == Some(viewer))
    }

    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }
}

/// Display status of a lesson for one viewer.
///
/// On the wire each mode is the numeric code the mini-program switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonMode {
    Completed,
    Full,
    Cancelled,
    StartingSoon,
    InProgress,
    Bookable,
    CancelEligible,
}

impl LessonMode {
    pub const ALL: [LessonMode; 7] = [
        LessonMode::Completed,
        LessonMode::Full,
        LessonMode::Cancelled,
        LessonMode::StartingSoon,
        LessonMode::InProgress,
        LessonMode::Bookable,
        LessonMode::CancelEligible,
    ];

    pub fn code(self) -> u8 {
        match self {
            LessonMode::Completed => 1,
            LessonMode::Full => 2,
            LessonMode::Cancelled => 4,
            LessonMode::StartingSoon => 8,
            LessonMode::InProgress => 16,
            LessonMode::Bookable => 32,
            LessonMode::CancelEligible => 64,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            LessonMode::Completed => "已完成",
            LessonMode::Full => "已满额",
            LessonMode::Cancelled => "已取消",
            LessonMode::StartingSoon => "准备上课",
            LessonMode::InProgress => "正在上课",
            LessonMode::Bookable => "预约",
            LessonMode::CancelEligible => "取消预约",
        }
    }
}

impl Serialize for LessonMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for LessonMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        LessonMode::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown lesson mode {code}")))
    }
}

/// What the viewer can do with a lesson from the booking page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonAction {
    Book { lesson_id: i64 },
    Unbook { reservation_id: i64 },
}

/// A lesson annotated for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EnrichedLesson {
    #[serde(flatten)]
    pub lesson: LessonRecord,
    #[schema(example = "10:00-11:00")]
    pub time: String,
    #[schema(example = "3月5日周三")]
    pub date: String,
    #[schema(value_type = u8, example = 32)]
    pub mode: LessonMode,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
}

impl EnrichedLesson {
    pub fn action(&self) -> Option<LessonAction> {
        match (self.mode, self.reservation_id) {
            (LessonMode::Bookable, _) => Some(LessonAction::Book {
                lesson_id: self.lesson.id,
            }),
            (LessonMode::CancelEligible, Some(reservation_id)) => {
                Some(LessonAction::Unbook { reservation_id })
            }
            _ => None,
        }
    }
}

/// State of the booking page after a load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ScheduleView {
    /// Epoch seconds of the first day shown.
    pub start: i64,
    /// Set when the schedule could not be loaded.
    pub holiday: bool,
    pub lessons: Vec<EnrichedLesson>,
}

/// Registration record returned by `/yoga/user/query`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn is_registered(&self) -> bool {
        self.nick_name.as_deref().is_some_and(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingResponse {
    pub reservation_id: i64,
    pub schedule: ScheduleView,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lesson_record_defaults_missing_fields() {
        let lesson: LessonRecord = serde_json::from_value(json!({
            "id": 7,
            "date_time": 100,
            "start_time": 10,
            "end_time": 20,
            "users": null
        }))
        .unwrap();
        assert_eq!(lesson.hidden, 0);
        assert_eq!(lesson.peoples, 0);
        assert!(lesson.users.is_empty());
        assert_eq!(lesson.starts_at(), 110);
        assert_eq!(lesson.ends_at(), 120);
    }

    #[test]
    fn test_lesson_record_keeps_extra_fields() {
        let lesson: LessonRecord = serde_json::from_value(json!({
            "id": 1,
            "title": "流瑜伽",
            "teacher_name": "Lin"
        }))
        .unwrap();
        assert_eq!(lesson.title(), Some("流瑜伽"));

        let value = serde_json::to_value(&lesson).unwrap();
        assert_eq!(value["teacher_name"], "Lin");
    }

    #[test]
    fn test_mode_wire_codes() {
        let codes: Vec<u8> = LessonMode::ALL.iter().map(|m| m.code()).collect();
        assert_eq!(codes, vec![1, 2, 4, 8, 16, 32, 64]);
        assert_eq!(serde_json::to_value(LessonMode::Bookable).unwrap(), json!(32));
        assert_eq!(
            serde_json::from_value::<LessonMode>(json!(64)).unwrap(),
            LessonMode::CancelEligible
        );
        assert!(serde_json::from_value::<LessonMode>(json!(3)).is_err());
    }

    #[test]
    fn test_user_profile_registration() {
        let user: UserProfile = serde_json::from_value(json!({"id": 3, "nick_name": "Mei"})).unwrap();
        assert!(user.is_registered());
        let user: UserProfile = serde_json::from_value(json!({"id": 3, "nick_name": ""})).unwrap();
        assert!(!user.is_registered());
        assert!(!UserProfile::default().is_registered());
    }
}
