use chrono::{DateTime, Local, Weekday};
use serde::{Deserialize, Serialize};

use crate::{error::Result, schedule::Recurrence};

/// Slot a recurring notification occupies. At most one schedule per tag is live.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScheduleTag {
    DailyMotivation,
    WeeklyRandom,
}

/// Metadata attached to every notification, tagged by `type` like the payloads
/// the mobile platforms hand back on tap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationData {
    DailyMotivation { quote: String, author: String },
    WeeklyRandom { quote: String, author: String },
    Milestone { count: usize },
    FavoriteSaved { quote: String, author: String },
}

impl NotificationData {
    pub fn tag(&self) -> Option<ScheduleTag> {
        match self {
            NotificationData::DailyMotivation { .. } => Some(ScheduleTag::DailyMotivation),
            NotificationData::WeeklyRandom { .. } => Some(ScheduleTag::WeeklyRandom),
            NotificationData::Milestone { .. } | NotificationData::FavoriteSaved { .. } => None,
        }
    }

    /// Flat key/value form for platforms that only accept a JSON object.
    pub fn to_metadata(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
    pub sound: bool,
    pub badge: Option<u32>,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: NotificationData) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data,
            sound: true,
            badge: Some(1),
        }
    }

    pub fn tag(&self) -> Option<ScheduleTag> {
        self.data.tag()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Trigger {
    Immediate,
    Repeating {
        anchor: DateTime<Local>,
        every: Recurrence,
    },
    Calendar {
        weekday: Option<Weekday>,
        hour: u32,
        minute: u32,
    },
}

/// What the engine registered for a tag, including the computed first fire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub tag: ScheduleTag,
    pub trigger_time: DateTime<Local>,
    pub content: NotificationContent,
}

/// A pending entry as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledEntry {
    pub identifier: String,
    pub content: NotificationContent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Platform-specific notification adapters will implement this trait.
pub trait NotificationSink: Send + Sync {
    fn permission_status(&self) -> Result<PermissionStatus>;
    /// Prompt the user. Only called when the current status is not granted.
    fn request_permission(&self) -> Result<PermissionStatus>;
    fn scheduled(&self) -> Result<Vec<ScheduledEntry>>;
    fn cancel(&self, identifier: &str) -> Result<()>;
    fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String>;
    fn fire_now(&self, content: NotificationContent) -> Result<()>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn permission_status(&self) -> Result<PermissionStatus> {
        (**self).permission_status()
    }

    fn request_permission(&self) -> Result<PermissionStatus> {
        (**self).request_permission()
    }

    fn scheduled(&self) -> Result<Vec<ScheduledEntry>> {
        (**self).scheduled()
    }

    fn cancel(&self, identifier: &str) -> Result<()> {
        (**self).cancel(identifier)
    }

    fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String> {
        (**self).schedule(content, trigger)
    }

    fn fire_now(&self, content: NotificationContent) -> Result<()> {
        (**self).fire_now(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_serializes_with_type_discriminator() {
        let data = NotificationData::Milestone { count: 10 };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "milestone", "count": 10 }));

        let weekly = NotificationData::WeeklyRandom {
            quote: "q".into(),
            author: "a".into(),
        };
        let map = weekly.to_metadata().unwrap();
        assert_eq!(map.get("type").and_then(|v| v.as_str()), Some("weekly_random"));
        assert_eq!(map.get("author").and_then(|v| v.as_str()), Some("a"));
    }

    #[test]
    fn only_recurring_payloads_carry_a_tag() {
        let daily = NotificationContent::new(
            "t",
            "b",
            NotificationData::DailyMotivation {
                quote: "q".into(),
                author: "a".into(),
            },
        );
        assert_eq!(daily.tag(), Some(ScheduleTag::DailyMotivation));
        assert!(daily.sound);
        assert_eq!(daily.badge, Some(1));

        let saved = NotificationData::FavoriteSaved {
            quote: "q".into(),
            author: "a".into(),
        };
        assert_eq!(saved.tag(), None);
    }
}
