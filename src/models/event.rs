use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED_PLACEHOLDER: &str = "(No Title)";
pub const NEW_EVENT_TITLE: &str = "New event";

// Format used when events are written into a prompt, e.g. "2024-01-08 09:00:00 +0000".
pub const PROMPT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Minimal view of a calendar entry, as read from the event store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// One prompt line: "<title> from <start> to <end>".
    pub fn describe(&self) -> String {
        format!(
            "{} from {} to {}",
            self.title.as_deref().unwrap_or(UNTITLED_PLACEHOLDER),
            self.start.format(PROMPT_TIME_FORMAT),
            self.end.format(PROMPT_TIME_FORMAT)
        )
    }
}

/// An event proposed by the completion API. Not yet persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SuggestedEvent {
    pub title: String,
    #[serde(rename = "startDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endDate")]
    pub end: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub id: String,
    pub name: String,
}

/// Raw entry held by an event store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&StoredEvent> for CalendarEvent {
    fn from(stored: &StoredEvent) -> Self {
        CalendarEvent {
            title: stored.title.clone(),
            start: stored.start,
            end: stored.end,
        }
    }
}

/// Entry to be inserted into the default calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewEvent {
    pub fn placeholder_at(start: DateTime<Utc>) -> Self {
        NewEvent {
            title: NEW_EVENT_TITLE.to_string(),
            start,
            end: start + Duration::hours(1),
        }
    }
}

impl From<&SuggestedEvent> for NewEvent {
    fn from(suggestion: &SuggestedEvent) -> Self {
        NewEvent {
            title: suggestion.title.clone(),
            start: suggestion.start,
            end: suggestion.end,
        }
    }
}
