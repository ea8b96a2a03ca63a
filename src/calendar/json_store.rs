use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::calendar::store::EventStore;
use crate::error::StoreError;
use crate::models::event::{Calendar, NewEvent, StoredEvent};
use crate::models::window::DateWindow;

pub const DEFAULT_CALENDAR_ID: &str = "default";
pub const DEFAULT_CALENDAR_NAME: &str = "Calendar";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CalendarFile {
    pub default_calendar: String,
    pub calendars: Vec<Calendar>,
    pub events: HashMap<String, StoredEvent>,
}

impl Default for CalendarFile {
    fn default() -> Self {
        Self {
            default_calendar: DEFAULT_CALENDAR_ID.to_string(),
            calendars: vec![Calendar {
                id: DEFAULT_CALENDAR_ID.to_string(),
                name: DEFAULT_CALENDAR_NAME.to_string(),
            }],
            events: HashMap::new(),
        }
    }
}

impl CalendarFile {
    pub fn default_calendar(&self) -> Option<&Calendar> {
        self.calendars
            .iter()
            .find(|calendar| calendar.id == self.default_calendar)
    }
}

/// Calendar store kept in a single JSON file. Every write rewrites the file.
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<CalendarFile>,
}

impl JsonFileStore {
    /// Open the file at `path`, starting from an empty calendar if it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            CalendarFile::default()
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, data: &CalendarFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(data)?)?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn events_matching(&self, window: &DateWindow) -> Result<Vec<StoredEvent>, StoreError> {
        let data = self.data.lock().await;
        Ok(data
            .events
            .values()
            .filter(|event| window.intersects(event.start, event.end))
            .cloned()
            .collect())
    }

    async fn default_calendar(&self) -> Option<Calendar> {
        self.data.lock().await.default_calendar().cloned()
    }

    async fn save(&self, event: NewEvent) -> Result<String, StoreError> {
        if event.end < event.start {
            return Err(StoreError::InvalidEvent(format!(
                "'{}' ends before it starts",
                event.title
            )));
        }
        let mut data = self.data.lock().await;
        let calendar_id = data
            .default_calendar()
            .map(|calendar| calendar.id.clone())
            .ok_or(StoreError::NoDefaultCalendar)?;

        let id = Uuid::new_v4().to_string();
        data.events.insert(
            id.clone(),
            StoredEvent {
                id: id.clone(),
                calendar_id,
                title: Some(event.title),
                start: event.start,
                end: event.end,
            },
        );
        if let Err(err) = self.write(&data) {
            data.events.remove(&id);
            return Err(err);
        }
        info!(id = %id, "saved calendar event");
        Ok(id)
    }
}
