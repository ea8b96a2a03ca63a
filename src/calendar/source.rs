use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::calendar::store::{AccessAuthorizer, AccessState, EventStore};
use crate::error::StoreError;
use crate::models::event::{Calendar, CalendarEvent, NewEvent};
use crate::models::window::DateWindow;

pub type StoreFactory = Box<dyn Fn() -> Result<Arc<dyn EventStore>, StoreError> + Send + Sync>;

/// Read side of the calendar: turns store entries into plain `CalendarEvent`s.
///
/// Queries never fail. Without granted access, or without an open store, they
/// come back empty.
pub struct EventSource {
    open_store: StoreFactory,
    store: Mutex<Option<Arc<dyn EventStore>>>,
    access: Mutex<AccessState>,
    timezone: Tz,
}

impl EventSource {
    pub fn new(open_store: StoreFactory, timezone: Tz) -> Self {
        Self {
            open_store,
            store: Mutex::new(None),
            access: Mutex::new(AccessState::NotDetermined),
            timezone,
        }
    }

    /// Source over an already open store that needs no consent.
    pub fn granted(store: Arc<dyn EventStore>, timezone: Tz) -> Self {
        let reopen = store.clone();
        Self {
            open_store: Box::new(move || -> Result<Arc<dyn EventStore>, StoreError> { Ok(reopen.clone()) }),
            store: Mutex::new(Some(store)),
            access: Mutex::new(AccessState::Granted),
            timezone,
        }
    }

    pub async fn access_state(&self) -> AccessState {
        *self.access.lock().await
    }

    /// Request access, then reopen the store and call `on_refresh` whatever the outcome.
    pub async fn establish_access<F>(&self, authorizer: &dyn AccessAuthorizer, on_refresh: F) -> AccessState
    where
        F: FnOnce(AccessState),
    {
        let state = match authorizer.request_full_access().await {
            Ok(true) => AccessState::Granted,
            Ok(false) => AccessState::Denied,
            Err(err) => {
                warn!("calendar access request failed: {}", err);
                AccessState::Failed
            }
        };
        *self.access.lock().await = state;

        let reopened = match (self.open_store)() {
            Ok(store) => Some(store),
            Err(err) => {
                warn!("failed to open calendar store: {}", err);
                None
            }
        };
        *self.store.lock().await = reopened;

        info!(?state, "calendar access established");
        on_refresh(state);
        state
    }

    pub async fn events_for_day(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.events_in(&DateWindow::day(date, self.timezone)).await
    }

    pub async fn events_in(&self, window: &DateWindow) -> Vec<CalendarEvent> {
        let store = match self.readable_store().await {
            Ok(store) => store,
            Err(err) => {
                warn!("calendar not readable, returning no events: {}", err);
                return Vec::new();
            }
        };

        match store.events_matching(window).await {
            Ok(stored) => {
                let mut events: Vec<CalendarEvent> = stored.iter().map(CalendarEvent::from).collect();
                events.sort_by_key(|event| (event.start, event.end));
                events
            }
            Err(err) => {
                warn!("calendar query failed, returning no events: {}", err);
                Vec::new()
            }
        }
    }

    /// The calendar new entries go to, if the store is readable.
    pub async fn default_calendar(&self) -> Option<Calendar> {
        self.readable_store().await.ok()?.default_calendar().await
    }

    pub async fn save(&self, event: NewEvent) -> Result<String, StoreError> {
        let store = self.readable_store().await?;
        store.save(event).await
    }

    async fn readable_store(&self) -> Result<Arc<dyn EventStore>, StoreError> {
        if *self.access.lock().await != AccessState::Granted {
            return Err(StoreError::AccessDenied);
        }
        self.store
            .lock()
            .await
            .as_ref()
            .cloned()
            .ok_or(StoreError::Uninitialized)
    }
}
