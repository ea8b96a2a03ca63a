use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::event::{Calendar, NewEvent, StoredEvent};
use crate::models::window::DateWindow;

/// The calendar store the planner reads from and writes accepted suggestions to.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Every entry across all calendars whose interval intersects `window`.
    async fn events_matching(&self, window: &DateWindow) -> Result<Vec<StoredEvent>, StoreError>;

    async fn default_calendar(&self) -> Option<Calendar>;

    /// Insert into the default calendar and return the new entry's id.
    async fn save(&self, event: NewEvent) -> Result<String, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    NotDetermined,
    Granted,
    Denied,
    Failed,
}

#[async_trait]
pub trait AccessAuthorizer: Send + Sync {
    /// Ask the user for full access to calendar entries.
    async fn request_full_access(&self) -> Result<bool, StoreError>;
}

/// Authorizer for stores that need no user consent, such as a local file.
pub struct AlwaysGranted;

#[async_trait]
impl AccessAuthorizer for AlwaysGranted {
    async fn request_full_access(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
