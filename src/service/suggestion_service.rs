use async_trait::async_trait;

use crate::clients::openai_client::SuggestionClient;
use crate::error::SuggestionError;
use crate::models::event::{CalendarEvent, SuggestedEvent};
use crate::models::window::DateWindow;

#[async_trait]
pub trait EventSuggester: Send + Sync {
    async fn suggest(
        &self,
        events: &[CalendarEvent],
        window: &DateWindow,
    ) -> Result<Vec<SuggestedEvent>, SuggestionError>;
}

#[async_trait]
impl EventSuggester for SuggestionClient {
    async fn suggest(
        &self,
        events: &[CalendarEvent],
        window: &DateWindow,
    ) -> Result<Vec<SuggestedEvent>, SuggestionError> {
        self.fetch_suggestions(events, window).await
    }
}
