use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::calendar::source::EventSource;
use crate::models::event::{NewEvent, SuggestedEvent};
use crate::models::window::DateWindow;
use crate::service::suggestion_service::EventSuggester;

pub const PLANNING_DAYS: i64 = 7;

#[derive(Debug, Default)]
pub struct PlanReport {
    pub suggested: Vec<SuggestedEvent>,
    pub saved: Vec<String>,
    pub skipped: Vec<SuggestedEvent>,
    pub failed: Vec<(SuggestedEvent, String)>,
}

/// Ask for suggestions over the coming week and save the accepted ones into the
/// default calendar. A failed save is recorded and the rest are still attempted.
pub async fn plan_week<S, A>(
    source: &EventSource,
    suggester: &S,
    now: DateTime<Utc>,
    accept: A,
) -> PlanReport
where
    S: EventSuggester + ?Sized,
    A: FnMut(&SuggestedEvent) -> bool,
{
    let suggested = suggest_week(source, suggester, now).await;
    save_accepted(source, suggested, accept).await
}

/// Suggestions for the week starting at `now`, given the events already in it.
/// Any failure is logged and reported as no suggestions.
pub async fn suggest_week<S>(source: &EventSource, suggester: &S, now: DateTime<Utc>) -> Vec<SuggestedEvent>
where
    S: EventSuggester + ?Sized,
{
    let window = DateWindow::days_from(now, PLANNING_DAYS);
    let upcoming = source.events_in(&window).await;
    info!(events = upcoming.len(), "requesting suggestions for the coming week");

    match suggester.suggest(&upcoming, &window).await {
        Ok(suggestions) => suggestions,
        Err(err) => {
            warn!(kind = ?err.kind(), "no suggestions: {}", err);
            Vec::new()
        }
    }
}

/// Save each suggestion `accept` approves, in order, continuing past failed saves.
pub async fn save_accepted<A>(source: &EventSource, suggested: Vec<SuggestedEvent>, mut accept: A) -> PlanReport
where
    A: FnMut(&SuggestedEvent) -> bool,
{
    let mut report = PlanReport::default();
    for suggestion in &suggested {
        if !accept(suggestion) {
            report.skipped.push(suggestion.clone());
            continue;
        }
        match source.save(NewEvent::from(suggestion)).await {
            Ok(id) => report.saved.push(id),
            Err(err) => {
                warn!(title = %suggestion.title, "failed to save suggestion: {}", err);
                report.failed.push((suggestion.clone(), err.to_string()));
            }
        }
    }
    report.suggested = suggested;
    report
}
