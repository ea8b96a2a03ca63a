use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use calendarPlanner::calendar::json_store::JsonFileStore;
use calendarPlanner::calendar::source::EventSource;
use calendarPlanner::calendar::store::{AccessAuthorizer, AccessState, EventStore};
use calendarPlanner::error::StoreError;
use calendarPlanner::models::event::{Calendar, NewEvent, StoredEvent};
use calendarPlanner::models::window::DateWindow;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Default)]
struct MemoryStore {
    events: Mutex<Vec<StoredEvent>>,
    fail_queries: bool,
}

impl MemoryStore {
    fn with_events(events: Vec<StoredEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            fail_queries: false,
        }
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn events_matching(&self, window: &DateWindow) -> Result<Vec<StoredEvent>, StoreError> {
        if self.fail_queries {
            return Err(StoreError::Uninitialized);
        }
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|event| window.intersects(event.start, event.end))
            .cloned()
            .collect())
    }

    async fn default_calendar(&self) -> Option<Calendar> {
        Some(Calendar {
            id: "home".to_string(),
            name: "Home".to_string(),
        })
    }

    async fn save(&self, event: NewEvent) -> Result<String, StoreError> {
        let mut events = self.events.lock().unwrap();
        let id = format!("e{}", events.len() + 1);
        events.push(StoredEvent {
            id: id.clone(),
            calendar_id: "home".to_string(),
            title: Some(event.title),
            start: event.start,
            end: event.end,
        });
        Ok(id)
    }
}

struct FixedAuthorizer(Result<bool, String>);

#[async_trait]
impl AccessAuthorizer for FixedAuthorizer {
    async fn request_full_access(&self) -> Result<bool, StoreError> {
        self.0.clone().map_err(StoreError::Authorization)
    }
}

fn stored(id: &str, calendar: &str, title: Option<&str>, start: (u32, u32, u32), end: (u32, u32, u32)) -> StoredEvent {
    StoredEvent {
        id: id.to_string(),
        calendar_id: calendar.to_string(),
        title: title.map(str::to_string),
        start: Utc.with_ymd_and_hms(2024, 1, start.0, start.1, start.2, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2024, 1, end.0, end.1, end.2, 0).unwrap(),
    }
}

fn january_8() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
}

#[tokio::test]
async fn day_query_returns_intersecting_events_across_calendars() {
    let store = MemoryStore::with_events(vec![
        stored("late", "work", Some("Retro"), (8, 16, 0), (8, 17, 0)),
        stored("overnight", "home", Some("Flight"), (7, 22, 0), (8, 6, 0)),
        stored("before", "home", Some("Dinner"), (7, 19, 0), (8, 0, 0)),
        stored("next", "work", Some("Standup"), (9, 0, 0), (9, 0, 15)),
        stored("early", "work", None, (8, 9, 0), (8, 9, 15)),
    ]);
    let source = EventSource::granted(Arc::new(store), Tz::UTC);

    let events = source.events_for_day(january_8()).await;
    let titles: Vec<Option<&str>> = events.iter().map(|e| e.title.as_deref()).collect();

    assert_eq!(titles, vec![Some("Flight"), None, Some("Retro")]);
}

#[test]
fn day_window_starts_at_local_midnight() {
    let window = DateWindow::day(january_8(), "America/New_York".parse::<Tz>().unwrap());
    assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 8, 5, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 1, 9, 5, 0, 0).unwrap());
}

#[test]
fn zero_length_event_at_window_start_is_included() {
    let window = DateWindow::day(january_8(), Tz::UTC);
    let midnight = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    let next_midnight = Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap();
    assert!(window.intersects(midnight, midnight));
    assert!(!window.intersects(next_midnight, next_midnight));
}

#[test]
fn last_representable_day_ends_at_the_last_instant() {
    let window = DateWindow::day(NaiveDate::MAX, Tz::UTC);
    assert_eq!(window.start, NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap().and_utc());
    assert_eq!(window.end, DateTime::<Utc>::MAX_UTC);
    assert!(window.start < window.end);
}

#[test]
fn windows_past_the_representable_range_are_clamped() {
    assert_eq!(DateWindow::days_from(DateTime::<Utc>::MAX_UTC, 7).end, DateTime::<Utc>::MAX_UTC);
    assert_eq!(DateWindow::days_from(DateTime::<Utc>::MIN_UTC, -7).end, DateTime::<Utc>::MIN_UTC);
    assert_eq!(DateWindow::days_from(Utc::now(), i64::MAX).end, DateTime::<Utc>::MAX_UTC);
}

#[tokio::test]
async fn day_query_for_the_last_representable_day_is_empty() {
    let store = MemoryStore::with_events(vec![stored("a", "home", Some("Gym"), (8, 9, 0), (8, 10, 0))]);
    let source = EventSource::granted(Arc::new(store), Tz::UTC);

    assert!(source.events_for_day(NaiveDate::MAX).await.is_empty());
}

#[tokio::test]
async fn default_calendar_follows_access() {
    let granted = EventSource::granted(Arc::new(MemoryStore::default()), Tz::UTC);
    assert_eq!(granted.default_calendar().await.map(|c| c.name), Some("Home".to_string()));

    let denied = EventSource::new(
        Box::new(|| -> Result<Arc<dyn EventStore>, StoreError> {
            let store: Arc<dyn EventStore> = Arc::new(MemoryStore::default());
            Ok(store)
        }),
        Tz::UTC,
    );
    denied.establish_access(&FixedAuthorizer(Ok(false)), |_| {}).await;
    assert_eq!(denied.default_calendar().await, None);
}

#[tokio::test]
async fn queries_are_empty_before_access_is_requested() {
    let store: Arc<dyn EventStore> = Arc::new(MemoryStore::with_events(vec![stored(
        "a", "home", Some("Gym"), (8, 9, 0), (8, 10, 0),
    )]));
    let source = EventSource::new(Box::new(move || -> Result<Arc<dyn EventStore>, StoreError> { Ok(store.clone()) }), Tz::UTC);

    assert_eq!(source.access_state().await, AccessState::NotDetermined);
    assert!(source.events_for_day(january_8()).await.is_empty());
}

#[tokio::test]
async fn granted_access_opens_store_and_refreshes() {
    let store: Arc<dyn EventStore> = Arc::new(MemoryStore::with_events(vec![stored(
        "a", "home", Some("Gym"), (8, 9, 0), (8, 10, 0),
    )]));
    let opened = Arc::new(AtomicUsize::new(0));
    let opened_counter = opened.clone();
    let source = EventSource::new(
        Box::new(move || -> Result<Arc<dyn EventStore>, StoreError> {
            opened_counter.fetch_add(1, Ordering::SeqCst);
            Ok(store.clone())
        }),
        Tz::UTC,
    );

    let mut refreshed = Vec::new();
    let state = source
        .establish_access(&FixedAuthorizer(Ok(true)), |state| refreshed.push(state))
        .await;

    assert_eq!(state, AccessState::Granted);
    assert_eq!(refreshed, vec![AccessState::Granted]);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(source.events_for_day(january_8()).await.len(), 1);
}

#[tokio::test]
async fn denied_access_still_reopens_and_refreshes() {
    let opened = Arc::new(AtomicUsize::new(0));
    let opened_counter = opened.clone();
    let source = EventSource::new(
        Box::new(move || -> Result<Arc<dyn EventStore>, StoreError> {
            opened_counter.fetch_add(1, Ordering::SeqCst);
            let store: Arc<dyn EventStore> = Arc::new(MemoryStore::with_events(vec![stored(
                "a", "home", Some("Gym"), (8, 9, 0), (8, 10, 0),
            )]));
            Ok(store)
        }),
        Tz::UTC,
    );

    let mut refreshes = 0;
    let state = source
        .establish_access(&FixedAuthorizer(Ok(false)), |_| refreshes += 1)
        .await;

    assert_eq!(state, AccessState::Denied);
    assert_eq!(refreshes, 1);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert!(source.events_for_day(january_8()).await.is_empty());
    let err = source
        .save(NewEvent::placeholder_at(Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::AccessDenied));
}

#[tokio::test]
async fn failed_access_request_is_recorded() {
    let source = EventSource::new(Box::new(|| -> Result<Arc<dyn EventStore>, StoreError> { Err(StoreError::Uninitialized) }), Tz::UTC);

    let mut refreshed = None;
    let state = source
        .establish_access(&FixedAuthorizer(Err("no entitlement".to_string())), |state| {
            refreshed = Some(state)
        })
        .await;

    assert_eq!(state, AccessState::Failed);
    assert_eq!(refreshed, Some(AccessState::Failed));
    assert!(source.events_for_day(january_8()).await.is_empty());
}

#[tokio::test]
async fn store_failure_yields_no_events() {
    let store = MemoryStore {
        events: Mutex::new(vec![stored("a", "home", Some("Gym"), (8, 9, 0), (8, 10, 0))]),
        fail_queries: true,
    };
    let source = EventSource::granted(Arc::new(store), Tz::UTC);

    assert!(source.events_for_day(january_8()).await.is_empty());
}

#[tokio::test]
async fn json_store_persists_saved_events() {
    let temp_dir = std::env::temp_dir().join(format!("calendar_planner_it_{}", uuid::Uuid::new_v4()));
    let path = temp_dir.join("calendar.json");

    let store = JsonFileStore::open(&path).unwrap();
    let calendar = store.default_calendar().await.unwrap();
    assert_eq!(calendar.id, "default");
    let start = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();
    let id = store.save(NewEvent::placeholder_at(start)).await.unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    let events = reopened
        .events_matching(&DateWindow::day(january_8(), Tz::UTC))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id);
    assert_eq!(events[0].calendar_id, calendar.id);
    assert_eq!(events[0].title.as_deref(), Some("New event"));
    assert_eq!(events[0].end, Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap());

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[tokio::test]
async fn json_store_rejects_events_ending_before_start() {
    let temp_dir = std::env::temp_dir().join(format!("calendar_planner_it_{}", uuid::Uuid::new_v4()));
    let store = JsonFileStore::open(temp_dir.join("calendar.json")).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();

    let err = store
        .save(NewEvent {
            title: "Backwards".to_string(),
            start,
            end: start - chrono::Duration::hours(1),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidEvent(_)));
    assert!(!store.path().exists());
}
