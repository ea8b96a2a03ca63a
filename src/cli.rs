use std::sync::Arc;

use calendarPlanner::calendar::json_store::JsonFileStore;
use calendarPlanner::calendar::source::EventSource;
use calendarPlanner::calendar::store::{AccessState, AlwaysGranted, EventStore};
use calendarPlanner::clients::openai_client::SuggestionClient;
use calendarPlanner::config::Settings;
use calendarPlanner::error::StoreError;
use calendarPlanner::models::event::{NewEvent, SuggestedEvent, PROMPT_TIME_FORMAT};
use calendarPlanner::service::planner::{save_accepted, suggest_week};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use inquire::Confirm;
use tracing::{info, warn};

#[derive(Parser)]
#[command(about = "Plan your calendar with a chat-completion assistant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the events of one day (today by default).
    Day {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Ask for suggestions for the coming week and save the accepted ones.
    Plan {
        /// Save every suggestion without asking.
        #[arg(long)]
        yes: bool,
    },
    /// Add an event to the default calendar. Lasts one hour unless --end is given.
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
}

pub async fn cli(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let source = open_source(&settings).await;

    match cli.command {
        Commands::Day { date } => {
            let date = date.unwrap_or_else(|| Utc::now().with_timezone(&settings.timezone).date_naive());
            let events = source.events_for_day(date).await;
            if events.is_empty() {
                println!("No events on {}", date);
            }
            for event in events {
                println!("{}", event.describe());
            }
        }
        Commands::Plan { yes } => {
            let api_key = settings.require_api_key()?;
            let client = SuggestionClient::new(api_key.to_string())
                .model(settings.openai_model.clone())
                .api_url(settings.openai_api_url.clone());
            let suggested = suggest_week(&source, &client, Utc::now()).await;
            let answers = if yes {
                vec![true; suggested.len()]
            } else {
                let pending = suggested.clone();
                // The prompt blocks on the terminal, so keep it off the async workers.
                tokio::task::spawn_blocking(move || pending.iter().map(confirm).collect::<Vec<bool>>())
                    .await?
            };
            let mut answers = answers.into_iter();
            let report = save_accepted(&source, suggested, |_| answers.next().unwrap_or(false)).await;

            if report.suggested.is_empty() {
                println!("No suggestions.");
            }
            println!(
                "Saved {} of {} suggestions.",
                report.saved.len(),
                report.suggested.len()
            );
            for (suggestion, err) in &report.failed {
                println!("Failed to save '{}': {}", suggestion.title, err);
            }
        }
        Commands::Add { title, start, end } => {
            let mut event = NewEvent::placeholder_at(start);
            if let Some(title) = title {
                event.title = title;
            }
            if let Some(end) = end {
                event.end = end;
            }
            let id = source.save(event).await?;
            match source.default_calendar().await {
                Some(calendar) => println!("Created event {} in {}", id, calendar.name),
                None => println!("Created event {}", id),
            }
        }
    }
    Ok(())
}

async fn open_source(settings: &Settings) -> EventSource {
    let location = settings.calendar_db_location.clone();
    let source = EventSource::new(
        Box::new(move || -> Result<Arc<dyn EventStore>, StoreError> {
            Ok(Arc::new(JsonFileStore::open(&location)?))
        }),
        settings.timezone,
    );
    source
        .establish_access(&AlwaysGranted, |state| {
            if state == AccessState::Granted {
                info!("calendar ready");
            } else {
                warn!(?state, "calendar unavailable, continuing without events");
            }
        })
        .await;
    source
}

fn confirm(suggestion: &SuggestedEvent) -> bool {
    let question = format!(
        "Add '{}' from {} to {}?",
        suggestion.title,
        suggestion.start.format(PROMPT_TIME_FORMAT),
        suggestion.end.format(PROMPT_TIME_FORMAT)
    );
    // A closed prompt counts as a no.
    Confirm::new(&question).with_default(false).prompt().unwrap_or(false)
}
