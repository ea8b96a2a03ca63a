#![allow(non_snake_case)]

mod cli;

use calendarPlanner::config::Settings;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::cli(settings).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
