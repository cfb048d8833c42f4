//! Crossroads player entry point.
//!
//! Loads content and the diary from the configured locations and prints the
//! collection summary as JSON.

use std::error::Error;

use crossroads_player::config::PlayerConfig;
use crossroads_player::state::AppState;
use crossroads_player::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    telemetry::init_tracing()?;

    tracing::info!("Starting Crossroads player");

    // Read configuration from environment.
    let config = PlayerConfig::from_env()?;

    // Load content and open the diary.
    let state = AppState::load(&config).await?;
    for key in state.catalog.keys() {
        tracing::debug!(scenario = key, "scenario available");
    }

    let summary = state.collection_summary().await?;
    tracing::info!(
        total = summary.total,
        unrecognized = summary.unrecognized,
        "diary summarized"
    );

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
