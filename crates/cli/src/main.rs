//! Scripted skirmish driver.
//!
//! Plays a short squad-versus-pack fight through the combat runtime and
//! prints every bus event to stdout as one JSON object per line. Logs go to
//! stderr.
mod skirmish;

use anyhow::Result;
use combat_runtime::RuntimeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = RuntimeConfig::from_env();
    combat_runtime::logging::init(&config.log_filter)?;

    let turns = std::env::args()
        .nth(1)
        .map(|raw| raw.parse::<u32>())
        .transpose()?
        .unwrap_or(skirmish::DEFAULT_TURNS);

    skirmish::run(config, turns).await
}
