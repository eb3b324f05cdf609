//! Tracing initialization: an `EnvFilter` driven by `RUST_LOG` (default `info`) and a fmt layer
//! writing to stdout.
//!
//! ```bash
//! RUST_LOG=creative_uploader=debug,tower_http=info creative-uploader --bind 127.0.0.1:5241
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
