//! Gesture Pointer - drive the system cursor with hand tracking.
//!
//! This is the main library crate for the gesture pointer. Tracking frames
//! come in through a `TrackingSource`, are smoothed and projected onto the
//! screen by a `PointerSession`, and leave as cursor moves and clicks
//! through a `PointerSink`.

pub mod config;
pub mod driver;
pub mod output;
pub mod processing;
pub mod tracking;

use anyhow::Context;
use config::PointerConfig;
use driver::{GestureChannel, TrackingChannel};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the gesture pointer until Enter is pressed
pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_pointer_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gesture Pointer v{}", env!("CARGO_PKG_VERSION"));

    let config = PointerConfig::from_env().context("Failed to load configuration")?;
    let source = driver::open_source(&config).context("Failed to open tracking source")?;
    let sink = driver::open_sink(&config);

    let mut channel = GestureChannel::new(&config, source, sink);
    channel.initialize().await?;
    channel.start().await?;

    println!("Press Enter to quit...");

    let mut stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    let prompt = tokio::select! {
        result = stdin.read_line(&mut line) => {
            result.map(|_| ()).context("Failed to read from stdin")
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            Ok(())
        }
        _ = channel.wait_for_source_end() => {
            tracing::info!("Tracking source finished");
            Ok(())
        }
    };

    channel.stop().await?;
    prompt?;

    for file in channel.output_files() {
        tracing::info!("Wrote {}", file);
    }

    Ok(())
}
