//! Trojka Racer - Main Entry Point
//!
//! Usage: `trojka-racer [config-file]`. Operator messages are read as JSON
//! lines from stdin.

use anyhow::Context;
use car::LoggingEngine;
use racer::{init_logging, Racer, RacerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let config = RacerConfig::load(path.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.log_level)?;

    info!("=== Trojka Racer v{} ===", env!("CARGO_PKG_VERSION"));

    let racer = Racer::start(&config, Box::new(LoggingEngine))
        .await
        .context("Failed to start racer")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = racer.handle_line(&line).await {
                        warn!("Ignoring operator input: {}", e);
                    }
                }
                Ok(None) => {
                    info!("Operator input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read operator input: {}", e);
                    break;
                }
            },
            _ = &mut interrupt => {
                info!("Interrupted");
                break;
            }
        }
    }

    racer.shutdown().await;
    Ok(())
}
