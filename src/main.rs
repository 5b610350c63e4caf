use anyhow::{Result, anyhow};
use glyph_judge::{config, server};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Picks the log filter: `RUST_LOG` wins over `server.logs.level`.
fn resolve_log_level(configured: &str) -> Result<String> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| configured.to_string());
    level.parse::<LevelFilter>().map_err(|_| {
        anyhow!(
            "Invalid log level: '{}'. Valid levels: error, warn, info, debug, trace",
            level
        )
    })?;
    Ok(level)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors are reported before logging exists
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Log level
    let log_level = match resolve_log_level(&config.server.logs.level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // JSON logs on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level)?)
        .json()
        .init();

    info!(
        "Starting glyph judge with model '{}', log level: {}",
        config.llm.model, log_level
    );

    // Serve until ctrl-c
    server::run(config).await?;

    Ok(())
}
