//! Vitalcheck: Health-risk self-assessment
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalcheck::adapters::sanitize::SanitizingMakeWriter;
use vitalcheck::tui::App;
use vitalcheck::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Logging to the terminal would corrupt the alternate screen, so an
    // interactive session logs to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!(model_dir = %config.model_dir.display(), "Starting Vitalcheck...");

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Vitalcheck shutdown complete.");
    Ok(())
}
