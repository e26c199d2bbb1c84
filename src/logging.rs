//! Logging configuration and setup

use crate::config::{LogFormat, Settings};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("Invalid log level: {0}")]
	InvalidLevel(String),

	#[error("Failed to set logger: {0}")]
	Init(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `settings.log_level` when set.
pub fn init_logging(settings: &Settings) -> Result<(), LoggingError> {
	let level = parse_log_level(&settings.log_level)?;

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

	let builder = FmtSubscriber::builder()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr);
	match settings.log_format {
		LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
		LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
		LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish())?,
	}

	tracing::debug!("Logging initialized with level: {}", level);
	Ok(())
}

/// Parse log level string
fn parse_log_level(level: &str) -> Result<Level, LoggingError> {
	level
		.parse::<Level>()
		.map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}
