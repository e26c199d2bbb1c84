//! Project configuration
//!
//! Settings are layered from several [`ConfigSource`]s merged in priority
//! order (environment variables > TOML file > defaults), then deserialized
//! into a typed [`Settings`].

pub mod settings;
pub mod sources;

pub use settings::{LogFormat, Settings, SettingsBuilder};
pub use sources::{ConfigSource, DefaultSource, EnvSource, TomlFileSource};

/// Prefix of environment variables read by [`Settings::load`]
pub const ENV_PREFIX: &str = "DEMO_";

/// Settings file read by [`Settings::load`] when no explicit path is given
pub const DEFAULT_SETTINGS_FILE: &str = "settings/base.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },
}
