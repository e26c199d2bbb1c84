//! Typed project settings

use super::sources::{ConfigSource, DefaultSource, EnvSource, TomlFileSource};
use super::{DEFAULT_SETTINGS_FILE, ENV_PREFIX, SettingsError};
use crate::migrations::dependency::table_name_for;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Setting key naming the user model
pub const AUTH_USER_MODEL: &str = "AUTH_USER_MODEL";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Compact,
	Pretty,
	Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// sqlx connection URL
	pub database_url: String,
	/// User model in `app_label.ModelName` form
	pub auth_user_model: String,
	/// Default tracing level when `RUST_LOG` is unset
	pub log_level: String,
	pub log_format: LogFormat,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			database_url: "sqlite://demo.sqlite3?mode=rwc".to_string(),
			auth_user_model: "auth.User".to_string(),
			log_level: "info".to_string(),
			log_format: LogFormat::Compact,
		}
	}
}

impl Settings {
	/// Load settings from defaults, a TOML file and `DEMO_*` environment variables
	///
	/// `path` overrides `settings/base.toml`; an explicit path must exist.
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let file = match path {
			Some(path) => TomlFileSource::required(path),
			None => TomlFileSource::new(DEFAULT_SETTINGS_FILE),
		};

		SettingsBuilder::new()
			.add_source(Settings::default().into_source())
			.add_source(file)
			.add_source(EnvSource::new(ENV_PREFIX))
			.build()
	}

	/// Value of a swappable-model setting such as `AUTH_USER_MODEL`
	pub fn swappable(&self, setting_key: &str) -> Option<&str> {
		match setting_key {
			AUTH_USER_MODEL => Some(&self.auth_user_model),
			_ => None,
		}
	}

	/// Table of the configured user model
	///
	/// # Example
	///
	/// ```rust
	/// use demo_library::config::Settings;
	///
	/// let mut settings = Settings::default();
	/// assert_eq!(settings.auth_user_table(), "auth_user");
	///
	/// settings.auth_user_model = "accounts.Member".to_string();
	/// assert_eq!(settings.auth_user_table(), "accounts_member");
	/// ```
	pub fn auth_user_table(&self) -> String {
		match self.auth_user_model.split_once('.') {
			Some((app, model)) => table_name_for(app, model),
			None => table_name_for(&self.auth_user_model, "user"),
		}
	}

	fn validate(&self) -> Result<(), SettingsError> {
		let valid = self
			.auth_user_model
			.split_once('.')
			.is_some_and(|(app, model)| {
				!app.is_empty() && !model.is_empty() && !model.contains('.')
			});
		if !valid {
			return Err(SettingsError::InvalidValue {
				key: "auth_user_model".to_string(),
				message: format!(
					"'{}' must be of the form 'app_label.ModelName'",
					self.auth_user_model
				),
			});
		}
		Ok(())
	}

	fn into_source(self) -> DefaultSource {
		let Ok(Value::Object(map)) = serde_json::to_value(self) else {
			return DefaultSource::new();
		};
		map.into_iter()
			.fold(DefaultSource::new(), |source, (key, value)| {
				source.with_value(key, value)
			})
	}
}

/// Merges configuration sources into [`Settings`]
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge every source, higher priority last, and deserialize the result
	pub fn build(mut self) -> Result<Settings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut merged = Map::new();
		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(source = %source.description(), keys = values.len(), "Loaded settings source");
			merged.extend(values);
		}

		let settings: Settings = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}
