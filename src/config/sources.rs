//! Configuration sources for the layered settings system

use super::SettingsError;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<Map<String, Value>, SettingsError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Environment variable configuration source
///
/// Keys are stripped of the prefix and lowercased, so `DEMO_LOG_LEVEL`
/// becomes `log_level`. Values stay strings.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		Ok(std::env::vars()
			.filter_map(|(key, value)| {
				let clean_key = key.strip_prefix(&self.prefix)?;
				Some((clean_key.to_lowercase(), Value::String(value)))
			})
			.collect())
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// TOML file configuration source
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// Source that is skipped when the file does not exist
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// Source that fails to load when the file does not exist
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		if !self.required && !self.path.exists() {
			return Ok(Map::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;

		match serde_json::to_value(toml_value)? {
			Value::Object(map) => Ok(map),
			_ => Err(SettingsError::InvalidValue {
				key: self.path.display().to_string(),
				message: "expected a table at the root".to_string(),
			}),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Default values configuration source
#[derive(Default)]
pub struct DefaultSource {
	values: Map<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<Map<String, Value>, SettingsError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}
