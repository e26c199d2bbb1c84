//! Migration dependency types
//!
//! Plain dependencies are `(app_label, migration_name)` pairs stored on the
//! [`Migration`](super::Migration). A [`SwappableDependency`] names a model
//! through a setting instead (the `AUTH_USER_MODEL` pattern), so the app it
//! points at is only known once settings are loaded.
//!
//! The migration name [`FIRST_MIGRATION`] stands for "whichever migration of
//! that app comes first".

use serde::{Deserialize, Serialize};

/// Placeholder migration name resolving to the first migration of an app
pub const FIRST_MIGRATION: &str = "__first__";

/// Table name the ORM derives for a model: `app_label` + `_` + lowercased model name
///
/// # Example
///
/// ```rust
/// use demo_library::migrations::dependency::table_name_for;
///
/// assert_eq!(table_name_for("demo", "LibraryBook"), "demo_librarybook");
/// ```
pub fn table_name_for(app_label: &str, model_name: &str) -> String {
	format!("{}_{}", app_label, model_name.to_lowercase())
}

/// A dependency that resolves to different apps based on settings.
///
/// # Example
///
/// ```rust
/// use demo_library::migrations::dependency::SwappableDependency;
///
/// let dep = SwappableDependency::new("AUTH_USER_MODEL", "auth", "User", "__first__");
///
/// assert_eq!(dep.resolve_app_label(Some("accounts.Member")), "accounts");
/// assert_eq!(dep.resolve_app_label(None), "auth");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwappableDependency {
	/// Setting key to look up (e.g., "AUTH_USER_MODEL")
	pub setting_key: String,

	/// Default app label if setting is not configured
	pub default_app: String,

	/// Default model name if setting is not configured
	pub default_model: String,

	/// Migration name to depend on (typically "0001_initial" or "__first__")
	pub migration_name: String,
}

impl SwappableDependency {
	pub fn new(
		setting_key: impl Into<String>,
		default_app: impl Into<String>,
		default_model: impl Into<String>,
		migration_name: impl Into<String>,
	) -> Self {
		Self {
			setting_key: setting_key.into(),
			default_app: default_app.into(),
			default_model: default_model.into(),
			migration_name: migration_name.into(),
		}
	}

	/// Resolve the swappable dependency to an actual app label.
	///
	/// `setting_value` is in `app_label.ModelName` form; a value without a
	/// dot is taken as a bare app label.
	pub fn resolve_app_label(&self, setting_value: Option<&str>) -> String {
		match setting_value {
			Some(value) => match value.split_once('.') {
				Some((app, _model)) => app.to_string(),
				None => value.to_string(),
			},
			None => self.default_app.clone(),
		}
	}

	/// Resolve to a dependency tuple (app_label, migration_name).
	pub fn resolve(&self, setting_value: Option<&str>) -> (String, String) {
		(
			self.resolve_app_label(setting_value),
			self.migration_name.clone(),
		)
	}

}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_resolve_with_custom_user_model() {
		// Arrange
		let dep = SwappableDependency::new("AUTH_USER_MODEL", "auth", "User", FIRST_MIGRATION);

		// Act
		let (app, migration) = dep.resolve(Some("accounts.Member"));

		// Assert
		assert_eq!(app, "accounts");
		assert_eq!(migration, FIRST_MIGRATION);
	}

	#[rstest]
	fn test_resolve_without_setting_uses_defaults() {
		let dep = SwappableDependency::new("AUTH_USER_MODEL", "auth", "User", "0001_initial");

		assert_eq!(
			dep.resolve(None),
			("auth".to_string(), "0001_initial".to_string())
		);
	}

	#[rstest]
	fn test_bare_app_label() {
		let dep = SwappableDependency::new("AUTH_USER_MODEL", "auth", "User", FIRST_MIGRATION);

		assert_eq!(dep.resolve_app_label(Some("accounts")), "accounts");
	}
}
