//! Installed applications
//!
//! Each app lives in `apps/<app>.rs` with its `models` and `migrations`
//! submodules. [`InstalledApps`] lists their migrations in dependency order.
//!
//! # Examples
//!
//! ```rust
//! use demo_library::apps::InstalledApps;
//! use demo_library::config::Settings;
//! use demo_library::migrations::MigrationProvider;
//!
//! let migrations = InstalledApps::migrations(&Settings::default());
//! let ids: Vec<_> = migrations.iter().map(|m| m.id()).collect();
//! assert_eq!(ids, vec!["auth.0001_initial", "demo.0001_initial"]);
//! ```

pub mod auth;
pub mod demo;

use crate::config::Settings;
use crate::migrations::{Migration, MigrationProvider};

/// Migration provider for every installed app
pub struct InstalledApps;

impl MigrationProvider for InstalledApps {
	fn migrations(settings: &Settings) -> Vec<Migration> {
		let mut migrations = auth::migrations::all_migrations();
		migrations.extend(demo::migrations::all_migrations(settings));
		migrations
	}
}

/// Errors raised by model operations
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
	#[error("{model} with id {id} does not exist")]
	NotFound { model: &'static str, id: i64 },

	#[error(
		"Cannot delete {model} {id}: referenced through protected foreign keys by {count} {referenced_by} row(s)"
	)]
	Protected {
		model: &'static str,
		id: i64,
		referenced_by: &'static str,
		count: i64,
	},

	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: &'static str, message: String },

	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
