//! # Migrations
//!
//! Forward-only schema migrations in the Django style.
//!
//! A [`Migration`] is an ordered list of [`Operation`]s tagged with an app
//! label and a name. Applying it means two things:
//!
//! 1. **State**: every operation is replayed into a [`ProjectState`], which
//!    rejects operations that make no sense against the schema built so far
//!    (duplicate tables, relations to unknown tables).
//! 2. **Database**: the SQL for every operation is executed, and the
//!    migration is recorded so it is never applied twice.
//!
//! [`DatabaseMigrationExecutor`] does both inside one transaction per
//! migration.
//!
//! ## Migration files
//!
//! Each app keeps its migrations in `apps/<app>/migrations/_NNNN_name.rs`,
//! each exposing a `migration()` constructor:
//!
//! ```rust,ignore
//! pub mod _0001_initial;
//!
//! pub fn all_migrations(settings: &Settings) -> Vec<Migration> {
//!     vec![_0001_initial::migration(settings)]
//! }
//! ```

pub mod dependency;
pub mod executor;
pub mod fields;
pub mod migration;
pub mod operations;
pub mod recorder;
pub mod state;

pub use dependency::SwappableDependency;
pub use executor::{DatabaseMigrationExecutor, ExecutionResult};
pub use fields::FieldType;
pub use migration::Migration;
pub use operations::{ColumnDefinition, Constraint, ForeignKeyAction, Operation, SqlDialect};
pub use recorder::{DatabaseMigrationRecorder, MigrationRecord};
pub use state::{FieldState, ForeignKeyInfo, ManyToManyState, ModelState, ProjectState};

use crate::config::Settings;
use thiserror::Error;

/// Trait for types that provide migrations.
///
/// Rust cannot discover migration modules at runtime, so every project
/// lists its migrations through an implementation of this trait. The
/// settings are passed in because swappable relations (the user model)
/// are resolved when the migration is built.
pub trait MigrationProvider {
	/// Returns all migrations provided by this type, base migrations first.
	fn migrations(settings: &Settings) -> Vec<Migration>;
}

#[derive(Debug, Error)]
pub enum MigrationError {
	#[error("Migration not found: {0}")]
	NotFound(String),

	#[error("Dependency error: {0}")]
	DependencyError(String),

	#[error("SQL error: {0}")]
	SqlError(#[from] sqlx::Error),

	#[error("Invalid migration: {0}")]
	InvalidMigration(String),

	#[error("Recorder error: {0}")]
	RecorderError(String),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

// Prelude for migration files
pub mod prelude {
	pub use super::fields::FieldType;
	pub use super::{
		ColumnDefinition, Constraint, ForeignKeyAction, Migration, Operation, SwappableDependency,
	};
}
