//! Migration definition

use super::dependency::SwappableDependency;
use super::{Operation, ProjectState, Result, SqlDialect};
use serde::{Deserialize, Serialize};

/// A database migration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Migration {
	/// Migration name (e.g., "0001_initial")
	pub name: String,

	/// App label
	pub app_label: String,

	/// Operations to apply, in order
	pub operations: Vec<Operation>,

	/// Dependencies (app_label, migration_name)
	pub dependencies: Vec<(String, String)>,

	/// Whether this is wrapped in a transaction
	pub atomic: bool,

	/// Whether this is an initial migration (explicit or inferred from dependencies)
	/// - `Some(true)`: Explicitly marked as initial
	/// - `Some(false)`: Explicitly marked as non-initial
	/// - `None`: Auto-infer from `dependencies.is_empty()`
	pub initial: Option<bool>,

	/// Swappable dependencies (e.g., AUTH_USER_MODEL pattern)
	#[serde(default)]
	pub swappable_dependencies: Vec<SwappableDependency>,
}

impl Migration {
	/// Create a new migration
	///
	/// # Examples
	///
	/// ```rust
	/// use demo_library::migrations::Migration;
	///
	/// let migration = Migration::new("0001_initial", "myapp");
	/// assert_eq!(migration.name, "0001_initial");
	/// assert_eq!(migration.app_label, "myapp");
	/// assert!(migration.atomic);
	/// ```
	pub fn new(name: impl Into<String>, app_label: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			app_label: app_label.into(),
			operations: Vec::new(),
			dependencies: Vec::new(),
			atomic: true,
			initial: None,
			swappable_dependencies: Vec::new(),
		}
	}

	/// Add an operation to this migration
	pub fn add_operation(mut self, operation: Operation) -> Self {
		self.operations.push(operation);
		self
	}

	/// Add a dependency to this migration
	pub fn add_dependency(mut self, app_label: impl Into<String>, name: impl Into<String>) -> Self {
		self.dependencies.push((app_label.into(), name.into()));
		self
	}

	/// Add a swappable dependency to this migration
	pub fn add_swappable_dependency(mut self, dependency: SwappableDependency) -> Self {
		self.swappable_dependencies.push(dependency);
		self
	}

	/// Set whether this migration should run in a transaction
	pub fn atomic(mut self, atomic: bool) -> Self {
		self.atomic = atomic;
		self
	}

	/// Set initial attribute explicitly
	pub fn initial(mut self, initial: bool) -> Self {
		self.initial = Some(initial);
		self
	}

	/// Get full migration identifier
	///
	/// # Examples
	///
	/// ```rust
	/// use demo_library::migrations::Migration;
	///
	/// let migration = Migration::new("0001_initial", "myapp");
	/// assert_eq!(migration.id(), "myapp.0001_initial");
	/// ```
	pub fn id(&self) -> String {
		format!("{}.{}", self.app_label, self.name)
	}

	/// Check if this is an initial migration
	///
	/// Returns `true` if `initial` is explicitly `Some(true)`, or if it is
	/// `None` and there are no dependencies of either kind.
	pub fn is_initial(&self) -> bool {
		match self.initial {
			Some(initial) => initial,
			None => self.dependencies.is_empty() && self.swappable_dependencies.is_empty(),
		}
	}

	/// All dependencies with swappable ones resolved through `lookup`
	///
	/// `lookup` maps a setting key such as `AUTH_USER_MODEL` to its
	/// configured value.
	pub fn resolved_dependencies<F>(&self, lookup: F) -> Vec<(String, String)>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut resolved = self.dependencies.clone();
		for swappable in &self.swappable_dependencies {
			let value = lookup(&swappable.setting_key);
			resolved.push(swappable.resolve(value.as_deref()));
		}
		resolved
	}

	/// Replay every operation into `state`
	pub fn apply_state(&self, state: &mut ProjectState) -> Result<()> {
		for operation in &self.operations {
			operation.state_forwards(&self.app_label, state)?;
		}
		Ok(())
	}

	/// Forward SQL for the whole migration, wrapped in a transaction when atomic
	pub fn to_sql_statements(&self, dialect: &SqlDialect) -> Vec<String> {
		let mut statements: Vec<String> = self
			.operations
			.iter()
			.flat_map(|operation| operation.to_sql_statements(dialect))
			.collect();

		if self.atomic && !statements.is_empty() {
			let begin = match dialect {
				SqlDialect::Mysql => "START TRANSACTION;",
				SqlDialect::Sqlite | SqlDialect::Postgres => "BEGIN;",
			};
			statements.insert(0, begin.to_string());
			statements.push("COMMIT;".to_string());
		}
		statements
	}
}
