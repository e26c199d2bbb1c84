//! Migration executor
//!
//! Applies an ordered list of migrations to a SQLite database. The list is
//! first turned into a plan: migrations already recorded are skipped, the
//! remaining ones have their dependencies checked and their operations
//! replayed against a scratch copy of the project state. Nothing touches the
//! database until the whole plan validates.
//!
//! The executor remembers every migration it has been given, so the project
//! state can be rebuilt from the recorded history even when a later call only
//! passes the migrations of one app.

use super::dependency::FIRST_MIGRATION;
use super::{
	DatabaseMigrationRecorder, Migration, MigrationError, MigrationProvider, MigrationRecord,
	ProjectState, Result, SqlDialect,
};
use crate::config::Settings;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;

/// Outcome of [`DatabaseMigrationExecutor::apply_migrations`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
	/// Ids (`app.name`) of migrations applied by this run, in order
	pub applied: Vec<String>,
	/// Ids of migrations that were already recorded
	pub skipped: Vec<String>,
}

/// Migration executor over a SQLite pool
pub struct DatabaseMigrationExecutor {
	pool: SqlitePool,
	recorder: DatabaseMigrationRecorder,
	settings: Settings,
	fake: bool,
	state: ProjectState,
	/// Every migration seen so far, first occurrence wins
	history: Vec<Migration>,
}

impl DatabaseMigrationExecutor {
	/// Create a new migration executor
	///
	/// `settings` resolves swappable dependencies such as `AUTH_USER_MODEL`.
	///
	/// # Examples
	///
	/// ```no_run
	/// use demo_library::config::Settings;
	/// use demo_library::migrations::DatabaseMigrationExecutor;
	/// use sqlx::SqlitePool;
	///
	/// # async fn example() {
	/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
	/// let executor = DatabaseMigrationExecutor::new(pool, &Settings::default());
	/// # }
	/// ```
	pub fn new(pool: SqlitePool, settings: &Settings) -> Self {
		Self {
			pool,
			recorder: DatabaseMigrationRecorder::new(),
			settings: settings.clone(),
			fake: false,
			state: ProjectState::new(),
			history: Vec::new(),
		}
	}

	/// Record migrations as applied without running their SQL
	pub fn fake(mut self, fake: bool) -> Self {
		self.fake = fake;
		self
	}

	/// Know about every migration of `P` up front
	///
	/// Recorded migrations of those apps then count towards the project state
	/// even when they are not passed to [`plan`](Self::plan).
	pub fn with_provider<P: MigrationProvider>(mut self) -> Self {
		let migrations = P::migrations(&self.settings);
		self.remember(&migrations);
		self
	}

	/// Project state after the last call to [`plan`](Self::plan) or
	/// [`apply_migrations`](Self::apply_migrations)
	pub fn state(&self) -> &ProjectState {
		&self.state
	}

	/// All recorded migrations, oldest first
	pub async fn applied_migrations(&self) -> Result<Vec<MigrationRecord>> {
		let mut conn = self.pool.acquire().await?;
		self.recorder.ensure_schema_table(&mut conn).await?;
		self.recorder.get_applied_migrations(&mut conn).await
	}

	/// Migrations from `migrations` that still need applying, in order
	///
	/// Fails if a pending migration depends on something neither recorded
	/// nor earlier in the plan, or if its operations do not fit the schema
	/// built by the migrations before it.
	pub async fn plan<'a>(&mut self, migrations: &'a [Migration]) -> Result<Vec<&'a Migration>> {
		self.remember(migrations);
		let records = self.applied_migrations().await?;

		// Rebuild the state from history, in the order it was applied
		let mut state = ProjectState::new();
		for record in &records {
			if let Some(migration) = self.find_known(&record.app, &record.name) {
				migration.apply_state(&mut state)?;
			}
		}
		self.state = state.clone();

		let mut known: HashSet<(String, String)> = records
			.into_iter()
			.map(|record| (record.app, record.name))
			.collect();

		let mut pending = Vec::new();
		for migration in migrations {
			let key = (migration.app_label.clone(), migration.name.clone());
			if known.contains(&key) {
				continue;
			}

			for (app, name) in migration.resolved_dependencies(|setting| self.lookup_setting(setting)) {
				let satisfied = if name == FIRST_MIGRATION {
					known.iter().any(|(known_app, _)| *known_app == app)
				} else {
					known.contains(&(app.clone(), name.clone()))
				};
				if !satisfied {
					return Err(MigrationError::DependencyError(format!(
						"{} depends on {}.{}, which is neither applied nor planned before it",
						migration.id(),
						app,
						name
					)));
				}
			}

			migration.apply_state(&mut state)?;
			known.insert(key);
			pending.push(migration);
		}

		Ok(pending)
	}

	/// Apply a list of migrations
	///
	/// Already-recorded migrations are skipped, so running the same list
	/// twice applies nothing the second time.
	///
	/// # Examples
	///
	/// ```no_run
	/// use demo_library::config::Settings;
	/// use demo_library::migrations::{DatabaseMigrationExecutor, Migration};
	/// use sqlx::SqlitePool;
	///
	/// # async fn example() {
	/// let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
	/// let mut executor = DatabaseMigrationExecutor::new(pool, &Settings::default());
	///
	/// let migrations = vec![Migration::new("0001_initial", "myapp")];
	/// let result = executor.apply_migrations(&migrations).await.unwrap();
	/// assert_eq!(result.applied, vec!["myapp.0001_initial"]);
	/// # }
	/// ```
	pub async fn apply_migrations(&mut self, migrations: &[Migration]) -> Result<ExecutionResult> {
		let pending = self.plan(migrations).await?;

		let pending_ids: HashSet<String> = pending.iter().map(|m| m.id()).collect();
		let skipped: Vec<String> = migrations
			.iter()
			.map(Migration::id)
			.filter(|id| !pending_ids.contains(id))
			.collect();
		for id in &skipped {
			tracing::debug!(migration = %id, "Already applied, skipping");
		}

		let mut applied = Vec::new();
		for migration in pending {
			if self.fake {
				let mut conn = self.pool.acquire().await?;
				self.recorder
					.record_applied(&mut conn, &migration.app_label, &migration.name)
					.await?;
				tracing::warn!(migration = %migration.id(), "Faked migration, no SQL executed");
			} else if migration.atomic {
				let mut tx = self.pool.begin().await?;
				self.apply_migration(&mut tx, migration).await?;
				tx.commit().await?;
				tracing::info!(migration = %migration.id(), "Applied migration");
			} else {
				let mut conn = self.pool.acquire().await?;
				self.apply_migration(&mut conn, migration).await?;
				tracing::info!(migration = %migration.id(), "Applied migration (non-atomic)");
			}

			migration.apply_state(&mut self.state)?;
			applied.push(migration.id());
		}

		Ok(ExecutionResult { applied, skipped })
	}

	/// Run the SQL of one migration and record it on the same connection
	async fn apply_migration(&self, conn: &mut SqliteConnection, migration: &Migration) -> Result<()> {
		for operation in &migration.operations {
			tracing::debug!(migration = %migration.id(), "{}", operation.describe());
			for sql in operation.to_sql_statements(&SqlDialect::Sqlite) {
				tracing::debug!(%sql, "Executing statement");
				sqlx::query(&sql).execute(&mut *conn).await?;
			}
		}

		self.recorder
			.record_applied(conn, &migration.app_label, &migration.name)
			.await
	}

	fn remember(&mut self, migrations: &[Migration]) {
		for migration in migrations {
			if self
				.find_known(&migration.app_label, &migration.name)
				.is_none()
			{
				self.history.push(migration.clone());
			}
		}
	}

	fn find_known(&self, app: &str, name: &str) -> Option<&Migration> {
		self.history
			.iter()
			.find(|migration| migration.app_label == app && migration.name == name)
	}

	fn lookup_setting(&self, key: &str) -> Option<String> {
		self.settings.swappable(key).map(str::to_string)
	}
}
