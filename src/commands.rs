//! Management commands behind the `manage` binary

use crate::apps::InstalledApps;
use crate::config::Settings;
use crate::db;
use crate::migrations::{
	DatabaseMigrationExecutor, Migration, MigrationError, MigrationProvider, SqlDialect,
};
use console::style;
use std::collections::HashSet;
use std::error::Error;

type CommandResult = Result<(), Box<dyn Error>>;

/// Apply pending migrations of every installed app
///
/// With `plan`, only prints what would be applied.
pub async fn run_migrate(
	settings: &Settings,
	database: Option<String>,
	fake: bool,
	plan: bool,
) -> CommandResult {
	let url = database.unwrap_or_else(|| settings.database_url.clone());
	let pool = db::connect(&url).await?;
	let migrations = InstalledApps::migrations(settings);
	let mut executor = DatabaseMigrationExecutor::new(pool, settings)
		.with_provider::<InstalledApps>()
		.fake(fake);

	if plan {
		let pending = executor.plan(&migrations).await?;
		println!("{}", style("Planned operations:").cyan().bold());
		if pending.is_empty() {
			println!("  No planned migration operations.");
		}
		for migration in pending {
			println!("{}", style(migration.id()).bold());
			for operation in &migration.operations {
				println!("    {}", operation.describe());
			}
		}
		return Ok(());
	}

	println!("{}", style("Running migrations:").cyan().bold());
	let result = executor.apply_migrations(&migrations).await?;
	if result.applied.is_empty() {
		println!("  No migrations to apply.");
	}
	for id in &result.applied {
		let suffix = if fake { " (faked)" } else { "" };
		println!("  Applying {}...{}{}", id, style(" OK").green(), suffix);
	}
	Ok(())
}

/// List every known migration with an `[X]` for the applied ones
pub async fn run_showmigrations(settings: &Settings, database: Option<String>) -> CommandResult {
	let url = database.unwrap_or_else(|| settings.database_url.clone());
	let pool = db::connect(&url).await?;
	let executor = DatabaseMigrationExecutor::new(pool, settings);

	let applied: HashSet<(String, String)> = executor
		.applied_migrations()
		.await?
		.into_iter()
		.map(|record| (record.app, record.name))
		.collect();

	let migrations = InstalledApps::migrations(settings);
	let mut current_app = None;
	for migration in &migrations {
		if current_app != Some(migration.app_label.as_str()) {
			println!("{}", style(&migration.app_label).bold());
			current_app = Some(migration.app_label.as_str());
		}
		let mark = if applied.contains(&(migration.app_label.clone(), migration.name.clone())) {
			style("[X]").green()
		} else {
			style("[ ]").dim()
		};
		println!(" {} {}", mark, migration.name);
	}
	Ok(())
}

/// SQL a migration would run, one statement per entry
pub fn sqlmigrate_statements(
	settings: &Settings,
	app_label: &str,
	name: &str,
	dialect: SqlDialect,
) -> Result<Vec<String>, MigrationError> {
	InstalledApps::migrations(settings)
		.iter()
		.find(|migration| migration.app_label == app_label && migration.name == name)
		.map(|migration: &Migration| migration.to_sql_statements(&dialect))
		.ok_or_else(|| MigrationError::NotFound(format!("{}.{}", app_label, name)))
}

/// Print the SQL for one migration
pub fn run_sqlmigrate(
	settings: &Settings,
	app_label: &str,
	name: &str,
	dialect: SqlDialect,
) -> CommandResult {
	for statement in sqlmigrate_statements(settings, app_label, name, dialect)? {
		println!("{}", statement);
	}
	Ok(())
}
