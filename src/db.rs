//! Database connection setup

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Open a SQLite pool with foreign-key enforcement turned on
///
/// Referential actions (`CASCADE`, `RESTRICT`) are only honoured by SQLite
/// while `PRAGMA foreign_keys` is on, which is per connection.
/// In-memory URLs get a single long-lived connection so every query sees
/// the same database.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(database_url)?
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
		SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?
	} else {
		SqlitePoolOptions::new().connect_with(options).await?
	};

	tracing::debug!(url = %database_url, "Connected to database");
	Ok(pool)
}
