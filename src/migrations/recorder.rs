//! Migration recorder
//!
//! Applied migrations are stored in the `demo_migrations` table, one row per
//! `(app, name)` pair. The recorder works on a borrowed connection so that
//! recording can share the transaction of the migration it records.

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_query::{
	Alias, ColumnDef, Expr, Index, Order, Query, QueryStatementWriter, SchemaStatementBuilder,
	SqliteQueryBuilder, Table,
};
use sqlx::{Row, SqliteConnection};

/// Name of the bookkeeping table
pub const MIGRATIONS_TABLE: &str = "demo_migrations";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Migration record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
	pub app: String,
	pub name: String,
	pub applied: DateTime<Utc>,
}

/// Database-backed migration recorder
#[derive(Debug, Clone)]
pub struct DatabaseMigrationRecorder {
	table: String,
}

impl Default for DatabaseMigrationRecorder {
	fn default() -> Self {
		Self::new()
	}
}

impl DatabaseMigrationRecorder {
	pub fn new() -> Self {
		Self {
			table: MIGRATIONS_TABLE.to_string(),
		}
	}

	/// Create the bookkeeping table and its `(app, name)` unique index if missing
	pub async fn ensure_schema_table(&self, conn: &mut SqliteConnection) -> super::Result<()> {
		let create_table_sql = Table::create()
			.table(Alias::new(&self.table))
			.if_not_exists()
			.col(
				ColumnDef::new(Alias::new("id"))
					.integer()
					.not_null()
					.auto_increment()
					.primary_key(),
			)
			.col(ColumnDef::new(Alias::new("app")).string_len(255).not_null())
			.col(ColumnDef::new(Alias::new("name")).string_len(255).not_null())
			.col(
				ColumnDef::new(Alias::new("applied"))
					.timestamp()
					.not_null()
					.default(Expr::current_timestamp()),
			)
			.to_string(SqliteQueryBuilder);

		let create_index_sql = Index::create()
			.if_not_exists()
			.name(format!("{}_app_name_unique", self.table))
			.table(Alias::new(&self.table))
			.col(Alias::new("app"))
			.col(Alias::new("name"))
			.unique()
			.to_string(SqliteQueryBuilder);

		sqlx::query(&create_table_sql).execute(&mut *conn).await?;
		sqlx::query(&create_index_sql).execute(&mut *conn).await?;

		Ok(())
	}

	/// Record that a migration has been applied
	///
	/// Recording the same migration twice leaves the first record in place.
	pub async fn record_applied(
		&self,
		conn: &mut SqliteConnection,
		app: &str,
		name: &str,
	) -> super::Result<()> {
		let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
		let base_sql = Query::insert()
			.into_table(Alias::new(&self.table))
			.columns([Alias::new("app"), Alias::new("name"), Alias::new("applied")])
			.values_panic([app.into(), name.into(), now.into()])
			.to_string(SqliteQueryBuilder);
		let sql = base_sql.replacen("INSERT", "INSERT OR IGNORE", 1);

		sqlx::query(&sql).execute(&mut *conn).await?;

		Ok(())
	}

	/// Get all applied migrations, oldest first
	pub async fn get_applied_migrations(
		&self,
		conn: &mut SqliteConnection,
	) -> super::Result<Vec<MigrationRecord>> {
		let sql = Query::select()
			.columns([Alias::new("app"), Alias::new("name")])
			.expr_as(
				Expr::cust("CAST(applied AS TEXT)"),
				Alias::new("applied"),
			)
			.from(Alias::new(&self.table))
			.order_by(Alias::new("id"), Order::Asc)
			.to_string(SqliteQueryBuilder);

		let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;

		let mut records = Vec::with_capacity(rows.len());
		for row in rows {
			let app: String = row.try_get("app")?;
			let name: String = row.try_get("name")?;
			let applied_str: String = row.try_get("applied")?;

			// Stored without timezone, always UTC
			let applied = NaiveDateTime::parse_from_str(&applied_str, TIMESTAMP_FORMAT)
				.map(|naive| naive.and_utc())
				.map_err(|e| {
					super::MigrationError::RecorderError(format!(
						"Failed to parse timestamp '{}': {}",
						applied_str, e
					))
				})?;

			records.push(MigrationRecord { app, name, applied });
		}

		Ok(records)
	}

}
