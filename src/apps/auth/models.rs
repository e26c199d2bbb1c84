use crate::apps::{ModelError, ModelResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub email: String,
	pub is_active: bool,
	pub date_joined: DateTime<Utc>,
}

impl User {
	/// Insert a new active user
	pub async fn create(pool: &SqlitePool, username: &str, email: &str) -> ModelResult<Self> {
		let id = sqlx::query("INSERT INTO auth_user (username, email) VALUES (?, ?)")
			.bind(username)
			.bind(email)
			.execute(pool)
			.await?
			.last_insert_rowid();

		Self::get(pool, id).await
	}

	pub async fn get(pool: &SqlitePool, id: i64) -> ModelResult<Self> {
		sqlx::query_as::<_, Self>(
			"SELECT id, username, email, is_active, date_joined FROM auth_user WHERE id = ?",
		)
		.bind(id)
		.fetch_optional(pool)
		.await?
		.ok_or(ModelError::NotFound { model: "User", id })
	}

	/// Delete the user; rows referencing it with `ON DELETE CASCADE` go with it
	pub async fn delete(self, pool: &SqlitePool) -> ModelResult<()> {
		let result = sqlx::query("DELETE FROM auth_user WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(ModelError::NotFound {
				model: "User",
				id: self.id,
			});
		}

		tracing::debug!(user = self.id, "Deleted user");
		Ok(())
	}
}
