//! Field type definitions for migrations

use super::operations::SqlDialect;
use serde::{Deserialize, Serialize};

/// Represents database column types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
	Integer,

	/// Bounded text (`VARCHAR(n)`)
	VarChar(u32),

	/// Fixed-point decimal with `precision` total digits, `scale` of them fractional
	Decimal {
		precision: u32,
		scale: u32,
	},

	Boolean,

	DateTime,
}

impl FieldType {
	/// Convert FieldType to SQL string for a specific dialect
	pub fn to_sql_for_dialect(&self, dialect: &SqlDialect) -> String {
		match self {
			FieldType::Boolean => match dialect {
				SqlDialect::Postgres => "BOOLEAN".to_string(),
				SqlDialect::Mysql => "TINYINT(1)".to_string(),
				// SQLite stores 0/1 but the declared name lets sqlx decode into bool
				SqlDialect::Sqlite => "BOOLEAN".to_string(),
			},
			FieldType::DateTime => match dialect {
				SqlDialect::Postgres => "TIMESTAMPTZ".to_string(),
				SqlDialect::Mysql | SqlDialect::Sqlite => "DATETIME".to_string(),
			},
			FieldType::Decimal { precision, scale } => match dialect {
				SqlDialect::Postgres => format!("NUMERIC({}, {})", precision, scale),
				SqlDialect::Mysql | SqlDialect::Sqlite => {
					format!("DECIMAL({}, {})", precision, scale)
				}
			},
			_ => self.to_sql_string(),
		}
	}

	/// Convert FieldType to a dialect-neutral SQL string
	pub fn to_sql_string(&self) -> String {
		match self {
			FieldType::Integer => "INTEGER".to_string(),
			FieldType::VarChar(max_length) => format!("VARCHAR({})", max_length),
			FieldType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
			FieldType::Boolean => "BOOLEAN".to_string(),
			FieldType::DateTime => "DATETIME".to_string(),
		}
	}

	/// Whether this type can back an auto-incrementing surrogate key
	pub fn is_integer(&self) -> bool {
		matches!(self, FieldType::Integer)
	}
}
