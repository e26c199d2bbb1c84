//! Migration operations
//!
//! Two operations make up a forward-only initial migration:
//!
//! - [`Operation::CreateTable`] creates a table with its columns and
//!   table-level constraints. Foreign-key columns additionally get an index.
//! - [`Operation::AddManyToMany`] registers a many-to-many accessor on an
//!   existing model, realised through an existing association table. It
//!   changes project state only; no SQL is emitted.
//!
//! # Example
//!
//! ```rust
//! use demo_library::migrations::{
//!     ColumnDefinition, FieldType, Operation, ProjectState, SqlDialect,
//! };
//!
//! let mut state = ProjectState::new();
//! let create = Operation::CreateTable {
//!     name: "shop_shelf".to_string(),
//!     columns: vec![ColumnDefinition::new("id", FieldType::Integer).auto_primary_key()],
//!     constraints: vec![],
//! };
//!
//! create.state_forwards("shop", &mut state).unwrap();
//! assert!(state.has_table("shop_shelf"));
//! assert!(create.to_sql_statements(&SqlDialect::Sqlite)[0].starts_with("CREATE TABLE"));
//! ```

use super::state::{FieldState, ForeignKeyInfo, ManyToManyState, ModelState, ProjectState};
use super::{FieldType, MigrationError, Result};
use pg_escape::quote_identifier;
use serde::{Deserialize, Serialize};

/// Referential action taken when a referenced row is deleted or updated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ForeignKeyAction {
	/// Deleting the referenced row deletes the referencing rows
	Cascade,
	/// Deleting the referenced row is refused while referencing rows exist.
	///
	/// Enforced in the database as `RESTRICT`; model code checks it up front
	/// to report which relation blocks the delete.
	Protect,
	/// Refused by the database, checked immediately
	Restrict,
	/// Refused by the database, checked at end of statement
	NoAction,
}

impl ForeignKeyAction {
	/// Convert to SQL keyword for use in constraint definitions
	pub fn to_sql_keyword(&self) -> &'static str {
		match self {
			ForeignKeyAction::Cascade => "CASCADE",
			ForeignKeyAction::Protect | ForeignKeyAction::Restrict => "RESTRICT",
			ForeignKeyAction::NoAction => "NO ACTION",
		}
	}
}

/// SQL dialect for generating database-specific SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
	Sqlite,
	Postgres,
	Mysql,
}

impl std::str::FromStr for SqlDialect {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"sqlite" => Ok(SqlDialect::Sqlite),
			"postgres" | "postgresql" => Ok(SqlDialect::Postgres),
			"mysql" => Ok(SqlDialect::Mysql),
			other => Err(format!(
				"unknown dialect '{}' (expected sqlite, postgres or mysql)",
				other
			)),
		}
	}
}

/// Table-level constraint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(tag = "type")]
pub enum Constraint {
	/// ForeignKey constraint
	ForeignKey {
		name: String,
		columns: Vec<String>,
		referenced_table: String,
		referenced_columns: Vec<String>,
		on_delete: ForeignKeyAction,
		on_update: ForeignKeyAction,
	},
}

fn quote_list(columns: &[String]) -> String {
	columns
		.iter()
		.map(|col| quote_identifier(col).into_owned())
		.collect::<Vec<_>>()
		.join(", ")
}

impl std::fmt::Display for Constraint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Constraint::ForeignKey {
				name,
				columns,
				referenced_table,
				referenced_columns,
				on_delete,
				on_update,
			} => {
				write!(
					f,
					"CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {} ON UPDATE {}",
					quote_identifier(name),
					quote_list(columns),
					quote_identifier(referenced_table),
					quote_list(referenced_columns),
					on_delete.to_sql_keyword(),
					on_update.to_sql_keyword()
				)
			}
		}
	}
}

/// Column definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDefinition {
	pub name: String,
	pub type_definition: FieldType,
	#[serde(default)]
	pub not_null: bool,
	#[serde(default)]
	pub unique: bool,
	#[serde(default)]
	pub primary_key: bool,
	#[serde(default)]
	pub auto_increment: bool,
	/// SQL literal used as the column default
	#[serde(default)]
	pub default: Option<String>,
}

impl ColumnDefinition {
	/// Create a new nullable column definition
	pub fn new(name: impl Into<String>, type_def: FieldType) -> Self {
		Self {
			name: name.into(),
			type_definition: type_def,
			not_null: false,
			unique: false,
			primary_key: false,
			auto_increment: false,
			default: None,
		}
	}

	/// Mark the column as an auto-incrementing surrogate primary key
	pub fn auto_primary_key(mut self) -> Self {
		self.not_null = true;
		self.primary_key = true;
		self.auto_increment = true;
		self
	}

	pub fn not_null(mut self) -> Self {
		self.not_null = true;
		self
	}

}

/// A single schema change inside a migration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Operation {
	CreateTable {
		name: String,
		columns: Vec<ColumnDefinition>,
		#[serde(default)]
		constraints: Vec<Constraint>,
	},
	/// Register a many-to-many accessor `field_name` on `table`, pointing at
	/// `to` through the association table `through`
	AddManyToMany {
		table: String,
		field_name: String,
		to: String,
		through: String,
	},
}

impl Operation {
	/// Apply this operation to the project state (forward)
	///
	/// Fails without touching the state when the operation does not fit the
	/// schema built so far.
	pub fn state_forwards(&self, app_label: &str, state: &mut ProjectState) -> Result<()> {
		match self {
			Operation::CreateTable {
				name,
				columns,
				constraints,
			} => {
				if state.has_table(name) {
					return Err(MigrationError::InvalidMigration(format!(
						"table '{}' already exists",
						name
					)));
				}

				let mut model = ModelState::new(app_label, name.clone());
				for column in columns {
					if column.auto_increment && !column.type_definition.is_integer() {
						return Err(MigrationError::InvalidMigration(format!(
							"column '{}.{}' is auto-incremented but not an integer",
							name, column.name
						)));
					}
					let mut field = FieldState::new(
						column.name.clone(),
						column.type_definition.clone(),
						!column.not_null && !column.primary_key,
					);
					field.primary_key = column.primary_key;
					field.unique = column.unique;
					field.default = column.default.clone();
					if model.fields.insert(column.name.clone(), field).is_some() {
						return Err(MigrationError::InvalidMigration(format!(
							"column '{}.{}' is declared twice",
							name, column.name
						)));
					}
				}

				for constraint in constraints {
					let Constraint::ForeignKey {
						name: constraint_name,
						columns: fk_columns,
						referenced_table,
						referenced_columns,
						on_delete,
						..
					} = constraint;

					// A table may reference itself
					let referenced = if referenced_table == name {
						Some(&model)
					} else {
						state.get_model(referenced_table)
					};
					let Some(referenced) = referenced else {
						return Err(MigrationError::DependencyError(format!(
							"constraint '{}' references unknown table '{}'",
							constraint_name, referenced_table
						)));
					};
					if let Some(missing) = referenced_columns
						.iter()
						.find(|col| !referenced.fields.contains_key(*col))
					{
						return Err(MigrationError::DependencyError(format!(
							"constraint '{}' references unknown column '{}.{}'",
							constraint_name, referenced_table, missing
						)));
					}

					for (column, referenced_column) in fk_columns.iter().zip(referenced_columns) {
						let Some(field) = model.fields.get_mut(column) else {
							return Err(MigrationError::InvalidMigration(format!(
								"constraint '{}' uses unknown column '{}.{}'",
								constraint_name, name, column
							)));
						};
						field.foreign_key = Some(ForeignKeyInfo {
							referenced_table: referenced_table.clone(),
							referenced_column: referenced_column.clone(),
							on_delete: *on_delete,
						});
					}
				}

				state.add_model(model);
				Ok(())
			}
			Operation::AddManyToMany {
				table,
				field_name,
				to,
				through,
			} => {
				let Some(source) = state.get_model(table) else {
					return Err(MigrationError::DependencyError(format!(
						"cannot add '{}' to unknown table '{}'",
						field_name, table
					)));
				};
				if source.fields.contains_key(field_name) || source.many_to_many(field_name).is_some()
				{
					return Err(MigrationError::InvalidMigration(format!(
						"field '{}.{}' already exists",
						table, field_name
					)));
				}
				if !state.has_table(to) {
					return Err(MigrationError::DependencyError(format!(
						"many-to-many '{}.{}' targets unknown table '{}'",
						table, field_name, to
					)));
				}
				let Some(through_model) = state.get_model(through) else {
					return Err(MigrationError::DependencyError(format!(
						"many-to-many '{}.{}' uses unknown association table '{}'",
						table, field_name, through
					)));
				};

				let source_column = through_model.foreign_key_to(table, None);
				let target_column =
					through_model.foreign_key_to(to, source_column.as_deref());
				let (Some(source_column), Some(target_column)) = (source_column, target_column)
				else {
					return Err(MigrationError::InvalidMigration(format!(
						"association table '{}' needs foreign keys to both '{}' and '{}'",
						through, table, to
					)));
				};

				let relation = ManyToManyState {
					field_name: field_name.clone(),
					to: to.clone(),
					through: through.clone(),
					source_column,
					target_column,
				};
				if let Some(source) = state.get_model_mut(table) {
					source.many_to_many_fields.push(relation);
				}
				Ok(())
			}
		}
	}

	/// Generate column SQL with all constraints
	fn column_to_sql(col: &ColumnDefinition, dialect: &SqlDialect) -> String {
		let mut parts = Vec::new();

		parts.push(quote_identifier(&col.name).into_owned());

		if col.auto_increment {
			match dialect {
				SqlDialect::Postgres => {
					parts.push(format!(
						"{} GENERATED BY DEFAULT AS IDENTITY",
						col.type_definition.to_sql_for_dialect(dialect)
					));
				}
				SqlDialect::Mysql => {
					parts.push(col.type_definition.to_sql_for_dialect(dialect));
					parts.push("AUTO_INCREMENT".to_string());
				}
				SqlDialect::Sqlite => {
					parts.push(col.type_definition.to_sql_for_dialect(dialect));
					// INTEGER PRIMARY KEY is the rowid alias; AUTOINCREMENT stops id reuse
					if col.primary_key {
						parts.push("PRIMARY KEY AUTOINCREMENT".to_string());
						return parts.join(" ");
					}
				}
			}
		} else {
			parts.push(col.type_definition.to_sql_for_dialect(dialect));
		}

		if col.not_null {
			parts.push("NOT NULL".to_string());
		}

		if col.primary_key {
			parts.push("PRIMARY KEY".to_string());
		}

		if col.unique {
			parts.push("UNIQUE".to_string());
		}

		if let Some(default) = &col.default {
			parts.push(format!("DEFAULT {}", default));
		}

		parts.join(" ")
	}

	/// Generate forward SQL, one statement per entry
	pub fn to_sql_statements(&self, dialect: &SqlDialect) -> Vec<String> {
		match self {
			Operation::CreateTable {
				name,
				columns,
				constraints,
			} => {
				let mut parts = Vec::new();
				for col in columns {
					parts.push(format!("  {}", Self::column_to_sql(col, dialect)));
				}
				for constraint in constraints {
					parts.push(format!("  {}", constraint));
				}

				let mut statements = vec![format!(
					"CREATE TABLE {} (\n{}\n);",
					quote_identifier(name),
					parts.join(",\n")
				)];

				// Foreign-key columns are indexed unless already unique
				for Constraint::ForeignKey { columns: fk, .. } in constraints {
					let already_unique = fk.len() == 1
						&& columns
							.iter()
							.any(|col| col.name == fk[0] && (col.unique || col.primary_key));
					if already_unique {
						continue;
					}
					statements.push(format!(
						"CREATE INDEX {} ON {} ({});",
						quote_identifier(&format!("{}_{}_idx", name, fk.join("_"))),
						quote_identifier(name),
						quote_list(fk)
					));
				}

				statements
			}
			Operation::AddManyToMany { .. } => Vec::new(),
		}
	}

	/// Human-readable description, used by plan output
	pub fn describe(&self) -> String {
		match self {
			Operation::CreateTable { name, .. } => format!("Create table {}", name),
			Operation::AddManyToMany {
				table,
				field_name,
				to,
				through,
			} => format!(
				"Add many-to-many field {} to {} (to {} through {})",
				field_name, table, to, through
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn author_table() -> Operation {
		Operation::CreateTable {
			name: "app_author".to_string(),
			columns: vec![
				ColumnDefinition::new("id", FieldType::Integer).auto_primary_key(),
				ColumnDefinition::new("name", FieldType::VarChar(100)).not_null(),
			],
			constraints: vec![],
		}
	}

	fn post_table(on_delete: ForeignKeyAction) -> Operation {
		Operation::CreateTable {
			name: "app_post".to_string(),
			columns: vec![
				ColumnDefinition::new("id", FieldType::Integer).auto_primary_key(),
				ColumnDefinition::new("author_id", FieldType::Integer).not_null(),
			],
			constraints: vec![Constraint::ForeignKey {
				name: "app_post_author_id_fk".to_string(),
				columns: vec!["author_id".to_string()],
				referenced_table: "app_author".to_string(),
				referenced_columns: vec!["id".to_string()],
				on_delete,
				on_update: ForeignKeyAction::NoAction,
			}],
		}
	}

	#[rstest]
	#[case(ForeignKeyAction::Cascade, "CASCADE")]
	#[case(ForeignKeyAction::Protect, "RESTRICT")]
	#[case(ForeignKeyAction::Restrict, "RESTRICT")]
	#[case(ForeignKeyAction::NoAction, "NO ACTION")]
	fn test_foreign_key_action_keyword(#[case] action: ForeignKeyAction, #[case] keyword: &str) {
		assert_eq!(action.to_sql_keyword(), keyword);
	}

	#[rstest]
	#[case("sqlite", SqlDialect::Sqlite)]
	#[case("PostgreSQL", SqlDialect::Postgres)]
	#[case("mysql", SqlDialect::Mysql)]
	fn test_dialect_from_str(#[case] input: &str, #[case] expected: SqlDialect) {
		assert_eq!(input.parse::<SqlDialect>().unwrap(), expected);
		assert!("oracle".parse::<SqlDialect>().is_err());
	}

	#[rstest]
	fn test_create_table_sqlite_sql() {
		// Arrange
		let op = author_table();

		// Act
		let statements = op.to_sql_statements(&SqlDialect::Sqlite);

		// Assert
		assert_eq!(statements.len(), 1);
		assert!(statements[0].starts_with("CREATE TABLE app_author ("));
		assert!(statements[0].contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
		assert!(statements[0].contains("VARCHAR(100) NOT NULL"));
		assert!(statements[0].ends_with(");"));
	}

	#[rstest]
	fn test_create_table_postgres_uses_identity() {
		let statements = author_table().to_sql_statements(&SqlDialect::Postgres);

		assert!(
			statements[0].contains("id INTEGER GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY")
		);
	}

	#[rstest]
	fn test_create_table_mysql_uses_auto_increment() {
		let statements = author_table().to_sql_statements(&SqlDialect::Mysql);

		assert!(statements[0].contains("id INTEGER AUTO_INCREMENT NOT NULL PRIMARY KEY"));
	}

	#[rstest]
	fn test_foreign_key_emits_constraint_and_index() {
		// Act
		let statements = post_table(ForeignKeyAction::Cascade).to_sql_statements(&SqlDialect::Sqlite);

		// Assert
		assert_eq!(statements.len(), 2);
		assert!(statements[0].contains(
			"CONSTRAINT app_post_author_id_fk FOREIGN KEY (author_id) REFERENCES app_author (id) ON DELETE CASCADE ON UPDATE NO ACTION"
		));
		assert_eq!(
			statements[1],
			"CREATE INDEX app_post_author_id_idx ON app_post (author_id);"
		);
	}

	#[rstest]
	fn test_state_forwards_registers_table_and_foreign_key() {
		// Arrange
		let mut state = ProjectState::new();

		// Act
		author_table().state_forwards("app", &mut state).unwrap();
		post_table(ForeignKeyAction::Protect)
			.state_forwards("app", &mut state)
			.unwrap();

		// Assert
		let post = state.get_model("app_post").unwrap();
		let fk = post.fields["author_id"].foreign_key.as_ref().unwrap();
		assert_eq!(fk.referenced_table, "app_author");
		assert_eq!(fk.on_delete, ForeignKeyAction::Protect);
		assert!(!post.fields["author_id"].nullable);
		assert!(post.fields["id"].primary_key);
	}

	#[rstest]
	fn test_create_table_twice_is_rejected() {
		// Arrange
		let mut state = ProjectState::new();
		author_table().state_forwards("app", &mut state).unwrap();

		// Act
		let result = author_table().state_forwards("app", &mut state);

		// Assert
		assert!(matches!(result, Err(MigrationError::InvalidMigration(_))));
	}

	#[rstest]
	fn test_foreign_key_to_unknown_table_is_rejected() {
		let mut state = ProjectState::new();

		let result = post_table(ForeignKeyAction::Cascade).state_forwards("app", &mut state);

		assert!(matches!(result, Err(MigrationError::DependencyError(_))));
		assert!(!state.has_table("app_post"));
	}

	#[rstest]
	fn test_auto_increment_requires_integer() {
		let mut state = ProjectState::new();
		let op = Operation::CreateTable {
			name: "app_tag".to_string(),
			columns: vec![ColumnDefinition::new("id", FieldType::VarChar(10)).auto_primary_key()],
			constraints: vec![],
		};

		let result = op.state_forwards("app", &mut state);

		assert!(matches!(result, Err(MigrationError::InvalidMigration(_))));
	}

	#[rstest]
	fn test_add_many_to_many_requires_through_table() {
		// Arrange
		let mut state = ProjectState::new();
		author_table().state_forwards("app", &mut state).unwrap();
		post_table(ForeignKeyAction::Cascade)
			.state_forwards("app", &mut state)
			.unwrap();
		let op = Operation::AddManyToMany {
			table: "app_author".to_string(),
			field_name: "posts".to_string(),
			to: "app_post".to_string(),
			through: "app_authorpost".to_string(),
		};

		// Act
		let result = op.state_forwards("app", &mut state);

		// Assert
		assert!(matches!(result, Err(MigrationError::DependencyError(_))));
		assert!(state.get_model("app_author").unwrap().many_to_many_fields.is_empty());
	}

	#[rstest]
	fn test_add_many_to_many_requires_foreign_keys_on_through_table() {
		// Arrange
		let mut state = ProjectState::new();
		author_table().state_forwards("app", &mut state).unwrap();
		post_table(ForeignKeyAction::Cascade)
			.state_forwards("app", &mut state)
			.unwrap();
		// app_post has a key to app_author but none back to itself as a target
		let op = Operation::AddManyToMany {
			table: "app_author".to_string(),
			field_name: "tags".to_string(),
			to: "app_author".to_string(),
			through: "app_post".to_string(),
		};

		// Act
		let result = op.state_forwards("app", &mut state);

		// Assert
		assert!(matches!(result, Err(MigrationError::InvalidMigration(_))));
	}

	fn fk(table: &str, column: &str, target: &str) -> Constraint {
		Constraint::ForeignKey {
			name: format!("{}_{}_fk_{}_id", table, column, target),
			columns: vec![column.to_string()],
			referenced_table: target.to_string(),
			referenced_columns: vec!["id".to_string()],
			on_delete: ForeignKeyAction::Cascade,
			on_update: ForeignKeyAction::NoAction,
		}
	}

	fn coauthors(field_name: &str) -> Operation {
		Operation::AddManyToMany {
			table: "app_post".to_string(),
			field_name: field_name.to_string(),
			to: "app_author".to_string(),
			through: "app_postauthor".to_string(),
		}
	}

	fn state_with_post_authors() -> ProjectState {
		let mut state = ProjectState::new();
		author_table().state_forwards("app", &mut state).unwrap();
		post_table(ForeignKeyAction::Cascade)
			.state_forwards("app", &mut state)
			.unwrap();
		Operation::CreateTable {
			name: "app_postauthor".to_string(),
			columns: vec![
				ColumnDefinition::new("id", FieldType::Integer).auto_primary_key(),
				ColumnDefinition::new("post_id", FieldType::Integer).not_null(),
				ColumnDefinition::new("author_id", FieldType::Integer).not_null(),
			],
			constraints: vec![
				fk("app_postauthor", "post_id", "app_post"),
				fk("app_postauthor", "author_id", "app_author"),
			],
		}
		.state_forwards("app", &mut state)
		.unwrap();
		state
	}

	#[rstest]
	fn test_add_many_to_many_twice_is_rejected() {
		// Arrange
		let mut state = state_with_post_authors();
		coauthors("coauthors").state_forwards("app", &mut state).unwrap();

		// Act
		let result = coauthors("coauthors").state_forwards("app", &mut state);

		// Assert
		assert!(matches!(result, Err(MigrationError::InvalidMigration(_))));
		let post = state.get_model("app_post").unwrap();
		assert_eq!(post.many_to_many_fields.len(), 1);
		let relation = post.many_to_many("coauthors").unwrap();
		assert_eq!(relation.source_column, "post_id");
		assert_eq!(relation.target_column, "author_id");
	}

	#[rstest]
	fn test_add_many_to_many_cannot_shadow_column() {
		let mut state = state_with_post_authors();

		let result = coauthors("author_id").state_forwards("app", &mut state);

		assert!(matches!(result, Err(MigrationError::InvalidMigration(_))));
		assert!(state.get_model("app_post").unwrap().many_to_many_fields.is_empty());
	}

	#[rstest]
	fn test_add_many_to_many_emits_no_sql() {
		let op = Operation::AddManyToMany {
			table: "a".to_string(),
			field_name: "bs".to_string(),
			to: "b".to_string(),
			through: "ab".to_string(),
		};

		assert!(op.to_sql_statements(&SqlDialect::Postgres).is_empty());
		assert_eq!(
			op.describe(),
			"Add many-to-many field bs to a (to b through ab)"
		);
	}
}
