//! Project state reconstructed from migration history
//!
//! The state is a model of the schema as the applied migrations describe
//! it. Operations validate against it before any SQL is emitted.

use super::FieldType;
use super::operations::ForeignKeyAction;
use std::collections::BTreeMap;

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
	pub referenced_table: String,
	pub referenced_column: String,
	pub on_delete: ForeignKeyAction,
}

/// A single column of a model
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
	pub name: String,
	pub field_type: FieldType,
	pub nullable: bool,
	pub primary_key: bool,
	pub unique: bool,
	pub default: Option<String>,
	/// ForeignKey information if this field is a foreign key
	pub foreign_key: Option<ForeignKeyInfo>,
}

impl FieldState {
	pub fn new(name: impl Into<String>, field_type: FieldType, nullable: bool) -> Self {
		Self {
			name: name.into(),
			field_type,
			nullable,
			primary_key: false,
			unique: false,
			default: None,
			foreign_key: None,
		}
	}
}

/// Many-to-many accessor realised through an association table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManyToManyState {
	/// Accessor name on the source model (e.g., "books")
	pub field_name: String,
	/// Target table
	pub to: String,
	/// Association table
	pub through: String,
	/// Column of `through` pointing at the source table
	pub source_column: String,
	/// Column of `through` pointing at `to`
	pub target_column: String,
}

/// A model (table) as known to the migration history
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState {
	/// Application label (e.g., "auth", "demo")
	pub app_label: String,
	/// Database table name (e.g., "demo_book")
	pub table_name: String,
	/// Fields: column name -> FieldState
	pub fields: BTreeMap<String, FieldState>,
	/// ManyToMany relationships
	pub many_to_many_fields: Vec<ManyToManyState>,
}

impl ModelState {
	pub fn new(app_label: impl Into<String>, table_name: impl Into<String>) -> Self {
		Self {
			app_label: app_label.into(),
			table_name: table_name.into(),
			fields: BTreeMap::new(),
			many_to_many_fields: Vec::new(),
		}
	}

	pub fn many_to_many(&self, field_name: &str) -> Option<&ManyToManyState> {
		self.many_to_many_fields
			.iter()
			.find(|m2m| m2m.field_name == field_name)
	}

	/// Name of the first column referencing `table`, skipping `exclude`
	pub fn foreign_key_to(&self, table: &str, exclude: Option<&str>) -> Option<String> {
		self.fields
			.values()
			.filter(|field| Some(field.name.as_str()) != exclude)
			.find(|field| {
				field
					.foreign_key
					.as_ref()
					.is_some_and(|fk| fk.referenced_table == table)
			})
			.map(|field| field.name.clone())
	}
}

/// All models known to the migration history, keyed by table name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectState {
	pub models: BTreeMap<String, ModelState>,
}

impl ProjectState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_model(&mut self, model: ModelState) {
		self.models.insert(model.table_name.clone(), model);
	}

	pub fn get_model(&self, table_name: &str) -> Option<&ModelState> {
		self.models.get(table_name)
	}

	pub fn get_model_mut(&mut self, table_name: &str) -> Option<&mut ModelState> {
		self.models.get_mut(table_name)
	}

	pub fn has_table(&self, table_name: &str) -> bool {
		self.models.contains_key(table_name)
	}
}
