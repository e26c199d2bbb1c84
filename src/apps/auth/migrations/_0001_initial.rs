use crate::migrations::prelude::*;

pub fn migration() -> Migration {
	Migration {
		app_label: "auth".to_string(),
		name: "0001_initial".to_string(),
		operations: vec![Operation::CreateTable {
			name: "auth_user".to_string(),
			columns: vec![
				ColumnDefinition {
					name: "id".to_string(),
					type_definition: FieldType::Integer,
					not_null: true,
					unique: false,
					primary_key: true,
					auto_increment: true,
					default: None,
				},
				ColumnDefinition {
					name: "username".to_string(),
					type_definition: FieldType::VarChar(150u32),
					not_null: true,
					unique: true,
					primary_key: false,
					auto_increment: false,
					default: None,
				},
				ColumnDefinition {
					name: "email".to_string(),
					type_definition: FieldType::VarChar(254u32),
					not_null: true,
					unique: false,
					primary_key: false,
					auto_increment: false,
					default: Some("''".to_string()),
				},
				ColumnDefinition {
					name: "is_active".to_string(),
					type_definition: FieldType::Boolean,
					not_null: true,
					unique: false,
					primary_key: false,
					auto_increment: false,
					default: Some("TRUE".to_string()),
				},
				ColumnDefinition {
					name: "date_joined".to_string(),
					type_definition: FieldType::DateTime,
					not_null: true,
					unique: false,
					primary_key: false,
					auto_increment: false,
					default: Some("CURRENT_TIMESTAMP".to_string()),
				},
			],
			constraints: vec![],
		}],
		dependencies: vec![],
		atomic: true,
		initial: Some(true),
		swappable_dependencies: vec![],
	}
}
