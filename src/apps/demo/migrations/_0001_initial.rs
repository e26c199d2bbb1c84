use crate::config::Settings;
use crate::config::settings::AUTH_USER_MODEL;
use crate::migrations::dependency::FIRST_MIGRATION;
use crate::migrations::prelude::*;

pub fn migration(settings: &Settings) -> Migration {
	let user_table = settings.auth_user_table();

	Migration {
		app_label: "demo".to_string(),
		name: "0001_initial".to_string(),
		operations: vec![
			Operation::CreateTable {
				name: "demo_book".to_string(),
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
						name: "name".to_string(),
						type_definition: FieldType::VarChar(255u32),
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
					ColumnDefinition {
						name: "archived".to_string(),
						type_definition: FieldType::Boolean,
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: Some("FALSE".to_string()),
					},
					ColumnDefinition {
						name: "amount".to_string(),
						type_definition: FieldType::Decimal {
							precision: 9u32,
							scale: 2u32,
						},
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
					ColumnDefinition {
						name: "amount_off".to_string(),
						type_definition: FieldType::Decimal {
							precision: 7u32,
							scale: 2u32,
						},
						not_null: false,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
					ColumnDefinition {
						name: "percentage".to_string(),
						type_definition: FieldType::Decimal {
							precision: 3u32,
							scale: 0u32,
						},
						not_null: false,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
					ColumnDefinition {
						name: "created_by_id".to_string(),
						type_definition: FieldType::Integer,
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
				],
				constraints: vec![Constraint::ForeignKey {
					name: format!("demo_book_created_by_id_fk_{}_id", user_table),
					columns: vec!["created_by_id".to_string()],
					referenced_table: user_table.clone(),
					referenced_columns: vec!["id".to_string()],
					on_delete: ForeignKeyAction::Cascade,
					on_update: ForeignKeyAction::NoAction,
				}],
			},
			Operation::CreateTable {
				name: "demo_library".to_string(),
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
						name: "name".to_string(),
						type_definition: FieldType::VarChar(255u32),
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
				],
				constraints: vec![],
			},
			Operation::CreateTable {
				name: "demo_librarybook".to_string(),
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
						name: "books_id".to_string(),
						type_definition: FieldType::Integer,
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
					ColumnDefinition {
						name: "library_id".to_string(),
						type_definition: FieldType::Integer,
						not_null: true,
						unique: false,
						primary_key: false,
						auto_increment: false,
						default: None,
					},
				],
				constraints: vec![
					Constraint::ForeignKey {
						name: "demo_librarybook_books_id_fk_demo_book_id".to_string(),
						columns: vec!["books_id".to_string()],
						referenced_table: "demo_book".to_string(),
						referenced_columns: vec!["id".to_string()],
						on_delete: ForeignKeyAction::Protect,
						on_update: ForeignKeyAction::NoAction,
					},
					Constraint::ForeignKey {
						name: "demo_librarybook_library_id_fk_demo_library_id".to_string(),
						columns: vec!["library_id".to_string()],
						referenced_table: "demo_library".to_string(),
						referenced_columns: vec!["id".to_string()],
						on_delete: ForeignKeyAction::Cascade,
						on_update: ForeignKeyAction::NoAction,
					},
				],
			},
			Operation::AddManyToMany {
				table: "demo_library".to_string(),
				field_name: "books".to_string(),
				to: "demo_book".to_string(),
				through: "demo_librarybook".to_string(),
			},
		],
		dependencies: vec![],
		atomic: true,
		initial: Some(true),
		swappable_dependencies: vec![SwappableDependency::new(
			AUTH_USER_MODEL,
			"auth",
			"User",
			FIRST_MIGRATION,
		)],
	}
}
