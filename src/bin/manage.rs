//! Project management CLI (equivalent to Django's manage.py)

use clap::{Parser, Subcommand};
use console::style;
use demo_library::commands;
use demo_library::config::Settings;
use demo_library::logging::init_logging;
use demo_library::migrations::SqlDialect;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "demo-library project management interface", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Settings file (defaults to settings/base.toml when present)
	#[arg(long, global = true, value_name = "PATH")]
	settings: Option<PathBuf>,

	/// Verbosity level (can be repeated for more output)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbosity: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Apply database migrations
	Migrate {
		/// Database connection string
		#[arg(long, value_name = "DATABASE")]
		database: Option<String>,

		/// Fake migration (mark as applied without running)
		#[arg(long)]
		fake: bool,

		/// Show migration plan without applying
		#[arg(long)]
		plan: bool,
	},

	/// List migrations and whether they are applied
	Showmigrations {
		/// Database connection string
		#[arg(long, value_name = "DATABASE")]
		database: Option<String>,
	},

	/// Print the SQL statements for a migration
	Sqlmigrate {
		/// App label of the migration
		#[arg(value_name = "APP_LABEL")]
		app_label: String,

		/// Migration name (e.g. 0001_initial)
		#[arg(value_name = "MIGRATION_NAME")]
		migration_name: String,

		/// SQL dialect: sqlite, postgres or mysql
		#[arg(long, default_value = "sqlite")]
		dialect: SqlDialect,
	},
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();

	let mut settings = Settings::load(cli.settings.as_deref())?;
	match cli.verbosity {
		0 => {}
		1 => settings.log_level = "debug".to_string(),
		_ => settings.log_level = "trace".to_string(),
	}
	init_logging(&settings)?;

	match cli.command {
		Commands::Migrate {
			database,
			fake,
			plan,
		} => commands::run_migrate(&settings, database, fake, plan).await,
		Commands::Showmigrations { database } => {
			commands::run_showmigrations(&settings, database).await
		}
		Commands::Sqlmigrate {
			app_label,
			migration_name,
			dialect,
		} => commands::run_sqlmigrate(&settings, &app_label, &migration_name, dialect),
	}
}

#[tokio::main]
async fn main() {
	if let Err(e) = run().await {
		eprintln!("{} {}", style("Error:").red().bold(), e);
		process::exit(1);
	}
}
