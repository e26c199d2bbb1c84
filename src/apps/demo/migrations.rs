//! Database migrations for the demo app
//!
//! Migrations are applied in order based on their numeric prefix.

pub mod _0001_initial;

use crate::config::Settings;
use crate::migrations::Migration;

pub fn all_migrations(settings: &Settings) -> Vec<Migration> {
	vec![_0001_initial::migration(settings)]
}
