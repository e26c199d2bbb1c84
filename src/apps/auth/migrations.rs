//! Database migrations for the auth app

pub mod _0001_initial;

use crate::migrations::Migration;

pub fn all_migrations() -> Vec<Migration> {
	vec![_0001_initial::migration()]
}
