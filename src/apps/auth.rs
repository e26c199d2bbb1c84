//! Default user model
//!
//! `auth.User` is what the `AUTH_USER_MODEL` setting names unless a project
//! swaps in its own model.

pub mod migrations;
pub mod models;

pub use models::User;
