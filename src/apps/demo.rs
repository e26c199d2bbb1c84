//! Books and libraries
//!
//! A [`Library`] holds [`Book`]s through the [`LibraryBook`] association
//! table. Books are owned by the user that created them.

pub mod migrations;
pub mod models;

pub use models::{Book, Library, LibraryBook, NewBook};
