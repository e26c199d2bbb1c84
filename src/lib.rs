//! # demo-library
//!
//! Library and book schema for the `demo` app, together with the
//! Django-style migration machinery that creates it.
//!
//! The `demo.0001_initial` migration creates three tables:
//!
//! - `demo_book`: a book with a name, an `archived` flag, three fixed-point
//!   amounts and the user that created it (deleted together with that user).
//! - `demo_library`: a named library.
//! - `demo_librarybook`: the association between the two. A book cannot be
//!   deleted while a library holds it; deleting a library removes its rows.
//!
//! It then registers the many-to-many accessor `Library.books` through
//! `demo_librarybook`.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use demo_library::apps::InstalledApps;
//! use demo_library::apps::auth::User;
//! use demo_library::apps::demo::{Book, Library, NewBook};
//! use demo_library::config::Settings;
//! use demo_library::migrations::{DatabaseMigrationExecutor, MigrationProvider};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::default();
//! let pool = demo_library::db::connect("sqlite::memory:").await?;
//!
//! let mut executor = DatabaseMigrationExecutor::new(pool.clone(), &settings);
//! executor.apply_migrations(&InstalledApps::migrations(&settings)).await?;
//!
//! let user = User::create(&pool, "alice", "alice@example.com").await?;
//! let book = Book::create(&pool, &NewBook::new("Dune", Decimal::new(1999, 2), user.id)).await?;
//! let library = Library::create(&pool, "Central").await?;
//! library.add_book(&pool, &book).await?;
//! assert_eq!(library.books(&pool).await?, vec![book]);
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod commands;
pub mod config;
pub mod db;
pub mod logging;
pub mod migrations;

pub use apps::{InstalledApps, ModelError};
pub use config::Settings;
pub use migrations::{Migration, MigrationError, MigrationProvider};
