//! Integration tests for the demo models against a migrated database

use demo_library::ModelError;
use demo_library::apps::InstalledApps;
use demo_library::apps::auth::User;
use demo_library::apps::demo::{Book, Library, LibraryBook, NewBook};
use demo_library::config::Settings;
use demo_library::migrations::{DatabaseMigrationExecutor, MigrationProvider};
use rstest::*;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

#[fixture]
async fn migrated() -> (SqlitePool, User) {
	let settings = Settings::default();
	let pool = demo_library::db::connect("sqlite::memory:").await.unwrap();
	DatabaseMigrationExecutor::new(pool.clone(), &settings)
		.apply_migrations(&InstalledApps::migrations(&settings))
		.await
		.unwrap();
	let user = User::create(&pool, "alice", "alice@example.com")
		.await
		.unwrap();
	(pool, user)
}

fn dune(user: &User) -> NewBook {
	NewBook::new("Dune", Decimal::new(1999, 2), user.id)
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
	sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
		.fetch_one(pool)
		.await
		.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_create_book_with_defaults(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;

	// Act
	let book = Book::create(&pool, &dune(&user)).await.unwrap();

	// Assert
	assert!(!book.archived);
	assert_eq!(book.amount.to_string(), "19.99");
	assert_eq!(book.amount_off, None);
	assert_eq!(book.percentage, None);
	assert_eq!(book.created_by_id, user.id);
	assert_eq!(Book::get(&pool, book.id).await.unwrap(), book);
}

#[rstest]
#[tokio::test]
async fn test_decimal_columns_keep_their_scale(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;
	let new = NewBook::new("Emma", Decimal::new(20, 0), user.id)
		.amount_off(Decimal::new(75, 1))
		.percentage(Decimal::new(15, 0));

	let book = Book::create(&pool, &new).await.unwrap();

	assert_eq!(book.amount.to_string(), "20.00");
	assert_eq!(book.amount_off.map(|d| d.to_string()).as_deref(), Some("7.50"));
	assert_eq!(book.percentage.map(|d| d.to_string()).as_deref(), Some("15"));
}

#[rstest]
#[tokio::test]
async fn test_amount_is_required(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;

	// Act
	let result = sqlx::query(
		"INSERT INTO demo_book (name, amount, amount_off, percentage, created_by_id) \
		 VALUES ('No price', NULL, NULL, NULL, ?)",
	)
	.bind(user.id)
	.execute(&pool)
	.await;

	// Assert
	assert!(result.is_err());
	assert_eq!(count(&pool, "demo_book").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_out_of_range_decimal_is_rejected(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;
	let new = dune(&user).amount_off(Decimal::new(10_000_000, 2));

	let result = Book::create(&pool, &new).await;

	assert!(matches!(
		result,
		Err(ModelError::InvalidValue {
			field: "amount_off",
			..
		})
	));
	assert_eq!(count(&pool, "demo_book").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_library_books_through_association(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;
	let library = Library::create(&pool, "Central").await.unwrap();
	let first = Book::create(&pool, &dune(&user)).await.unwrap();
	let second = Book::create(&pool, &NewBook::new("Emma", Decimal::new(899, 2), user.id))
		.await
		.unwrap();

	// Act
	let link = library.add_book(&pool, &second).await.unwrap();
	library.add_book(&pool, &first).await.unwrap();

	// Assert
	let books = library.books(&pool).await.unwrap();
	assert_eq!(books, vec![second.clone(), first.clone()]);
	let rows = library.library_books(&pool).await.unwrap();
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0], link);
	assert_eq!(LibraryBook::get(&pool, link.id).await.unwrap(), link);
	assert_eq!(link.book(&pool).await.unwrap(), second);
	assert_eq!(link.library(&pool).await.unwrap(), library);
}

#[rstest]
#[tokio::test]
async fn test_referenced_book_is_protected(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;
	let library = Library::create(&pool, "Central").await.unwrap();
	let book = Book::create(&pool, &dune(&user)).await.unwrap();
	library.add_book(&pool, &book).await.unwrap();

	// Act
	let result = book.clone().delete(&pool).await;

	// Assert
	assert!(matches!(
		result,
		Err(ModelError::Protected {
			model: "Book",
			referenced_by: "LibraryBook",
			count: 1,
			..
		})
	));
	assert!(Book::get(&pool, book.id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_database_restricts_referenced_book_delete(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;
	let library = Library::create(&pool, "Central").await.unwrap();
	let book = Book::create(&pool, &dune(&user)).await.unwrap();
	library.add_book(&pool, &book).await.unwrap();

	// Act: bypass the model check
	let result = sqlx::query("DELETE FROM demo_book WHERE id = ?")
		.bind(book.id)
		.execute(&pool)
		.await;

	// Assert
	assert!(result.is_err());
	assert_eq!(count(&pool, "demo_book").await, 1);
}

#[rstest]
#[tokio::test]
async fn test_unreferenced_book_can_be_deleted(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;
	let book = Book::create(&pool, &dune(&user)).await.unwrap();
	let id = book.id;

	book.delete(&pool).await.unwrap();

	assert!(matches!(
		Book::get(&pool, id).await,
		Err(ModelError::NotFound { model: "Book", .. })
	));
}

#[rstest]
#[tokio::test]
async fn test_removing_association_unprotects_book(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;
	let library = Library::create(&pool, "Central").await.unwrap();
	let book = Book::create(&pool, &dune(&user)).await.unwrap();
	let link = library.add_book(&pool, &book).await.unwrap();

	link.delete(&pool).await.unwrap();
	book.delete(&pool).await.unwrap();

	assert_eq!(count(&pool, "demo_book").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_deleting_library_cascades_to_association_rows(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;
	let central = Library::create(&pool, "Central").await.unwrap();
	let branch = Library::create(&pool, "Branch").await.unwrap();
	let book = Book::create(&pool, &dune(&user)).await.unwrap();
	central.add_book(&pool, &book).await.unwrap();
	branch.add_book(&pool, &book).await.unwrap();

	// Act
	central.delete(&pool).await.unwrap();

	// Assert
	assert_eq!(count(&pool, "demo_librarybook").await, 1);
	assert_eq!(branch.books(&pool).await.unwrap(), vec![book.clone()]);
	assert!(Book::get(&pool, book.id).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_deleting_user_cascades_to_books(#[future] migrated: (SqlitePool, User)) {
	// Arrange
	let (pool, user) = migrated.await;
	let other = User::create(&pool, "bob", "bob@example.com").await.unwrap();
	let owned = Book::create(&pool, &dune(&user)).await.unwrap();
	let kept = Book::create(&pool, &dune(&other)).await.unwrap();

	// Act
	user.delete(&pool).await.unwrap();

	// Assert
	assert!(matches!(
		Book::get(&pool, owned.id).await,
		Err(ModelError::NotFound { .. })
	));
	assert_eq!(Book::created_by(&pool, other.id).await.unwrap(), vec![kept]);
}

#[rstest]
#[tokio::test]
async fn test_archive_book(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;
	let mut book = Book::create(&pool, &dune(&user)).await.unwrap();

	book.archive(&pool).await.unwrap();

	assert!(book.archived);
	assert!(Book::get(&pool, book.id).await.unwrap().archived);
}

#[rstest]
#[tokio::test]
async fn test_user_defaults(#[future] migrated: (SqlitePool, User)) {
	let (pool, user) = migrated.await;

	let fetched = User::get(&pool, user.id).await.unwrap();

	assert!(fetched.is_active);
	assert_eq!(fetched.username, "alice");
	assert!(User::create(&pool, "alice", "other@example.com").await.is_err());
}
