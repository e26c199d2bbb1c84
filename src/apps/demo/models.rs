//! Row models for the demo app
//!
//! SQLite has no fixed-point type, so decimal columns are written as text
//! and read back through `CAST(.. AS TEXT)`, then rescaled to the column's
//! declared number of decimal places.

use crate::apps::{ModelError, ModelResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Declared `(max_digits, decimal_places)` of the decimal columns
const AMOUNT_DIGITS: (u32, u32) = (9, 2);
const AMOUNT_OFF_DIGITS: (u32, u32) = (7, 2);
const PERCENTAGE_DIGITS: (u32, u32) = (3, 0);

fn book_columns(alias: &str) -> String {
	format!(
		"{a}.id, {a}.name, {a}.archived, \
		 CAST({a}.amount AS TEXT) AS amount, \
		 CAST({a}.amount_off AS TEXT) AS amount_off, \
		 CAST({a}.percentage AS TEXT) AS percentage, \
		 {a}.created_by_id",
		a = alias
	)
}

/// Check that `value` fits a `DECIMAL(max_digits, decimal_places)` column
///
/// # Example
///
/// ```rust
/// use demo_library::apps::demo::models::validate_decimal;
/// use rust_decimal::Decimal;
///
/// assert!(validate_decimal("amount", Decimal::new(1234567_89, 2), 9, 2).is_ok());
/// assert!(validate_decimal("amount", Decimal::new(12345678_90, 2), 9, 2).is_err());
/// assert!(validate_decimal("amount", Decimal::new(1_005, 3), 9, 2).is_err());
/// ```
pub fn validate_decimal(
	field: &'static str,
	value: Decimal,
	max_digits: u32,
	decimal_places: u32,
) -> ModelResult<()> {
	let Some(max_whole_digits) = max_digits.checked_sub(decimal_places) else {
		return Err(ModelError::InvalidValue {
			field,
			message: format!(
				"decimal_places ({}) cannot exceed max_digits ({})",
				decimal_places, max_digits
			),
		});
	};

	let normalized = value.normalize();
	if normalized.scale() > decimal_places {
		return Err(ModelError::InvalidValue {
			field,
			message: format!(
				"ensure that there are no more than {} decimal places",
				decimal_places
			),
		});
	}

	let whole_digits = normalized
		.trunc()
		.abs()
		.to_string()
		.trim_start_matches('0')
		.len() as u32;
	if whole_digits > max_whole_digits {
		return Err(ModelError::InvalidValue {
			field,
			message: format!(
				"ensure that there are no more than {} digits before the decimal point",
				max_whole_digits
			),
		});
	}

	Ok(())
}

fn parse_decimal(field: &'static str, text: &str, scale: u32) -> ModelResult<Decimal> {
	let mut value = Decimal::from_str(text).map_err(|e| ModelError::InvalidValue {
		field,
		message: format!("stored value '{}' is not a decimal: {}", text, e),
	})?;
	value.rescale(scale);
	Ok(value)
}

/// Values for a book that has not been saved yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
	pub name: String,
	pub archived: bool,
	pub amount: Decimal,
	pub amount_off: Option<Decimal>,
	pub percentage: Option<Decimal>,
	pub created_by: i64,
}

impl NewBook {
	pub fn new(name: impl Into<String>, amount: Decimal, created_by: i64) -> Self {
		Self {
			name: name.into(),
			archived: false,
			amount,
			amount_off: None,
			percentage: None,
			created_by,
		}
	}

	pub fn amount_off(mut self, amount_off: Decimal) -> Self {
		self.amount_off = Some(amount_off);
		self
	}

	pub fn percentage(mut self, percentage: Decimal) -> Self {
		self.percentage = Some(percentage);
		self
	}

	pub fn archived(mut self, archived: bool) -> Self {
		self.archived = archived;
		self
	}

	/// Check every field against its column definition
	pub fn validate(&self) -> ModelResult<()> {
		if self.name.chars().count() > 255 {
			return Err(ModelError::InvalidValue {
				field: "name",
				message: "ensure this value has at most 255 characters".to_string(),
			});
		}
		validate_decimal("amount", self.amount, AMOUNT_DIGITS.0, AMOUNT_DIGITS.1)?;
		if let Some(amount_off) = self.amount_off {
			validate_decimal(
				"amount_off",
				amount_off,
				AMOUNT_OFF_DIGITS.0,
				AMOUNT_OFF_DIGITS.1,
			)?;
		}
		if let Some(percentage) = self.percentage {
			validate_decimal(
				"percentage",
				percentage,
				PERCENTAGE_DIGITS.0,
				PERCENTAGE_DIGITS.1,
			)?;
		}
		Ok(())
	}
}

#[derive(sqlx::FromRow)]
struct BookRow {
	id: i64,
	name: String,
	archived: bool,
	amount: String,
	amount_off: Option<String>,
	percentage: Option<String>,
	created_by_id: i64,
}

/// A saved book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
	pub id: i64,
	pub name: String,
	pub archived: bool,
	pub amount: Decimal,
	pub amount_off: Option<Decimal>,
	pub percentage: Option<Decimal>,
	pub created_by_id: i64,
}

impl TryFrom<BookRow> for Book {
	type Error = ModelError;

	fn try_from(row: BookRow) -> ModelResult<Self> {
		Ok(Self {
			id: row.id,
			name: row.name,
			archived: row.archived,
			amount: parse_decimal("amount", &row.amount, AMOUNT_DIGITS.1)?,
			amount_off: row
				.amount_off
				.as_deref()
				.map(|text| parse_decimal("amount_off", text, AMOUNT_OFF_DIGITS.1))
				.transpose()?,
			percentage: row
				.percentage
				.as_deref()
				.map(|text| parse_decimal("percentage", text, PERCENTAGE_DIGITS.1))
				.transpose()?,
			created_by_id: row.created_by_id,
		})
	}
}

impl Book {
	/// Validate and insert a new book
	pub async fn create(pool: &SqlitePool, new: &NewBook) -> ModelResult<Self> {
		new.validate()?;

		let id = sqlx::query(
			"INSERT INTO demo_book (name, archived, amount, amount_off, percentage, created_by_id) \
			 VALUES (?, ?, ?, ?, ?, ?)",
		)
		.bind(&new.name)
		.bind(new.archived)
		.bind(new.amount.to_string())
		.bind(new.amount_off.map(|d| d.to_string()))
		.bind(new.percentage.map(|d| d.to_string()))
		.bind(new.created_by)
		.execute(pool)
		.await?
		.last_insert_rowid();

		Self::get(pool, id).await
	}

	pub async fn get(pool: &SqlitePool, id: i64) -> ModelResult<Self> {
		let sql = format!("SELECT {} FROM demo_book b WHERE b.id = ?", book_columns("b"));
		sqlx::query_as::<_, BookRow>(&sql)
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or(ModelError::NotFound { model: "Book", id })?
			.try_into()
	}

	/// All books created by a user, oldest first
	pub async fn created_by(pool: &SqlitePool, user_id: i64) -> ModelResult<Vec<Self>> {
		let sql = format!(
			"SELECT {} FROM demo_book b WHERE b.created_by_id = ? ORDER BY b.id",
			book_columns("b")
		);
		sqlx::query_as::<_, BookRow>(&sql)
			.bind(user_id)
			.fetch_all(pool)
			.await?
			.into_iter()
			.map(Book::try_from)
			.collect()
	}

	/// Mark the book archived
	pub async fn archive(&mut self, pool: &SqlitePool) -> ModelResult<()> {
		sqlx::query("UPDATE demo_book SET archived = TRUE WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		self.archived = true;
		Ok(())
	}

	/// Delete the book
	///
	/// Fails with [`ModelError::Protected`] while any library still holds it.
	pub async fn delete(self, pool: &SqlitePool) -> ModelResult<()> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demo_librarybook WHERE books_id = ?")
			.bind(self.id)
			.fetch_one(pool)
			.await?;
		if count > 0 {
			return Err(ModelError::Protected {
				model: "Book",
				id: self.id,
				referenced_by: "LibraryBook",
				count,
			});
		}

		let result = sqlx::query("DELETE FROM demo_book WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(ModelError::NotFound {
				model: "Book",
				id: self.id,
			});
		}
		Ok(())
	}
}

/// A library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Library {
	pub id: i64,
	pub name: String,
}

impl Library {
	pub async fn create(pool: &SqlitePool, name: &str) -> ModelResult<Self> {
		if name.chars().count() > 255 {
			return Err(ModelError::InvalidValue {
				field: "name",
				message: "ensure this value has at most 255 characters".to_string(),
			});
		}

		let id = sqlx::query("INSERT INTO demo_library (name) VALUES (?)")
			.bind(name)
			.execute(pool)
			.await?
			.last_insert_rowid();

		Ok(Self {
			id,
			name: name.to_string(),
		})
	}

	pub async fn get(pool: &SqlitePool, id: i64) -> ModelResult<Self> {
		sqlx::query_as::<_, Self>("SELECT id, name FROM demo_library WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await?
			.ok_or(ModelError::NotFound {
				model: "Library",
				id,
			})
	}

	/// Delete the library together with its association rows; the books stay
	pub async fn delete(self, pool: &SqlitePool) -> ModelResult<()> {
		let result = sqlx::query("DELETE FROM demo_library WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		if result.rows_affected() == 0 {
			return Err(ModelError::NotFound {
				model: "Library",
				id: self.id,
			});
		}
		Ok(())
	}

	/// Put `book` on this library's shelves
	pub async fn add_book(&self, pool: &SqlitePool, book: &Book) -> ModelResult<LibraryBook> {
		let id = sqlx::query("INSERT INTO demo_librarybook (books_id, library_id) VALUES (?, ?)")
			.bind(book.id)
			.bind(self.id)
			.execute(pool)
			.await?
			.last_insert_rowid();

		Ok(LibraryBook {
			id,
			books_id: book.id,
			library_id: self.id,
		})
	}

	/// Books reachable through the association rows, in the order they were added
	pub async fn books(&self, pool: &SqlitePool) -> ModelResult<Vec<Book>> {
		let sql = format!(
			"SELECT {} FROM demo_book b \
			 JOIN demo_librarybook lb ON lb.books_id = b.id \
			 WHERE lb.library_id = ? ORDER BY lb.id",
			book_columns("b")
		);
		sqlx::query_as::<_, BookRow>(&sql)
			.bind(self.id)
			.fetch_all(pool)
			.await?
			.into_iter()
			.map(Book::try_from)
			.collect()
	}

	/// The association rows themselves (reverse accessor `library_books`)
	pub async fn library_books(&self, pool: &SqlitePool) -> ModelResult<Vec<LibraryBook>> {
		Ok(sqlx::query_as::<_, LibraryBook>(
			"SELECT id, books_id, library_id FROM demo_librarybook WHERE library_id = ? ORDER BY id",
		)
		.bind(self.id)
		.fetch_all(pool)
		.await?)
	}
}

/// Association row between a [`Library`] and a [`Book`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryBook {
	pub id: i64,
	pub books_id: i64,
	pub library_id: i64,
}

impl LibraryBook {
	pub async fn get(pool: &SqlitePool, id: i64) -> ModelResult<Self> {
		sqlx::query_as::<_, Self>(
			"SELECT id, books_id, library_id FROM demo_librarybook WHERE id = ?",
		)
		.bind(id)
		.fetch_optional(pool)
		.await?
		.ok_or(ModelError::NotFound {
			model: "LibraryBook",
			id,
		})
	}

	pub async fn book(&self, pool: &SqlitePool) -> ModelResult<Book> {
		Book::get(pool, self.books_id).await
	}

	pub async fn library(&self, pool: &SqlitePool) -> ModelResult<Library> {
		Library::get(pool, self.library_id).await
	}

	/// Remove the book from the library
	pub async fn delete(self, pool: &SqlitePool) -> ModelResult<()> {
		sqlx::query("DELETE FROM demo_librarybook WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Decimal::new(999_999_999, 2), 9, 2, true)]
	#[case(Decimal::new(1_000_000_000, 2), 9, 2, false)]
	#[case(Decimal::new(12_345, 3), 7, 2, false)]
	#[case(Decimal::new(12_340, 3), 7, 2, true)]
	#[case(Decimal::new(999, 0), 3, 0, true)]
	#[case(Decimal::new(1000, 0), 3, 0, false)]
	#[case(Decimal::new(-999, 0), 3, 0, true)]
	#[case(Decimal::new(5, 1), 3, 0, false)]
	fn test_validate_decimal(
		#[case] value: Decimal,
		#[case] max_digits: u32,
		#[case] decimal_places: u32,
		#[case] ok: bool,
	) {
		assert_eq!(
			validate_decimal("field", value, max_digits, decimal_places).is_ok(),
			ok
		);
	}

	#[rstest]
	fn test_validate_decimal_rejects_more_places_than_digits() {
		let result = validate_decimal("field", Decimal::new(1, 0), 2, 3);

		assert!(matches!(
			result,
			Err(ModelError::InvalidValue { field: "field", .. })
		));
	}

	#[rstest]
	#[case("19.99", 2, "19.99")]
	#[case("20", 2, "20.00")]
	#[case("7.5", 2, "7.50")]
	#[case("15", 0, "15")]
	fn test_parse_decimal_rescales(#[case] text: &str, #[case] scale: u32, #[case] expected: &str) {
		assert_eq!(parse_decimal("amount", text, scale).unwrap().to_string(), expected);
	}

	#[rstest]
	fn test_new_book_validation_reports_field() {
		let new = NewBook::new("Dune", Decimal::new(1999, 2), 1).percentage(Decimal::new(1234, 0));

		let result = new.validate();

		assert!(matches!(
			result,
			Err(ModelError::InvalidValue { field: "percentage", .. })
		));
	}
}
