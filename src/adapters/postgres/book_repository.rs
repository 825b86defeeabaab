use crate::domain::{BookId, book::Book};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// Column list shared by every books query.
pub(super) const BOOK_COLUMNS: &str =
    "book_id, title, author, isbn, copies, available, created_at, updated_at";

/// Map a `books` row to the Book aggregate.
///
/// `copies` is stored as INTEGER with a non-negative CHECK; the conversion
/// to u32 still fails loudly if the constraint was bypassed.
pub(super) fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let copies_i32: i32 = row.get("copies");
    let copies: u32 = copies_i32.try_into().map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("copies out of range: {}", copies_i32),
        )) as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        title: row.get("title"),
        author: row.get("author"),
        isbn: row.get("isbn"),
        copies,
        available: row.get("available"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(super) fn count_to_i32(count: u32) -> Result<i32> {
    i32::try_from(count).map_err(|_| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("count out of range: {}", count),
        )) as Box<dyn std::error::Error + Send + Sync>
    })
}

/// PostgreSQL implementation of BookRepository
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// Create a new BookRepository with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn insert(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                book_id,
                title,
                author,
                isbn,
                copies,
                available,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(count_to_i32(book.copies)?)
        .bind(book.available)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(book_id = %book.book_id, "book inserted");
        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE isbn = $1",
            BOOK_COLUMNS
        ))
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books ORDER BY title ASC, isbn ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }
}
