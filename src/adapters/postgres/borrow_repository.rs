use crate::domain::{
    self, BookId, BorrowId, Quantity,
    borrow::{BorrowRecord, BorrowSummary, SummaryBook},
    commands::BorrowBook,
};
use crate::ports::borrow_repository::{
    BorrowOutcome, BorrowRepository as BorrowRepositoryTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::book_repository::{BOOK_COLUMNS, count_to_i32, map_row_to_book};

/// PostgreSQLの行データをBorrowRecordに変換する
///
/// quantityはINTEGER（CHECK > 0）で保存されているが、
/// Quantityへの変換で不正値を検出する。
fn map_row_to_borrow_record(row: &PgRow) -> Result<BorrowRecord> {
    let quantity_i32: i32 = row.get("quantity");
    let quantity = u32::try_from(quantity_i32)
        .ok()
        .and_then(|q| Quantity::new(q).ok())
        .ok_or_else(|| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("quantity out of range: {}", quantity_i32),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

    Ok(BorrowRecord {
        borrow_id: BorrowId::from_uuid(row.get("borrow_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        quantity,
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// BorrowRepositoryのPostgreSQL実装
pub struct BorrowRepository {
    pool: PgPool,
}

impl BorrowRepository {
    /// PostgreSQLコネクションプールから新しいBorrowRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowRepositoryTrait for BorrowRepository {
    /// 在庫確認と貸出記録作成を1トランザクションで実行
    ///
    /// SELECT ... FOR UPDATEで書籍行をロックするため、
    /// 同じ書籍への同時貸出は直列化される。
    /// 早期リターン時はトランザクションがdropされロールバックされる。
    async fn borrow(&self, cmd: BorrowBook) -> Result<BorrowOutcome> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1 FOR UPDATE",
            BOOK_COLUMNS
        ))
        .bind(cmd.book_id.value())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(BorrowOutcome::BookNotFound);
        };
        let book = map_row_to_book(&row)?;

        let (updated_book, record) = match domain::borrow::borrow_book(&book, &cmd) {
            Ok(result) => result,
            Err(e) => return Ok(BorrowOutcome::Rejected(e)),
        };

        sqlx::query(
            r#"
            UPDATE books
            SET copies = $2, available = $3, updated_at = $4
            WHERE book_id = $1
            "#,
        )
        .bind(updated_book.book_id.value())
        .bind(count_to_i32(updated_book.copies)?)
        .bind(updated_book.available)
        .bind(updated_book.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO borrow_records (
                borrow_id,
                book_id,
                quantity,
                due_date,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.borrow_id.value())
        .bind(record.book_id.value())
        .bind(count_to_i32(record.quantity.value())?)
        .bind(record.due_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BorrowOutcome::Borrowed {
            record,
            remaining_copies: updated_book.copies,
        })
    }

    /// 書籍ごとの貸出集計
    ///
    /// GROUP BYで数量を合計し、booksと内部結合する。
    async fn summarize(&self) -> Result<Vec<BorrowSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT
                b.title,
                b.isbn,
                g.total_quantity
            FROM (
                SELECT book_id, SUM(quantity)::BIGINT AS total_quantity
                FROM borrow_records
                GROUP BY book_id
            ) g
            INNER JOIN books b ON b.book_id = g.book_id
            ORDER BY b.title ASC, b.isbn ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let total: i64 = row.get("total_quantity");
                let total_quantity = u64::try_from(total).map_err(|_| {
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("total_quantity out of range: {}", total),
                    )) as Box<dyn std::error::Error + Send + Sync>
                })?;
                Ok(BorrowSummary {
                    book: SummaryBook {
                        title: row.get("title"),
                        isbn: row.get("isbn"),
                    },
                    total_quantity,
                })
            })
            .collect()
    }

    async fn find_by_book_id(&self, book_id: BookId) -> Result<Vec<BorrowRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                borrow_id,
                book_id,
                quantity,
                due_date,
                created_at,
                updated_at
            FROM borrow_records
            WHERE book_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(book_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_borrow_record).collect()
    }
}
