use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::{
    BookId, Quantity,
    book::Book,
    borrow::{BorrowRecord, BorrowSummary},
    commands::{BorrowBook, RegisterBook},
};

// ============================================================================
// Requests
// ============================================================================

/// 貸出リクエスト（POST /api/borrow）
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BorrowBookRequest {
    /// 書籍ID（UUID文字列）
    #[validate(custom(function = "validate_book_id"))]
    pub book: String,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i64,
    /// 返却期限（省略時は14日後）
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl BorrowBookRequest {
    /// バリデーション済みのリクエストをコマンドに変換する
    pub fn to_command(&self, borrowed_at: DateTime<Utc>) -> Result<BorrowBook, Vec<FieldError>> {
        let book_id = Uuid::parse_str(&self.book)
            .map(BookId::from_uuid)
            .map_err(|_| vec![FieldError::new("book", INVALID_BOOK_ID_MESSAGE)])?;

        let quantity = Quantity::try_from(self.quantity)
            .map_err(|e| vec![FieldError::new("quantity", e.to_string())])?;

        if self.due_date.is_some_and(|due| due <= borrowed_at) {
            return Err(vec![FieldError::new(
                "dueDate",
                "Due date must be after the borrow time",
            )]);
        }

        Ok(BorrowBook {
            book_id,
            quantity,
            due_date: self.due_date,
            borrowed_at,
        })
    }
}

const INVALID_BOOK_ID_MESSAGE: &str = "Book must be a valid book ID";

fn validate_book_id(value: &str) -> Result<(), ValidationError> {
    if Uuid::parse_str(value).is_err() {
        let mut err = ValidationError::new("invalid_book_id");
        err.message = Some(Cow::from(INVALID_BOOK_ID_MESSAGE));
        return Err(err);
    }
    Ok(())
}

/// 書籍登録リクエスト（POST /api/books）
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBookRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10 to 17 characters"))]
    pub isbn: String,
    #[validate(range(
        min = 0,
        max = 2147483647,
        message = "Copies must be a non-negative integer"
    ))]
    pub copies: i64,
}

impl RegisterBookRequest {
    pub fn to_command(&self, registered_at: DateTime<Utc>) -> Result<RegisterBook, Vec<FieldError>> {
        let copies = u32::try_from(self.copies)
            .map_err(|_| vec![FieldError::new("copies", "Copies must be a non-negative integer")])?;

        Ok(RegisterBook {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            copies,
            registered_at,
        })
    }
}

/// 前後の空白を除いてから検証する
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

// ============================================================================
// Responses
// ============================================================================

/// 成功レスポンスの共通形式
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// 貸出記録レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecordResponse {
    pub id: Uuid,
    pub book: Uuid,
    pub quantity: u32,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BorrowRecord> for BorrowRecordResponse {
    fn from(record: BorrowRecord) -> Self {
        Self {
            id: record.borrow_id.value(),
            book: record.book_id.value(),
            quantity: record.quantity.value(),
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: u32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            copies: book.copies,
            available: book.available,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryBookResponse {
    pub title: String,
    pub isbn: String,
}

/// 貸出集計レスポンス（GET /api/borrow）
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummaryResponse {
    pub book: SummaryBookResponse,
    pub total_quantity: u64,
}

impl From<BorrowSummary> for BorrowSummaryResponse {
    fn from(summary: BorrowSummary) -> Self {
        Self {
            book: SummaryBookResponse {
                title: summary.book.title,
                isbn: summary.book.isbn,
            },
            total_quantity: summary.total_quantity,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// フィールド単位のバリデーションエラー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// ValidationErrorsをフィールド名順のFieldErrorに変換する
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// クライアントに返すエラー詳細
///
/// 内部のエラー構造は含めない。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
            requested: None,
            available: None,
            fields: Vec::new(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ErrorDetail,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: ErrorDetail) -> Self {
        Self {
            success: false,
            message: message.into(),
            error,
        }
    }
}
