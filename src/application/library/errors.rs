use crate::domain::BookId;
use thiserror::Error;

/// 図書館アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LibraryApplicationError {
    /// 書籍が存在しない
    #[error("No book found with ID: {0}")]
    BookNotFound(BookId),

    /// 要求数量が在庫冊数を超えている
    #[error("Requested quantity {requested} exceeds available copies {available}")]
    InsufficientCopies { requested: u32, available: u32 },

    /// 同じISBNの書籍が既に登録されている
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    BookRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// BorrowRepositoryのエラー
    #[error("Borrow repository error")]
    BorrowRepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryApplicationError>;
