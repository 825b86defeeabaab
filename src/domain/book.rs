use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, commands::RegisterBook};

/// Book集約 - カタログ上の1タイトルとその在庫冊数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: u32,
    /// copies > 0 のときのみtrue
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：書籍を登録する
///
/// 在庫が0冊の書籍は登録時点で貸出不可となる。
pub fn register_book(cmd: RegisterBook) -> Book {
    Book {
        book_id: BookId::new(),
        title: cmd.title,
        author: cmd.author,
        isbn: cmd.isbn,
        copies: cmd.copies,
        available: cmd.copies > 0,
        created_at: cmd.registered_at,
        updated_at: cmd.registered_at,
    }
}

/// 純粋関数：在庫冊数を変更した書籍を返す
///
/// availableは常にcopiesから再計算される。
pub fn with_copies(book: &Book, copies: u32, updated_at: DateTime<Utc>) -> Book {
    Book {
        copies,
        available: copies > 0,
        updated_at,
        ..book.clone()
    }
}
