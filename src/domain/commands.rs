use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, Quantity};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub quantity: Quantity,
    /// 省略時は貸出日時 + 貸出期間
    pub due_date: Option<DateTime<Utc>>,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍をカタログに登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: u32,
    pub registered_at: DateTime<Utc>,
}
