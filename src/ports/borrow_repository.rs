use crate::domain::{
    BookId, BorrowBookError,
    borrow::{BorrowRecord, BorrowSummary},
    commands::BorrowBook,
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出処理の結果
///
/// ストレージ障害ではない業務上の結果を表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    /// 貸出記録を作成した。`remaining_copies`は貸出後の在庫冊数
    Borrowed {
        record: BorrowRecord,
        remaining_copies: u32,
    },
    /// 書籍が存在しない
    BookNotFound,
    /// ビジネスルール違反（在庫不足）
    Rejected(BorrowBookError),
}

/// 貸出記録リポジトリポート
#[async_trait]
pub trait BorrowRepository: Send + Sync {
    /// 在庫確認・在庫減算・貸出記録作成を1つの原子的な操作として実行する
    ///
    /// 在庫確認と書き込みの間に他の貸出が割り込むことはない。
    /// ルールは`domain::borrow::borrow_book`に従う。
    async fn borrow(&self, cmd: BorrowBook) -> Result<BorrowOutcome>;

    /// 書籍ごとの貸出数量の合計を返す
    ///
    /// 内部結合のため、貸出記録のない書籍は含まれない。
    async fn summarize(&self) -> Result<Vec<BorrowSummary>>;

    /// 書籍の貸出記録を作成日時順で取得する
    async fn find_by_book_id(&self, book_id: BookId) -> Result<Vec<BorrowRecord>>;
}
