use crate::domain::{BookId, book::Book};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// カタログ（booksコレクション）への読み書きを抽象化する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 新しい書籍を保存する
    async fn insert(&self, book: Book) -> Result<()>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// ISBNで書籍を検索する
    ///
    /// 登録時の重複チェックに使用される。
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// 全書籍をタイトル順で取得する
    async fn list(&self) -> Result<Vec<Book>>;
}
