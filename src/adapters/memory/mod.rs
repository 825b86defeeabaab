use crate::domain::{
    self, BookId,
    book::Book,
    borrow::{BorrowRecord, BorrowSummary},
    commands::BorrowBook,
};
use crate::ports::{
    BorrowOutcome, book_repository::BookRepository, borrow_repository::BorrowRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Default)]
struct State {
    books: HashMap<BookId, Book>,
    records: Vec<BorrowRecord>,
}

/// インメモリのストレージ実装
///
/// BookRepositoryとBorrowRepositoryの両方を実装する。
/// 1つのMutexで書籍と貸出記録を保護するため、貸出処理は原子的に実行される。
/// データベースなしでの起動とテストで使用する。
pub struct InMemoryLibrary {
    state: Mutex<State>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| "in-memory library state is poisoned".into())
    }

    /// 保存済みの全貸出記録（作成順）
    pub fn records(&self) -> Result<Vec<BorrowRecord>> {
        Ok(self.lock()?.records.clone())
    }
}

impl Default for InMemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepository for InMemoryLibrary {
    async fn insert(&self, book: Book) -> Result<()> {
        let mut state = self.lock()?;
        if state.books.values().any(|b| b.isbn == book.isbn) {
            return Err(format!("duplicate isbn: {}", book.isbn).into());
        }
        state.books.insert(book.book_id, book);
        Ok(())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        Ok(self
            .lock()?
            .books
            .values()
            .find(|b| b.isbn == isbn)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let mut books: Vec<Book> = self.lock()?.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
        Ok(books)
    }
}

#[async_trait]
impl BorrowRepository for InMemoryLibrary {
    async fn borrow(&self, cmd: BorrowBook) -> Result<BorrowOutcome> {
        let mut state = self.lock()?;

        let Some(book) = state.books.get(&cmd.book_id) else {
            return Ok(BorrowOutcome::BookNotFound);
        };

        let (updated_book, record) = match domain::borrow::borrow_book(book, &cmd) {
            Ok(result) => result,
            Err(e) => return Ok(BorrowOutcome::Rejected(e)),
        };

        let remaining_copies = updated_book.copies;
        state.books.insert(updated_book.book_id, updated_book);
        state.records.push(record.clone());

        Ok(BorrowOutcome::Borrowed {
            record,
            remaining_copies,
        })
    }

    async fn summarize(&self) -> Result<Vec<BorrowSummary>> {
        let state = self.lock()?;
        Ok(domain::borrow::summarize(
            &state.records,
            state.books.values(),
        ))
    }

    async fn find_by_book_id(&self, book_id: BookId) -> Result<Vec<BorrowRecord>> {
        Ok(self
            .lock()?
            .records
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }
}
