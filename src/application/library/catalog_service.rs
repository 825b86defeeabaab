use crate::domain::{
    self, BookId,
    book::Book,
    commands::RegisterBook,
};

use super::borrow_service::ServiceDependencies;
use super::errors::{LibraryApplicationError, Result};

/// 書籍をカタログに登録する
///
/// ISBNが重複する場合は登録しない。
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Book> {
    let existing = deps
        .book_repository
        .find_by_isbn(&cmd.isbn)
        .await
        .map_err(LibraryApplicationError::BookRepositoryError)?;

    if existing.is_some() {
        return Err(LibraryApplicationError::DuplicateIsbn(cmd.isbn));
    }

    let book = domain::book::register_book(cmd);

    deps.book_repository
        .insert(book.clone())
        .await
        .map_err(LibraryApplicationError::BookRepositoryError)?;

    tracing::info!(book_id = %book.book_id, isbn = %book.isbn, copies = book.copies, "book registered");

    Ok(book)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .get_by_id(book_id)
        .await
        .map_err(LibraryApplicationError::BookRepositoryError)?
        .ok_or(LibraryApplicationError::BookNotFound(book_id))
}

pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list()
        .await
        .map_err(LibraryApplicationError::BookRepositoryError)
}
