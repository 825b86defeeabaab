mod borrow_service;
mod catalog_service;
mod errors;

pub use borrow_service::{ServiceDependencies, borrow_book, borrow_history, borrowed_books_summary};
pub use catalog_service::{get_book, list_books, register_book};
pub use errors::{LibraryApplicationError, Result};
