pub mod book_repository;
pub mod borrow_repository;

pub use book_repository::BookRepository;
pub use borrow_repository::{BorrowOutcome, BorrowRepository};
