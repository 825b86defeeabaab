pub mod book_repository;
pub mod borrow_repository;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use borrow_repository::BorrowRepository as PostgresBorrowRepository;
