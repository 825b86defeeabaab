use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, borrowed_books_summary, create_book, get_book, get_borrow_history,
    list_books,
};

/// Creates the API router with all library endpoints
///
/// Borrow endpoints:
/// - POST /api/borrow - Borrow copies of a book
/// - GET /api/borrow - Per-book borrow summary
///
/// Catalog endpoints:
/// - POST /api/books - Register a book
/// - GET /api/books - List books
/// - GET /api/books/:id - Get book details
/// - GET /api/books/:id/borrows - Borrow records of a book
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/borrow", post(borrow_book).get(borrowed_books_summary))
        .route("/api/books", post(create_book).get(list_books))
        .route("/api/books/:id", get(get_book))
        .route("/api/books/:id/borrows", get(get_borrow_history))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
