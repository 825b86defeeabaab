use crate::application::library::{
    ServiceDependencies, borrow_book as execute_borrow_book,
    borrow_history as execute_borrow_history,
    borrowed_books_summary as execute_borrowed_books_summary, get_book as execute_get_book,
    list_books as execute_list_books, register_book as execute_register_book,
};
use crate::domain::BookId;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{
    error::ApiError,
    types::{
        ApiResponse, BookResponse, BorrowBookRequest, BorrowRecordResponse, BorrowSummaryResponse,
        RegisterBookRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Borrow
// ============================================================================

/// POST /api/borrow - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること（404）
/// - 要求数量が在庫冊数以下であること（400）
///
/// 成功時は在庫冊数が減り、作成された貸出記録を返す。
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BorrowBookRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<BorrowRecordResponse>>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    let cmd = req.to_command(chrono::Utc::now())?;

    let record = execute_borrow_book(&state.service_deps, cmd).await?;

    Ok(Json(ApiResponse::ok(
        "Book borrowed successfully",
        BorrowRecordResponse::from(record),
    )))
}

/// GET /api/borrow - 書籍ごとの貸出集計
///
/// 貸出記録のある書籍のみ、title/isbnと合計数量を返す。
pub async fn borrowed_books_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BorrowSummaryResponse>>>, ApiError> {
    let summary = execute_borrowed_books_summary(&state.service_deps).await?;

    Ok(Json(ApiResponse::ok(
        "Borrowed books summary retrieved successfully",
        summary.into_iter().map(BorrowSummaryResponse::from).collect(),
    )))
}

// ============================================================================
// Catalog
// ============================================================================

/// POST /api/books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<BookResponse>>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;
    let cmd = req.to_command(chrono::Utc::now())?;

    let book = execute_register_book(&state.service_deps, cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Book created successfully",
            BookResponse::from(book),
        )),
    ))
}

/// GET /api/books - 書籍一覧（タイトル順）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookResponse>>>, ApiError> {
    let books = execute_list_books(&state.service_deps).await?;

    Ok(Json(ApiResponse::ok(
        "Books retrieved successfully",
        books.into_iter().map(BookResponse::from).collect(),
    )))
}

/// GET /api/books/:id - 書籍詳細をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    book_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<BookResponse>>, ApiError> {
    let Path(book_id) = book_id?;

    let book = execute_get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(ApiResponse::ok(
        "Book retrieved successfully",
        BookResponse::from(book),
    )))
}

/// GET /api/books/:id/borrows - 書籍の貸出記録一覧
pub async fn get_borrow_history(
    State(state): State<Arc<AppState>>,
    book_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<BorrowRecordResponse>>>, ApiError> {
    let Path(book_id) = book_id?;

    let records = execute_borrow_history(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(ApiResponse::ok(
        "Borrow records retrieved successfully",
        records.into_iter().map(BorrowRecordResponse::from).collect(),
    )))
}
