use crate::application::library::LibraryApplicationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use super::types::{ErrorDetail, ErrorResponse, FieldError, field_errors};

/// API層のエラー型
///
/// アプリケーション層のエラーとリクエストのバリデーションエラーをまとめ、
/// 固定形式のJSONレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Application(LibraryApplicationError),
    Validation(Vec<FieldError>),
}

impl From<LibraryApplicationError> for ApiError {
    fn from(err: LibraryApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(fields: Vec<FieldError>) -> Self {
        ApiError::Validation(fields)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(vec![FieldError::new("id", rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            // 400 Bad Request - スキーマ違反
            ApiError::Validation(fields) => {
                let mut detail = ErrorDetail::new(
                    "VALIDATION_FAILED",
                    "Request payload failed validation",
                );
                detail.fields = fields;
                (StatusCode::BAD_REQUEST, "Validation failed", detail)
            }

            ApiError::Application(err) => match err {
                // 404 Not Found
                LibraryApplicationError::BookNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "Book not found",
                    ErrorDetail::new("BOOK_NOT_FOUND", err.to_string()),
                ),

                // 400 Bad Request - ビジネスルール違反
                LibraryApplicationError::InsufficientCopies {
                    requested,
                    available,
                } => {
                    let mut detail = ErrorDetail::new("INSUFFICIENT_COPIES", err.to_string());
                    detail.requested = Some(requested);
                    detail.available = Some(available);
                    (StatusCode::BAD_REQUEST, "Not enough copies available", detail)
                }

                // 409 Conflict
                LibraryApplicationError::DuplicateIsbn(_) => (
                    StatusCode::CONFLICT,
                    "Duplicate ISBN",
                    ErrorDetail::new("DUPLICATE_ISBN", err.to_string()),
                ),

                // 500 Internal Server Error - システム障害
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                LibraryApplicationError::BookRepositoryError(ref e) => {
                    tracing::error!("Book repository error: {}", e);
                    internal_error()
                }
                LibraryApplicationError::BorrowRepositoryError(ref e) => {
                    tracing::error!("Borrow repository error: {}", e);
                    internal_error()
                }
            },
        };

        let body = Json(ErrorResponse::new(message, detail));
        (status, body).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, ErrorDetail) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server error",
        ErrorDetail::new("INTERNAL_ERROR", "An unexpected error occurred"),
    )
}
