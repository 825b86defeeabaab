use crate::domain::{
    BookId, BorrowBookError,
    borrow::{BorrowRecord, BorrowSummary},
    commands::BorrowBook,
};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{LibraryApplicationError, Result};

/// サービスの依存関係
///
/// 振る舞いは持たず、ユースケース関数に明示的に渡される。
/// 起動時に一度だけ組み立てられ、ハンドラー間で共有される。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub borrow_repository: Arc<dyn BorrowRepository>,
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 要求数量が在庫冊数以下であること
/// - 成功時は在庫冊数を減らし、貸出記録を1件作成する
///
/// 在庫確認と書き込みはBorrowRepository::borrowの中で原子的に行われるため、
/// 同時リクエストが同じ在庫を二重に確保することはない。
///
/// # 戻り値
/// 作成された貸出記録
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<BorrowRecord> {
    let book_id = cmd.book_id;
    let quantity = cmd.quantity.value();

    let outcome = deps
        .borrow_repository
        .borrow(cmd)
        .await
        .map_err(LibraryApplicationError::BorrowRepositoryError)?;

    match outcome {
        BorrowOutcome::Borrowed {
            record,
            remaining_copies,
        } => {
            tracing::info!(
                %book_id,
                borrow_id = %record.borrow_id.value(),
                quantity,
                remaining_copies,
                "book borrowed"
            );
            Ok(record)
        }
        BorrowOutcome::BookNotFound => {
            tracing::debug!(%book_id, "borrow rejected: book not found");
            Err(LibraryApplicationError::BookNotFound(book_id))
        }
        BorrowOutcome::Rejected(BorrowBookError::InsufficientCopies {
            requested,
            available,
        }) => {
            tracing::debug!(%book_id, requested, available, "borrow rejected: not enough copies");
            Err(LibraryApplicationError::InsufficientCopies {
                requested,
                available,
            })
        }
    }
}

/// 書籍ごとの貸出集計を取得する
///
/// 貸出記録のない書籍は含まれない。書き込みがなければ何度呼んでも同じ結果を返す。
pub async fn borrowed_books_summary(deps: &ServiceDependencies) -> Result<Vec<BorrowSummary>> {
    deps.borrow_repository
        .summarize()
        .await
        .map_err(LibraryApplicationError::BorrowRepositoryError)
}

/// 書籍の貸出記録一覧を取得する
pub async fn borrow_history(
    deps: &ServiceDependencies,
    book_id: BookId,
) -> Result<Vec<BorrowRecord>> {
    let book = deps
        .book_repository
        .get_by_id(book_id)
        .await
        .map_err(LibraryApplicationError::BookRepositoryError)?;

    if book.is_none() {
        return Err(LibraryApplicationError::BookNotFound(book_id));
    }

    deps.borrow_repository
        .find_by_book_id(book_id)
        .await
        .map_err(LibraryApplicationError::BorrowRepositoryError)
}
