use axum::body::Body;
use axum::http::{Request, StatusCode};
use rusty_library_borrow::api::types::*;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

use common::{memory_app, send, send_json};

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// 書籍を登録し、IDを返す
async fn create_book(app: &axum::Router, title: &str, isbn: &str, copies: i64) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/books",
        Some(json!({
            "title": title,
            "author": "Test Author",
            "isbn": isbn,
            "copies": copies,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn borrow(app: &axum::Router, book_id: &str, quantity: i64) -> (StatusCode, Value) {
    send_json(
        app,
        "POST",
        "/api/borrow",
        Some(json!({ "book": book_id, "quantity": quantity })),
    )
    .await
}

async fn summary(app: &axum::Router) -> Vec<BorrowSummaryResponse> {
    let (status, body) = send_json(app, "GET", "/api/borrow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Borrowed books summary retrieved successfully"
    );
    serde_json::from_value(body["data"].clone()).unwrap()
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_e2e_borrow_flow() {
    let (app, library) = memory_app();
    let book_id = create_book(&app, "Dune", "9780441013593", 5).await;

    // Step 1: 3冊借りる
    let (status, body) = borrow(&app, &book_id, 3).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book borrowed successfully");

    let record: BorrowRecordResponse = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(record.book.to_string(), book_id);
    assert_eq!(record.quantity, 3);
    assert_eq!(record.due_date, record.created_at + chrono::Duration::days(14));

    // Step 2: 在庫が減っている
    let (status, body) = send_json(&app, "GET", &format!("/api/books/{}", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["copies"], 2);
    assert_eq!(body["data"]["available"], true);

    // Step 3: 残り2冊なので3冊は借りられない
    let (status, body) = borrow(&app, &book_id, 3).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not enough copies available");
    assert_eq!(body["error"]["code"], "INSUFFICIENT_COPIES");
    assert_eq!(body["error"]["requested"], 3);
    assert_eq!(body["error"]["available"], 2);
    assert_eq!(
        body["error"]["detail"],
        "Requested quantity 3 exceeds available copies 2"
    );

    // 拒否された貸出は記録されない
    assert_eq!(library.records().unwrap().len(), 1);

    // Step 4: 集計
    let summary = summary(&app).await;
    assert_eq!(
        summary,
        vec![BorrowSummaryResponse {
            book: SummaryBookResponse {
                title: "Dune".to_string(),
                isbn: "9780441013593".to_string(),
            },
            total_quantity: 3,
        }]
    );
}

#[tokio::test]
async fn test_e2e_borrow_all_copies_marks_book_unavailable() {
    let (app, _) = memory_app();
    let book_id = create_book(&app, "Emma", "9780141439587", 2).await;

    let (status, _) = borrow(&app, &book_id, 2).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", &format!("/api/books/{}", book_id), None).await;
    assert_eq!(body["data"]["copies"], 0);
    assert_eq!(body["data"]["available"], false);

    let (status, body) = borrow(&app, &book_id, 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["available"], 0);
}

#[tokio::test]
async fn test_e2e_borrow_with_due_date() {
    let (app, _) = memory_app();
    let book_id = create_book(&app, "Emma", "9780141439587", 2).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/borrow",
        Some(json!({
            "book": book_id,
            "quantity": 1,
            "dueDate": "2030-06-01T00:00:00Z",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dueDate"], "2030-06-01T00:00:00Z");
}

// ============================================================================
// E2Eテスト: 集計
// ============================================================================

#[tokio::test]
async fn test_e2e_summary_groups_by_book_and_excludes_unborrowed() {
    let (app, _) = memory_app();
    let b1 = create_book(&app, "Dune", "9780441013593", 10).await;
    let b2 = create_book(&app, "Emma", "9780141439587", 10).await;
    let _never_borrowed = create_book(&app, "Ulysses", "9780199535675", 10).await;

    for (book_id, quantity) in [(&b1, 2), (&b1, 3), (&b2, 1)] {
        let (status, _) = borrow(&app, book_id, quantity).await;
        assert_eq!(status, StatusCode::OK);
    }

    let first = summary(&app).await;
    assert_eq!(first.len(), 2);

    let dune = first.iter().find(|s| s.book.title == "Dune").unwrap();
    assert_eq!(dune.book.isbn, "9780441013593");
    assert_eq!(dune.total_quantity, 5);

    let emma = first.iter().find(|s| s.book.title == "Emma").unwrap();
    assert_eq!(emma.total_quantity, 1);

    assert!(first.iter().all(|s| s.book.title != "Ulysses"));

    // 書き込みがなければ同じ結果
    let second = summary(&app).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_e2e_summary_empty() {
    let (app, _) = memory_app();
    create_book(&app, "Dune", "9780441013593", 10).await;

    assert!(summary(&app).await.is_empty());
}

// ============================================================================
// E2Eテスト: エラーケース
// ============================================================================

#[tokio::test]
async fn test_e2e_borrow_book_not_found() {
    let (app, library) = memory_app();
    let missing = Uuid::new_v4().to_string();

    let (status, body) = borrow(&app, &missing, 1).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Book not found");
    assert_eq!(body["error"]["code"], "BOOK_NOT_FOUND");
    assert_eq!(
        body["error"]["detail"],
        format!("No book found with ID: {}", missing)
    );
    assert!(library.records().unwrap().is_empty());
}

#[tokio::test]
async fn test_e2e_borrow_validation_failures() {
    let (app, library) = memory_app();
    let book_id = create_book(&app, "Dune", "9780441013593", 5).await;

    // 不正な書籍ID
    let (status, body) = borrow(&app, "missing-id", 1).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["fields"][0]["field"], "book");

    // 数量0
    let (status, body) = borrow(&app, &book_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"][0]["field"], "quantity");

    // 負の数量
    let (status, _) = borrow(&app, &book_id, -2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 必須フィールドの欠落
    let (status, body) =
        send_json(&app, "POST", "/api/borrow", Some(json!({ "book": book_id }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    // 不正なJSON
    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/borrow")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["fields"][0]["field"], "body");

    // 存在しない書籍でも数量が不正ならバリデーションエラー
    let (status, body) = borrow(&app, &Uuid::new_v4().to_string(), 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    // 過去の返却期限
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/borrow",
        Some(json!({
            "book": book_id,
            "quantity": 1,
            "dueDate": "2000-01-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["fields"][0]["field"], "dueDate");

    assert!(library.records().unwrap().is_empty());
}

// ============================================================================
// E2Eテスト: カタログ
// ============================================================================

#[tokio::test]
async fn test_e2e_catalog() {
    let (app, _) = memory_app();
    create_book(&app, "Emma", "9780141439587", 1).await;
    let dune = create_book(&app, "Dune", "9780441013593", 0).await;

    let (status, body) = send_json(&app, "GET", "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    let books: Vec<BookResponse> = serde_json::from_value(body["data"].clone()).unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Emma"]);
    assert!(!books[0].available);

    let (status, body) = send_json(&app, "GET", &format!("/api/books/{}", dune), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book retrieved successfully");
    assert_eq!(body["data"]["isbn"], "9780441013593");

    // 重複ISBN
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "Dune (reprint)",
            "author": "Frank Herbert",
            "isbn": "9780441013593",
            "copies": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_ISBN");

    // 不正なパス
    let (status, body) = send_json(&app, "GET", "/api/books/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    // 存在しない書籍
    let (status, body) =
        send_json(&app, "GET", &format!("/api/books/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn test_e2e_create_book_validation() {
    let (app, _) = memory_app();

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "",
            "author": "Someone",
            "isbn": "42",
            "copies": -1,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<FieldError> =
        serde_json::from_value(body["error"]["fields"].clone()).unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(names, vec!["copies", "isbn", "title"]);

    // 空白のみ・前後に空白があるフィールド
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "   ",
            "author": "   ",
            "isbn": "   1234   ",
            "copies": 1,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<FieldError> =
        serde_json::from_value(body["error"]["fields"].clone()).unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
    assert_eq!(names, vec!["author", "isbn", "title"]);

    let (_, body) = send_json(&app, "GET", "/api/books", None).await;
    assert_eq!(body["data"], json!([]));

    // 前後の空白は取り除いて保存される
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/books",
        Some(json!({
            "title": "  Dune ",
            "author": " Frank Herbert",
            "isbn": " 9780441013593 ",
            "copies": 1,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Dune");
    assert_eq!(body["data"]["author"], "Frank Herbert");
    assert_eq!(body["data"]["isbn"], "9780441013593");
}

#[tokio::test]
async fn test_e2e_borrow_history() {
    let (app, _) = memory_app();
    let book_id = create_book(&app, "Dune", "9780441013593", 5).await;
    borrow(&app, &book_id, 1).await;
    borrow(&app, &book_id, 2).await;

    let (status, body) =
        send_json(&app, "GET", &format!("/api/books/{}/borrows", book_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let records: Vec<BorrowRecordResponse> =
        serde_json::from_value(body["data"].clone()).unwrap();
    let quantities: Vec<u32> = records.iter().map(|r| r.quantity).collect();
    assert_eq!(quantities, vec![1, 2]);

    let (status, _) = send_json(
        &app,
        "GET",
        &format!("/api/books/{}/borrows", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_e2e_health_check() {
    let (app, _) = memory_app();
    let (status, _) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}
