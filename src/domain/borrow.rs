use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    BookId, BorrowBookError, BorrowId, Quantity,
    book::{self, Book},
    commands::BorrowBook,
};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出記録 - 1回の貸出トランザクション
///
/// 作成後は不変。削除されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub borrow_id: BorrowId,
    pub book_id: BookId,
    pub quantity: Quantity,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 集計結果に含める書籍情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBook {
    pub title: String,
    pub isbn: String,
}

/// 書籍ごとの貸出集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowSummary {
    pub book: SummaryBook,
    pub total_quantity: u64,
}

/// 純粋関数：在庫を確認する
///
/// ビジネスルール：要求数量は在庫冊数以下でなければならない。
pub fn check_availability(book: &Book, quantity: Quantity) -> Result<(), BorrowBookError> {
    if book.copies < quantity.value() {
        return Err(BorrowBookError::InsufficientCopies {
            requested: quantity.value(),
            available: book.copies,
        });
    }
    Ok(())
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 要求数量 <= 在庫冊数
/// - 在庫冊数を要求数量だけ減らす（0になれば貸出不可）
/// - 返却期限の指定がなければ貸出日時 + 14日間
///
/// 副作用なし。更新後のBookと新しいBorrowRecordを返す。
/// 呼び出し側（ストレージアダプター）は両方を1つの原子的な操作で永続化する。
pub fn borrow_book(book: &Book, cmd: &BorrowBook) -> Result<(Book, BorrowRecord), BorrowBookError> {
    check_availability(book, cmd.quantity)?;

    let remaining = book.copies - cmd.quantity.value();
    let updated_book = book::with_copies(book, remaining, cmd.borrowed_at);

    let record = BorrowRecord {
        borrow_id: BorrowId::new(),
        book_id: book.book_id,
        quantity: cmd.quantity,
        due_date: cmd
            .due_date
            .unwrap_or_else(|| cmd.borrowed_at + Duration::days(LOAN_PERIOD_DAYS)),
        created_at: cmd.borrowed_at,
        updated_at: cmd.borrowed_at,
    };

    Ok((updated_book, record))
}

/// 純粋関数：貸出記録を書籍ごとに集計する
///
/// 1. 書籍IDでグループ化し数量を合計
/// 2. 書籍と結合（内部結合：書籍が存在しないグループは除外）
/// 3. 1対1の結合結果を平坦化
/// 4. 出力形式に整形（内部IDを除き、title/isbnをbook配下に入れる）
///
/// 貸出記録のない書籍は結果に現れない。
/// 結果はtitle, isbnの順にソートされ、同じ入力に対して常に同じ出力を返す。
pub fn summarize<'a, R, B>(records: R, books: B) -> Vec<BorrowSummary>
where
    R: IntoIterator<Item = &'a BorrowRecord>,
    B: IntoIterator<Item = &'a Book>,
{
    let mut totals: HashMap<BookId, u64> = HashMap::new();
    for record in records {
        *totals.entry(record.book_id).or_default() += u64::from(record.quantity.value());
    }

    let books_by_id: HashMap<BookId, &Book> = books.into_iter().map(|b| (b.book_id, b)).collect();

    let mut summaries: Vec<BorrowSummary> = totals
        .into_iter()
        .filter_map(|(book_id, total_quantity)| {
            books_by_id.get(&book_id).map(|book| BorrowSummary {
                book: SummaryBook {
                    title: book.title.clone(),
                    isbn: book.isbn.clone(),
                },
                total_quantity,
            })
        })
        .collect();

    sort_summaries(&mut summaries);
    summaries
}

/// 集計結果を安定した順序に並べる
fn sort_summaries(summaries: &mut [BorrowSummary]) {
    summaries.sort_by(|a, b| {
        a.book
            .title
            .cmp(&b.book.title)
            .then_with(|| a.book.isbn.cmp(&b.book.isbn))
    });
}
