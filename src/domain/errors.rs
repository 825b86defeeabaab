/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowBookError {
    /// 要求数量が在庫冊数を超えている
    InsufficientCopies { requested: u32, available: u32 },
}

impl std::fmt::Display for BorrowBookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BorrowBookError::InsufficientCopies {
                requested,
                available,
            } => write!(
                f,
                "Requested quantity {} exceeds available copies {}",
                requested, available
            ),
        }
    }
}
