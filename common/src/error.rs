//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Zero denominator in rational value: {0}/0")]
    ZeroDenominator(u32),

    #[error("Invalid rotation: {0} (use 0, 90, 180 or 270)")]
    InvalidRotation(i64),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
