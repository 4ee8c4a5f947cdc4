//! エラー型定義 (instadm-api)

use thiserror::Error;

/// instadm-api のエラー型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
