//! instadm-core: InstaDM Gateway Core Library
//!
//! 設定、プラットフォームクライアントの抽象化、セッション管理、
//! DM 送信のコア機能を提供します。

pub mod config;
pub mod dm;
pub mod error;
pub mod platform;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ApiConfig, Config, DelayConfig, DelayMode, InstagramConfig, SessionConfig};
pub use dm::{DmDispatcher, DmOutcome, DmReceipt, DmRequest};
pub use error::{Error, Result};
pub use platform::{
    AccountInfo, LoggedIn, PlatformClient, PlatformConnector, PlatformError, PlatformResult,
    SessionState, UserId,
};
pub use session::{ClientHandle, SessionCredential, SessionError, SessionManager, SessionStatus};
