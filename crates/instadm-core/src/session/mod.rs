//! Session management module
//!
//! Owns the single authenticated platform client for this process and the
//! session state file it is persisted to.

mod error;
mod manager;
mod store;
mod types;

pub use error::SessionError;
pub use manager::SessionManager;
pub use store::SessionStateStore;
pub use types::{ClientHandle, SessionCredential, SessionStatus};
