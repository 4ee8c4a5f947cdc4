//! Direct message sending

mod dispatcher;
mod request;

pub use dispatcher::{DmDispatcher, DmOutcome, DmReceipt};
pub use request::{DelayRange, DmRequest, RequestError, ValidDm};
