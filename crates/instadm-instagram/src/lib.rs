//! instadm-instagram: Instagram client adapter for instadm-gateway
//!
//! Implements the platform traits of `instadm-core` against Instagram's
//! private API, authenticating with a `sessionid` cookie. Request signing,
//! challenge resolution and two-factor flows are out of scope; those
//! conditions are reported as errors.

pub mod api;
pub mod connector;
pub mod error;
pub mod settings;

pub use api::{InstagramClient, INSTAGRAM_API_URL};
pub use connector::InstagramConnector;
pub use error::{InstagramError, Result};
pub use settings::{ClientSettings, DeviceSettings};
