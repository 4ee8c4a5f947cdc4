//! DM request validation and pacing delay

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::config::DelayConfig;

/// Raw DM request as received from a caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DmRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub delay_min: Option<u64>,
    #[serde(default)]
    pub delay_max: Option<u64>,
}

/// Why a request was rejected before touching the platform
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Fields 'username' and 'message' are required.")]
    MissingFields,

    #[error("Invalid delay range: delay_min ({min}) is greater than delay_max ({max}).")]
    InvalidDelay { min: u64, max: u64 },

    #[error("Invalid delay range: delay_max ({max}) exceeds the limit of {limit} seconds.")]
    DelayTooLong { max: u64, limit: u64 },
}

/// Inclusive delay bounds in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    /// Pick a uniformly random delay within the bounds
    pub fn sample(&self) -> u64 {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDm {
    pub username: String,
    pub message: String,
    pub delay: DelayRange,
}

impl DmRequest {
    pub fn new(username: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Check required fields and resolve the delay range.
    ///
    /// A bound the caller omits falls back to the configured default.
    pub fn validate(&self, defaults: &DelayConfig) -> Result<ValidDm, RequestError> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(RequestError::MissingFields)?;
        let message = self
            .message
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(RequestError::MissingFields)?;

        let min = self.delay_min.unwrap_or(defaults.min);
        let max = self.delay_max.unwrap_or(defaults.max);
        if min > max {
            return Err(RequestError::InvalidDelay { min, max });
        }
        if max > defaults.limit {
            return Err(RequestError::DelayTooLong {
                max,
                limit: defaults.limit,
            });
        }

        Ok(ValidDm {
            username: username.to_string(),
            message: message.to_string(),
            delay: DelayRange { min, max },
        })
    }
}
