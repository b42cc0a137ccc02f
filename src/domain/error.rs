//! Error taxonomy
//!
//! None of these errors is fatal to the process. Link errors end one
//! lifecycle run, the rest are logged and the session carries on.

use thiserror::Error;

/// Failure to turn a notification payload into a sample.
#[derive(Debug, Error, PartialEq)]
pub enum SampleParseError {
    #[error("payload is not valid UTF-8")]
    NotUtf8,
    #[error("expected at least 3 fields, got {0}")]
    MissingFields(usize),
    #[error("field {index} is not a number: {value:?}")]
    InvalidNumber { index: usize, value: String },
    #[error("field {index} is not finite")]
    NonFinite { index: usize },
}

/// Failure of an OS collaborator (audio endpoint or input injection).
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("{0}")]
    Platform(String),
}

/// Failures of the BLE link, one variant per lifecycle phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("discovery failed: {0}")]
    Discovery(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("subscription failed: {0}")]
    Subscription(String),
    #[error("unsubscribe failed: {0}")]
    Unsubscribe(String),
}
