//! Unified error types for trapmon
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Metric source could not be executed
    #[error("Sampling failed: {0}")]
    Sample(#[from] SampleError),

    /// Metric output is not a plain decimal number
    #[error("Metric output is not a valid number: '{text}'")]
    Parse { text: String },

    /// Trap delivery to a target failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Malformed SNMP datagram
    #[error("SNMP codec error: {0}")]
    Codec(#[from] CodecError),

    /// Every configured trap target failed to connect at startup
    #[error("None of the configured trap targets could be reached")]
    NoReachableTargets,

    /// IO error (file operations, sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Failed to parse config file
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required config field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// JSON deserialization error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ConfigError {
    /// Shorthand for an invalid value error
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Errors from running a metric source
#[derive(Error, Debug)]
pub enum SampleError {
    /// Script path does not exist
    #[error("Script file does not exist: {0}")]
    SourceNotFound(String),

    /// Script exists but carries no execute permission
    #[error("Script file is not executable: {0}")]
    NotExecutable(String),

    /// Spawn, IO or exit status failure
    #[error("Failed to execute '{source_desc}': {message}")]
    Execution {
        source_desc: String,
        message: String,
    },

    /// Source did not finish in time and was killed
    #[error("'{source_desc}' did not finish within {timeout:?}")]
    Timeout {
        source_desc: String,
        timeout: Duration,
    },
}

/// Errors from rendering message templates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Template has no value placeholder
    #[error("template has no value placeholder")]
    NoPlaceholder,

    /// Template has more than one value placeholder
    #[error("template has {0} value placeholders, expected exactly one")]
    TooManyPlaceholders(usize),

    /// Placeholder uses a verb that cannot format a number
    #[error("unsupported placeholder verb '%{0}'")]
    UnsupportedVerb(char),

    /// Template ends in the middle of a placeholder
    #[error("template ends inside a placeholder")]
    Truncated,

    /// Width or precision is beyond what can be rendered
    #[error("placeholder width or precision is too large")]
    TooWide,
}

/// Errors from trap delivery
#[derive(Error, Debug)]
pub enum TransportError {
    /// Target host could not be resolved
    #[error("cannot resolve {target}: {message}")]
    Resolve { target: String, message: String },

    /// Socket operation failed
    #[error("{target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// Trap could not be encoded for this target
    #[error("{target}: {source}")]
    Encode {
        target: String,
        #[source]
        source: CodecError,
    },

    /// Sender thread panicked mid-send
    #[error("{0}: sender panicked")]
    Panicked(String),
}

/// Errors from SNMP message encoding and decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// BER encoder rejected the message
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// Datagram is not a well-formed SNMP message
    #[error("failed to decode message: {0}")]
    Decode(String),

    /// Message version is not v2c
    #[error("unsupported SNMP message version")]
    UnsupportedVersion,

    /// Message carries a PDU other than SNMPv2-Trap
    #[error("message does not carry an SNMPv2-Trap PDU")]
    UnexpectedPdu,

    /// Object identifier is malformed
    #[error("invalid object identifier: {0}")]
    InvalidOid(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
