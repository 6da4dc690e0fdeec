//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::process`. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Option errors ─────────────────────────────────────────────────────────────

/// Errors raised by the [`OptionSet`](crate::domain::options::OptionSet).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("option '--{0}' is not set")]
    NotFound(String),
}

// ── Action errors ─────────────────────────────────────────────────────────────

/// Errors that end an action run.
///
/// Every variant maps to exit code 1; [`ActionError::Interrupted`] is the
/// only one reported without a diagnostic dump.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("input ARGUMENTS has unbalanced quoting: {0:?}")]
    UnbalancedQuoting(String),

    #[error("input {input} is not valid base64")]
    InvalidBase64 {
        input: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("input {input} does not decode to UTF-8 text")]
    InvalidUtf8 {
        input: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("{program} exited with status {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("{program} was terminated by a signal")]
    CommandKilled { program: String },

    #[error("interrupted")]
    Interrupted,
}
