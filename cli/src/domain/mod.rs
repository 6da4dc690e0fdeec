//! Domain layer — pure types, normalization, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `tokio`, `std::fs`, or `std::process`. All functions are synchronous and
//! take data in, returning data out.

pub mod error;
pub mod inputs;
pub mod options;

pub use error::{ActionError, OptionError};
pub use inputs::{Environment, InputBag, RequiredInputs, resolve_under};
pub use options::{OptionSet, OptionValue, Tokens, normalize};
