//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`.

pub mod cleanup;
pub mod ports;
pub mod services;

pub use cleanup::CleanupStack;
pub use ports::{CommandRunner, SecretFs};
pub use services::runner::{Context, Settings};
