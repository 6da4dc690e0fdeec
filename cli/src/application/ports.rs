//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `std` and `anyhow` — never from `crate::infra`.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::Result;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run `program` with inherited environment and stdio, and wait for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, or
    /// [`ActionError::Interrupted`](crate::domain::ActionError::Interrupted)
    /// if the run is interrupted before the child exits. An interrupted child
    /// must be killed, not left orphaned.
    async fn run_status(&self, program: &str, args: &[String]) -> Result<ExitStatus>;
}

// ── Secret Filesystem Port ────────────────────────────────────────────────────

/// Abstracts the filesystem operations used to stage credentials.
pub trait SecretFs {
    /// Create a new private temporary file holding `contents` and return its
    /// path. The file outlives the call; the caller owns its removal.
    fn create_temp_file(&self, contents: &str) -> Result<PathBuf>;

    /// Create or truncate `path` with `contents`.
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Copy `from` over `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove the file at `path`.
    fn remove_file(&self, path: &Path) -> Result<()>;
}
