//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs the child with inherited stdio and environment,
//! and races it against the process [`Interrupt`] latch so an interrupted run
//! still unwinds through the caller's cleanup.

use std::process::ExitStatus;

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;
use crate::domain::ActionError;
use crate::infra::signal::Interrupt;

/// Production `CommandRunner` backed by `tokio::process`.
///
/// Nothing is spawned once the latch is set. A running child is killed and
/// reaped when the latch fires before it exits.
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    interrupt: Interrupt,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(Interrupt::never())
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run_status(&self, program: &str, args: &[String]) -> Result<ExitStatus> {
        if self.interrupt.is_set() {
            tracing::info!(%program, "interrupted, not starting");
            return Err(ActionError::Interrupted.into());
        }

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        tokio::select! {
            biased;
            () = self.interrupt.wait() => {
                tracing::info!(%program, "interrupted, stopping child");
                let _ = child.kill().await;
                Err(ActionError::Interrupted.into())
            }
            status = child.wait() => {
                status.with_context(|| format!("waiting for {program}"))
            }
        }
    }
}
