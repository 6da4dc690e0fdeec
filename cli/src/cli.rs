//! CLI argument parsing with clap derive, and the top-level action flow.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::application::ports::{CommandRunner, SecretFs};
use crate::application::services::runner::{
    Context, DEFAULT_KNOWN_HOSTS_PATH, DEFAULT_PROGRAM, DEFAULT_WORKSPACE_ROOT, Settings,
    ensure_success, run as run_salt_ssh,
};
use crate::domain::{ActionError, Environment, InputBag, RequiredInputs};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::LocalFs;
use crate::infra::signal::Interrupt;

/// SSH daemon started in test mode.
pub const DEFAULT_SSHD: &str = "/usr/sbin/sshd";

/// Literal first argument that enables test mode.
pub const TEST_MODE: &str = "test";

/// Run salt-ssh from CI action inputs (`INPUT_*` environment variables)
#[derive(Parser, Debug)]
#[command(name = "salt-ssh-action", version)]
pub struct Cli {
    /// Program to run
    #[arg(long, env = "SALT_SSH_ACTION_PROGRAM", default_value = DEFAULT_PROGRAM)]
    pub program: String,

    /// Root that relative path inputs resolve against
    #[arg(long, env = "SALT_SSH_ACTION_WORKSPACE", default_value = DEFAULT_WORKSPACE_ROOT)]
    pub workspace_root: PathBuf,

    /// Where known hosts inputs are installed
    #[arg(long, env = "SALT_SSH_ACTION_KNOWN_HOSTS", default_value = DEFAULT_KNOWN_HOSTS_PATH)]
    pub known_hosts_path: PathBuf,

    /// SSH daemon started in test mode
    #[arg(long, env = "SALT_SSH_ACTION_SSHD", default_value = DEFAULT_SSHD)]
    pub sshd: String,

    /// Pass `test` to start the SSH daemon before running
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub mode: Vec<String>,
}

impl Cli {
    /// Whether the first trailing argument is the literal `test`.
    #[must_use]
    pub fn test_mode(&self) -> bool {
        self.mode.first().is_some_and(|m| m == TEST_MODE)
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings {
            program: self.program.clone(),
            workspace_root: self.workspace_root.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }

    /// Execute the action against the real process and filesystem.
    ///
    /// The Ctrl-C handler is installed before anything else runs, so an
    /// interrupt during staging or between commands stops the run.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the action fails.
    pub async fn run(self, env: &Environment) -> Result<()> {
        let interrupt = Interrupt::install().unwrap_or_else(|e| {
            tracing::warn!("{e:#}");
            Interrupt::never()
        });
        let runner = TokioCommandRunner::new(interrupt);
        self.run_with(env, &runner, &LocalFs).await
    }

    /// Execute the action with injected ports.
    ///
    /// Every cleanup registered during the run has completed by the time
    /// this returns, whether it succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the SSH daemon fails to start in test mode, a
    /// required input is missing, staging fails, or `salt-ssh` fails.
    pub async fn run_with(
        &self,
        env: &Environment,
        runner: &impl CommandRunner,
        fs: &impl SecretFs,
    ) -> Result<()> {
        if self.test_mode() {
            tracing::info!(sshd = %self.sshd, "test mode, starting SSH daemon");
            let status = runner.run_status(&self.sshd, &[]).await?;
            ensure_success(&self.sshd, status)?;
        }

        let arguments = RequiredInputs::from_env(env)?.positional()?;
        tracing::debug!(?arguments, "received arguments");

        let inputs = InputBag::from_env(env);
        tracing::debug!(inputs = ?inputs.keys().collect::<Vec<_>>(), "received inputs");

        let settings = self.settings();
        let mut ctx = Context::new(arguments, inputs, &settings);
        let result = run_salt_ssh(&mut ctx, runner, fs).await;
        drop(ctx);
        result
    }
}

/// Whether `err` is an interrupt, which is reported without a dump.
#[must_use]
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ActionError>(),
        Some(ActionError::Interrupted)
    )
}
