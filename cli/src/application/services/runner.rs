//! Application service — the `salt-ssh` run use-case.
//!
//! Imports only from `crate::domain` and `crate::application`. All I/O is
//! routed through injected port traits.

use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::Result;

use crate::application::cleanup::CleanupStack;
use crate::application::ports::{CommandRunner, SecretFs};
use crate::application::services::staging::{stage_known_hosts, stage_private_key};
use crate::domain::{ActionError, InputBag, OptionSet};

/// Program invoked when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "salt-ssh";
/// Where the CI runner mounts the repository inside the container.
pub const DEFAULT_WORKSPACE_ROOT: &str = "/github/workspace";
/// System-wide known hosts file read by OpenSSH.
pub const DEFAULT_KNOWN_HOSTS_PATH: &str = "/etc/ssh/ssh_known_hosts";

/// Fixed locations used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Program to execute.
    pub program: String,
    /// Root that relative path inputs resolve against.
    pub workspace_root: PathBuf,
    /// Destination for staged known hosts.
    pub known_hosts_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            known_hosts_path: PathBuf::from(DEFAULT_KNOWN_HOSTS_PATH),
        }
    }
}

/// Per-run state. Dropping it runs every registered cleanup.
#[derive(Debug)]
pub struct Context<'a> {
    /// Positional arguments appended after the options.
    pub arguments: Vec<String>,
    pub options: OptionSet,
    pub inputs: InputBag,
    pub on_exit: CleanupStack<'a>,
    pub settings: &'a Settings,
}

impl<'a> Context<'a> {
    #[must_use]
    pub fn new(arguments: Vec<String>, inputs: InputBag, settings: &'a Settings) -> Self {
        Self {
            arguments,
            options: OptionSet::new(),
            inputs,
            on_exit: CleanupStack::new(),
            settings,
        }
    }

    /// Full argument list: options in insertion order, then positionals.
    #[must_use]
    pub fn command_args(&self) -> Vec<String> {
        self.options
            .tokens()
            .chain(self.arguments.iter().cloned())
            .collect()
    }
}

/// Prepare the context and run `salt-ssh` to completion.
///
/// Steps: resolve path inputs, stage the private key, stage known hosts,
/// forward the remaining inputs as options, then execute.
///
/// # Errors
///
/// Returns an error if staging fails, the program cannot be started, the run
/// is interrupted, or the program exits unsuccessfully.
pub async fn run<'a>(
    ctx: &mut Context<'a>,
    runner: &impl CommandRunner,
    fs: &'a impl SecretFs,
) -> Result<()> {
    prepare(ctx, fs)?;

    let program = ctx.settings.program.as_str();
    let args = ctx.command_args();
    tracing::debug!(%program, ?args, "running command");

    let status = runner.run_status(program, &args).await?;
    ensure_success(program, status)?;
    tracing::info!(%program, "command succeeded");
    Ok(())
}

/// Everything `run` does before executing the program.
///
/// # Errors
///
/// Returns an error if staging fails.
pub fn prepare<'a>(ctx: &mut Context<'a>, fs: &'a impl SecretFs) -> Result<()> {
    let settings = ctx.settings;
    ctx.inputs.resolve_paths(&settings.workspace_root);
    stage_private_key(ctx, fs)?;
    stage_known_hosts(ctx, fs)?;
    forward_inputs(ctx);
    Ok(())
}

/// Move every remaining input into the option set.
pub fn forward_inputs(ctx: &mut Context<'_>) {
    for (key, value) in std::mem::take(&mut ctx.inputs) {
        ctx.options.set(&key, &value);
    }
}

/// Map an exit status to `Ok` or a typed failure.
///
/// # Errors
///
/// Returns [`ActionError::CommandFailed`] for a non-zero exit code and
/// [`ActionError::CommandKilled`] when no code is available.
pub fn ensure_success(program: &str, status: ExitStatus) -> Result<(), ActionError> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(ActionError::CommandFailed {
            program: program.to_string(),
            code,
        }),
        None => Err(ActionError::CommandKilled {
            program: program.to_string(),
        }),
    }
}
