//! End-to-end tests: real binary, real staging, fake `salt-ssh`.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use predicates::prelude::*;

/// Fake `salt-ssh`: records its arguments one per line in `<script>.args`,
/// copies the installed known hosts to `<script>.kh`, and exits with
/// `$FAKE_EXIT` (default 0). With `$FAKE_SLEEP` set it writes its pid to
/// `<script>.pid` and sleeps instead.
const FAKE_SALT_SSH: &str = r#"#!/bin/sh
for a in "$@"; do printf '%s\n' "$a"; done > "$0.args"
if [ -f "$SALT_SSH_ACTION_KNOWN_HOSTS" ]; then cat "$SALT_SSH_ACTION_KNOWN_HOSTS" > "$0.kh"; fi
if [ -n "$FAKE_SLEEP" ]; then echo $$ > "$0.pid"; exec sleep "$FAKE_SLEEP"; fi
exit "${FAKE_EXIT:-0}"
"#;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let script = dir.path().join("salt-ssh");
        std::fs::write(&script, FAKE_SALT_SSH).expect("write script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
                .expect("chmod script");
        }
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn known_hosts(&self) -> PathBuf {
        self.path("ssh_known_hosts")
    }

    /// Binary with a clean environment pointed at the fake program.
    fn command(&self) -> Command {
        Command::from_std(self.std_command())
    }

    /// `command` as a plain process, for tests that need the child handle.
    fn std_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin!("salt-ssh-action"));
        cmd.env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("RUST_LOG", "debug")
            .env("SALT_SSH_ACTION_PROGRAM", self.path("salt-ssh"))
            .env("SALT_SSH_ACTION_WORKSPACE", self.dir.path())
            .env("SALT_SSH_ACTION_KNOWN_HOSTS", self.known_hosts());
        cmd
    }

    /// Like `command`, with the inputs for `salt-ssh * test.ping`.
    fn ping(&self) -> Command {
        let mut cmd = self.command();
        cmd.env("INPUT_TARGET", "*")
            .env("INPUT_FUNCTION", "test.ping")
            .env("INPUT_ARGUMENTS", "");
        cmd
    }

    fn recorded_args(&self) -> Vec<String> {
        read(&self.path("salt-ssh.args"))
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

// --- Help ---

#[test]
fn test_help_flag_shows_usage() {
    Command::new(assert_cmd::cargo::cargo_bin!("salt-ssh-action"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--known-hosts-path"));
}

// --- Command assembly ---

#[test]
fn test_ping_runs_bare_command_and_exits_zero() {
    let fx = Fixture::new();
    fx.ping().assert().code(0);
    assert_eq!(fx.recorded_args(), ["*", "test.ping"]);
}

#[test]
fn test_inputs_become_options_before_positionals() {
    let fx = Fixture::new();
    fx.ping()
        .env("INPUT_ARGUMENTS", "'hello world' --out=json")
        .env("INPUT_ROSTER-FILE", "salt/roster")
        .env("INPUT_IGNORE-HOST-KEYS", "True")
        .assert()
        .success();

    let args = fx.recorded_args();
    let roster = format!("--roster-file={}", fx.path("salt/roster").display());
    assert!(args.contains(&roster), "got {args:?}");
    assert!(args.contains(&"--ignore-host-keys".to_string()), "got {args:?}");
    assert_eq!(args[args.len() - 4..], ["*", "test.ping", "hello world", "--out=json"]);
}

#[test]
fn test_command_failure_exits_one() {
    let fx = Fixture::new();
    fx.ping()
        .env("FAKE_EXIT", "3")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 3"));
}

// --- Secrets ---

#[test]
fn test_known_hosts_exists_only_during_the_run() {
    let fx = Fixture::new();
    let line = "example.com ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAITestKey\n";
    fx.ping()
        .env("INPUT_KNOWN-HOSTS", STANDARD.encode(line))
        .assert()
        .success();

    assert_eq!(read(&fx.path("salt-ssh.kh")), line);
    assert!(!fx.known_hosts().exists());
}

#[test]
fn test_private_key_is_passed_and_removed() {
    let fx = Fixture::new();
    fx.ping()
        .env("INPUT_PRIVATE-KEY", STANDARD.encode("-----BEGIN KEY-----\n"))
        .assert()
        .success();

    let args = fx.recorded_args();
    let key = args
        .iter()
        .find_map(|a| a.strip_prefix("--priv="))
        .expect("--priv passed");
    assert!(!Path::new(key).exists(), "key file must be removed");
}

#[test]
fn test_private_key_is_removed_when_command_fails() {
    let fx = Fixture::new();
    fx.ping()
        .env("INPUT_PRIVATE-KEY", STANDARD.encode("secret"))
        .env("FAKE_EXIT", "1")
        .assert()
        .code(1);

    let args = fx.recorded_args();
    let key = args
        .iter()
        .find_map(|a| a.strip_prefix("--priv="))
        .expect("--priv passed");
    assert!(!Path::new(key).exists(), "key file must be removed");
}

// --- Startup failures ---

#[test]
fn test_missing_required_input_exits_one_without_running() {
    let fx = Fixture::new();
    fx.command()
        .env("INPUT_FUNCTION", "test.ping")
        .env("INPUT_ARGUMENTS", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("INPUT_TARGET"));
    assert!(!fx.path("salt-ssh.args").exists());
}

#[test]
fn test_unbalanced_quoting_exits_one_without_running() {
    let fx = Fixture::new();
    fx.ping()
        .env("INPUT_ARGUMENTS", "'unterminated")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unbalanced quoting"));
    assert!(!fx.path("salt-ssh.args").exists());
}

#[test]
fn test_invalid_private_key_exits_one_without_running() {
    let fx = Fixture::new();
    fx.ping()
        .env("INPUT_PRIVATE-KEY", "!!not base64!!")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("PRIVATE-KEY"));
    assert!(!fx.path("salt-ssh.args").exists());
}

// --- Interrupt ---

#[cfg(unix)]
fn is_alive(pid: &str) -> bool {
    std::process::Command::new("sh")
        .args(["-c", &format!("kill -0 {pid} 2>/dev/null")])
        .status()
        .expect("run kill")
        .success()
}

#[cfg(unix)]
#[test]
fn test_interrupt_stops_command_and_removes_secrets() {
    let fx = Fixture::new();
    let mut cmd = fx.std_command();
    cmd.env("INPUT_TARGET", "*")
        .env("INPUT_FUNCTION", "test.ping")
        .env("INPUT_ARGUMENTS", "")
        .env("INPUT_PRIVATE-KEY", STANDARD.encode("secret"))
        .env("INPUT_KNOWN-HOSTS", STANDARD.encode("host ssh-ed25519 AAAA\n"))
        .env("FAKE_SLEEP", "30")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped());
    let mut action = cmd.spawn().expect("spawn action");

    let pid_file = fx.path("salt-ssh.pid");
    let deadline = Instant::now() + Duration::from_secs(20);
    while !std::fs::read_to_string(&pid_file).is_ok_and(|p| p.ends_with('\n')) {
        if Instant::now() > deadline {
            let _ = action.kill();
            panic!("fake salt-ssh never started");
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    let sent = std::process::Command::new("sh")
        .args(["-c", &format!("kill -INT {}", action.id())])
        .status()
        .expect("run kill");
    assert!(sent.success());

    let output = action.wait_with_output().expect("wait for action");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {stderr}");
    assert!(!stderr.contains("Error:"), "no error dump on interrupt: {stderr}");

    assert_eq!(read(&fx.path("salt-ssh.kh")), "host ssh-ed25519 AAAA\n");
    assert!(!fx.known_hosts().exists(), "known hosts must be removed");
    let args = fx.recorded_args();
    let key = args
        .iter()
        .find_map(|a| a.strip_prefix("--priv="))
        .expect("--priv passed");
    assert!(!Path::new(key).exists(), "key file must be removed");

    let child_pid = read(&pid_file);
    assert!(!is_alive(child_pid.trim()), "salt-ssh must be killed");
}
