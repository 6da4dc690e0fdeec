//! salt-ssh-action — run salt-ssh from CI action inputs

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use tracing_subscriber::EnvFilter;

use salt_ssh_action::cli::{Cli, is_interrupt};
use salt_ssh_action::infra;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let env = infra::env::capture();
    if let Err(e) = cli.run(&env).await {
        if !is_interrupt(&e) {
            eprintln!("Error: {e:?}");
        }
        std::process::exit(1);
    }
}
