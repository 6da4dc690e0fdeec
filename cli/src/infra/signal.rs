//! Process-wide Ctrl-C latch.
//!
//! The handler is installed once at startup. From then on a SIGINT is never
//! lost: it sets a flag that every later command run observes, whether it
//! arrives while a child runs, during staging, or between two commands.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::sync::watch;

/// Latched interrupt flag.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    /// Install the Ctrl-C handler and start latching.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handler cannot be installed.
    pub fn install() -> Result<Self> {
        let received = listen().context("cannot listen for Ctrl-C")?;
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            received.await;
            tracing::info!("received interrupt");
            let _ = tx.send(true);
        });
        Ok(Self { rx })
    }

    /// A flag that never fires.
    #[must_use]
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// A flag fired by hand through the returned sender.
    #[must_use]
    pub fn manual() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// Whether an interrupt has been received.
    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once an interrupt has been received, immediately if one already was.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|set| *set).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(unix)]
fn listen() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        if sigint.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    })
}

#[cfg(not(unix))]
fn listen() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}
