//! Scoped release of resources acquired during a run.
//!
//! Actions run last-in-first-out when the stack is closed or dropped, so a
//! staged secret never outlives the run regardless of how it ends.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::SecretFs;

type Release<'a> = Box<dyn FnOnce() -> Result<()> + 'a>;

/// LIFO registry of release actions.
#[derive(Default)]
pub struct CleanupStack<'a> {
    actions: Vec<(String, Release<'a>)>,
}

impl<'a> CleanupStack<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Register `action` to run on close. `label` names it in logs.
    pub fn defer(&mut self, label: impl Into<String>, action: impl FnOnce() -> Result<()> + 'a) {
        self.actions.push((label.into(), Box::new(action)));
    }

    /// Register removal of `path` through `fs`.
    ///
    /// A file that is already gone counts as removed, so this may be
    /// registered before the file is created.
    pub fn remove_file(&mut self, label: impl Into<String>, fs: &'a impl SecretFs, path: PathBuf) {
        self.defer(label, move || match fs.remove_file(&path) {
            Err(e) if is_not_found(&e) => Ok(()),
            other => other,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Run every pending action in reverse registration order.
    ///
    /// A failing action is logged and does not stop the rest.
    pub fn close(&mut self) {
        while let Some((label, action)) = self.actions.pop() {
            match action() {
                Ok(()) => tracing::debug!(%label, "cleaned up"),
                Err(e) => tracing::warn!(%label, "cleanup failed: {e:#}"),
            }
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::NotFound)
    })
}

impl Drop for CleanupStack<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for CleanupStack<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.actions.iter().map(|(label, _)| label))
            .finish()
    }
}
