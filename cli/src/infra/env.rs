//! Process environment capture.

use crate::domain::Environment;

/// Snapshot the process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
#[must_use]
pub fn capture() -> Environment {
    Environment::new(std::env::vars_os().filter_map(|(k, v)| {
        match (k.into_string(), v.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            (k, _) => {
                tracing::debug!(name = ?k, "skipping non UTF-8 environment variable");
                None
            }
        }
    }))
}
