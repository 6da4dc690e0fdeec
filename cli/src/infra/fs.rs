//! Filesystem infrastructure — implements `SecretFs`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::SecretFs;

/// Prefix for staged private key files in the temp directory.
const TEMP_PREFIX: &str = "salt-ssh-action-";

/// Production filesystem implementation of `SecretFs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl SecretFs for LocalFs {
    fn create_temp_file(&self, contents: &str) -> Result<PathBuf> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile()
            .context("creating temporary file")?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("writing {}", file.path().display()))?;
        file.flush()
            .with_context(|| format!("flushing {}", file.path().display()))?;
        let (_, path) = file.keep().context("keeping temporary file")?;
        Ok(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("writing file {}", path.display()))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .with_context(|| format!("copying {} to {}", from.display(), to.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }
}
