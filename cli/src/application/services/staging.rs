//! Application service — credential staging.
//!
//! Turns the `PRIVATE-KEY`, `KNOWN-HOSTS` and `KNOWN-HOSTS-FILE` inputs into
//! files `salt-ssh` can read, and registers their removal on the run's
//! cleanup stack. All filesystem access goes through [`SecretFs`].

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use crate::application::ports::SecretFs;
use crate::application::services::runner::Context;
use crate::domain::ActionError;
use crate::domain::inputs::{KNOWN_HOSTS_FILE_INPUT, KNOWN_HOSTS_INPUT, PRIVATE_KEY_INPUT};

/// Standard alphabet, padded, tolerating non-zero trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Decode a base64 input into UTF-8 text.
///
/// Characters outside the base64 alphabet (line breaks, stray punctuation)
/// are discarded before decoding, and non-zero trailing bits are accepted.
///
/// # Errors
///
/// Returns [`ActionError::InvalidBase64`] or [`ActionError::InvalidUtf8`].
pub fn decode_text(input: &str, value: &str) -> Result<String, ActionError> {
    let compact: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();
    let bytes = LENIENT
        .decode(compact)
        .map_err(|source| ActionError::InvalidBase64 {
            input: input.to_string(),
            source,
        })?;
    String::from_utf8(bytes).map_err(|source| ActionError::InvalidUtf8 {
        input: input.to_string(),
        source,
    })
}

/// Write `PRIVATE-KEY` to a temporary file and point `--priv` at it.
///
/// Returns the staged path, or `None` when the input is absent.
///
/// # Errors
///
/// Returns an error if the key cannot be decoded or written.
pub fn stage_private_key<'a>(
    ctx: &mut Context<'a>,
    fs: &'a impl SecretFs,
) -> Result<Option<PathBuf>> {
    let Some(encoded) = ctx.inputs.take(PRIVATE_KEY_INPUT) else {
        return Ok(None);
    };
    let key = decode_text(PRIVATE_KEY_INPUT, &encoded)?;
    let path = fs.create_temp_file(&key).context("staging private key")?;
    tracing::debug!(path = %path.display(), "staged private key");

    ctx.on_exit.remove_file("private key", fs, path.clone());
    ctx.options.set("--priv", &path.to_string_lossy());
    Ok(Some(path))
}

/// Install known hosts from `KNOWN-HOSTS`, or else from `KNOWN-HOSTS-FILE`.
///
/// `KNOWN-HOSTS` takes precedence; when it is used, `KNOWN-HOSTS-FILE` is
/// left in the bag untouched. Returns the installed path, or `None` when
/// neither input is present.
///
/// # Errors
///
/// Returns an error if the hosts cannot be decoded, written, or copied.
pub fn stage_known_hosts<'a>(
    ctx: &mut Context<'a>,
    fs: &'a impl SecretFs,
) -> Result<Option<PathBuf>> {
    let target = ctx.settings.known_hosts_path.clone();

    let source = if let Some(encoded) = ctx.inputs.take(KNOWN_HOSTS_INPUT) {
        KnownHosts::Inline(decode_text(KNOWN_HOSTS_INPUT, &encoded)?)
    } else if let Some(path) = ctx.inputs.take(KNOWN_HOSTS_FILE_INPUT) {
        KnownHosts::File(path)
    } else {
        return Ok(None);
    };

    // Registered first so a partial write is removed too.
    ctx.on_exit.remove_file("known hosts", fs, target.clone());
    match source {
        KnownHosts::Inline(hosts) => {
            fs.write(&target, &hosts)
                .context("installing known hosts")?;
            tracing::debug!(path = %target.display(), "installed known hosts");
        }
        KnownHosts::File(path) => {
            fs.copy(Path::new(&path), &target)
                .context("installing known hosts file")?;
            tracing::debug!(from = %path, path = %target.display(), "installed known hosts file");
        }
    }
    Ok(Some(target))
}

enum KnownHosts {
    Inline(String),
    File(String),
}
