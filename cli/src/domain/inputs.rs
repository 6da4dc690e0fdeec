//! Action inputs: the environment snapshot, the required positional inputs,
//! and the bag of optional inputs that become `salt-ssh` options.
//!
//! Pure functions only — the process environment is captured by the caller
//! and handed in as an [`Environment`].

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::error::ActionError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix the CI runner puts in front of every action input.
pub const INPUT_PREFIX: &str = "INPUT_";

/// Inputs consumed as positional arguments, never forwarded as options.
pub const POSITIONAL_INPUTS: &[&str] = &["TARGET", "FUNCTION", "ARGUMENTS"];

/// Inputs holding paths relative to the workspace root.
pub const PATH_INPUTS: &[&str] = &[
    "CONFIG-DIR",
    "EXTRA-FILEREFS",
    "KNOWN-HOSTS-FILE",
    "LOG-FILE",
    "OUTPUT-FILE",
    "PRIV",
    "ROSTER-FILE",
    "SALTFILE",
];

pub const PRIVATE_KEY_INPUT: &str = "PRIVATE-KEY";
pub const KNOWN_HOSTS_INPUT: &str = "KNOWN-HOSTS";
pub const KNOWN_HOSTS_FILE_INPUT: &str = "KNOWN-HOSTS-FILE";

// ── Environment snapshot ─────────────────────────────────────────────────────

/// Immutable copy of the process environment taken once at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<(String, String)>,
}

impl Environment {
    #[must_use]
    pub fn new(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ── Required inputs ──────────────────────────────────────────────────────────

/// The three inputs every run needs, read from `INPUT_*` via `envy`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RequiredInputs {
    /// Salt target expression, e.g. `*`.
    pub target: String,
    /// Salt function, e.g. `test.ping`.
    pub function: String,
    /// Extra arguments, shell-quoted.
    pub arguments: String,
}

impl RequiredInputs {
    /// Read the required inputs from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if any of `INPUT_TARGET`, `INPUT_FUNCTION` or
    /// `INPUT_ARGUMENTS` is missing.
    pub fn from_env(env: &Environment) -> Result<Self> {
        envy::prefixed(INPUT_PREFIX)
            .from_iter(env.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .context(
                "failed to read required inputs \
                 (INPUT_TARGET, INPUT_FUNCTION and INPUT_ARGUMENTS must be set)",
            )
    }

    /// Positional arguments for `salt-ssh`: target, function, then the
    /// shell-split arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnbalancedQuoting`] if `arguments` cannot be split.
    pub fn positional(&self) -> Result<Vec<String>, ActionError> {
        let extra = shlex::split(&self.arguments)
            .ok_or_else(|| ActionError::UnbalancedQuoting(self.arguments.clone()))?;
        let mut args = Vec::with_capacity(extra.len() + 2);
        args.push(self.target.clone());
        args.push(self.function.clone());
        args.extend(extra);
        Ok(args)
    }
}

// ── Input bag ────────────────────────────────────────────────────────────────

/// Optional inputs still awaiting consumption, in environment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBag {
    entries: Vec<(String, String)>,
}

impl InputBag {
    /// Collect every non-empty `INPUT_*` variable except the positional ones,
    /// keyed by the name after the prefix.
    #[must_use]
    pub fn from_env(env: &Environment) -> Self {
        env.iter()
            .filter(|(_, v)| !v.is_empty())
            .filter_map(|(k, v)| Some((k.strip_prefix(INPUT_PREFIX)?, v)))
            .filter(|(k, _)| !POSITIONAL_INPUTS.contains(k))
            .collect()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace `key`, keeping its position if already present.
    pub fn insert(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Remove and return `key`.
    pub fn take(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite every path-bearing input as an absolute path under `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        for (key, value) in &mut self.entries {
            if PATH_INPUTS.contains(&key.as_str()) {
                *value = resolve_under(root, value).to_string_lossy().into_owned();
            }
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for InputBag {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut bag = Self::default();
        for (k, v) in iter {
            bag.insert(k, v.to_string());
        }
        bag
    }
}

impl IntoIterator for InputBag {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Join `value` onto `root` and collapse `.`, `..` and repeated separators.
///
/// An absolute `value` replaces `root`. `..` never climbs above `/`.
#[must_use]
pub fn resolve_under(root: &Path, value: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in root.join(value).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
