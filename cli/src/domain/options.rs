//! Command-line options destined for `salt-ssh`.
//!
//! Pure data only — no I/O. Options are keyed by their normalized name and
//! emitted in insertion order.

use std::fmt;

use crate::domain::error::OptionError;

/// Value carried by a single option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Flag form, emitted as `--key`.
    Present,
    /// Valued form, emitted as `--key=value`.
    Value(String),
}

impl OptionValue {
    /// Render this value under `key` as a single command-line token.
    #[must_use]
    pub fn to_token(&self, key: &str) -> String {
        match self {
            Self::Present => format!("--{key}"),
            Self::Value(v) => format!("--{key}={v}"),
        }
    }
}

/// Normalize an option name: strip the leading `--`, turn `_` into `-`, lowercase.
///
/// Repeated `--` prefixes (including ones spelled with underscores) are all
/// stripped so that `normalize(normalize(x)) == normalize(x)` for every input.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.replace('_', "-")
        .to_lowercase()
        .trim_start_matches("--")
        .to_string()
}

/// Ordered, de-duplicated set of command-line options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(String, OptionValue)>,
}

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to a raw string value.
    ///
    /// An empty value unsets the option (absent keys are left alone).
    /// `"true"` in any case is stored as [`OptionValue::Present`].
    pub fn set(&mut self, name: &str, value: &str) {
        if value.is_empty() {
            let _ = self.unset(name);
            return;
        }
        let value = if value.eq_ignore_ascii_case("true") {
            OptionValue::Present
        } else {
            OptionValue::Value(value.to_string())
        };
        self.insert(normalize(name), value);
    }

    /// Set `name` as a bare flag.
    pub fn enable(&mut self, name: &str) {
        self.insert(normalize(name), OptionValue::Present);
    }

    /// Remove `name`, returning its previous value.
    ///
    /// # Errors
    ///
    /// Returns [`OptionError::NotFound`] if the option is not set.
    pub fn unset(&mut self, name: &str) -> Result<OptionValue, OptionError> {
        let key = normalize(name);
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| *k == key)
            .ok_or(OptionError::NotFound(key))?;
        Ok(self.entries.remove(pos).1)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        let key = normalize(name);
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lazily render every option as a command-line token.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            entries: self.entries.iter(),
        }
    }

    fn insert(&mut self, key: String, value: OptionValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// Token iterator returned by [`OptionSet::tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    entries: std::slice::Iter<'a, (String, OptionValue)>,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.entries.next().map(|(k, v)| v.to_token(k))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = String;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Tokens<'a> {
        self.tokens()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.tokens().collect();
        f.write_str(&tokens.join(" "))
    }
}
