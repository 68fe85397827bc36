use std::collections::BTreeMap;
use std::path::Path;

use crate::dto::CredentialsError;

pub const API_KEY_VAR: &str = "DRIFTMIND_API_KEY";
pub const API_URL_VAR: &str = "DRIFTMIND_API_URL";

/// Connection parameters for [`crate::DriftMindClient`].
///
/// `extra` keeps every additional key found in the source so callers can
/// carry their own settings in the same file.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub api_url: String,
    pub extra: BTreeMap<String, String>,
}

impl Credentials {
    /// Load credentials from a `KEY=value` file.
    ///
    /// Lines are parsed with `dotenvy` rules:
    ///
    /// * blank lines, `#` comments, and lines without `=` are skipped;
    /// * keys and values are trimmed and everything after the first `=` is the
    ///   value;
    /// * values containing spaces must be quoted (`KEY="my key"`);
    /// * `$NAME` is expanded in unquoted and double-quoted values, so a
    ///   required value containing `$` must be single-quoted (`KEY='ab$cd'`).
    ///   An unquoted or double-quoted `$` in either required key is rejected
    ///   with [`CredentialsError::Substitution`] rather than silently expanded.
    ///
    /// Returns [`CredentialsError::NotFound`] when the file does not exist and
    /// [`CredentialsError::MissingKey`] when either required key is absent or
    /// empty.
    ///
    /// ```no_run
    /// use driftmind_sdk::Credentials;
    ///
    /// let credentials = Credentials::load("resources/DRIFTMIND_CONNECT.txt")?;
    /// println!("{}", credentials.api_url);
    /// # Ok::<(), driftmind_sdk::CredentialsError>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CredentialsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                CredentialsError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CredentialsError::Parse(err.to_string())
            }
        })?;

        let assignments = contents
            .lines()
            .filter(|line| line.contains('='))
            .collect::<Vec<_>>()
            .join("\n");
        for key in [API_KEY_VAR, API_URL_VAR] {
            reject_substitution(&assignments, key)?;
        }

        let mut values = BTreeMap::new();
        for entry in dotenvy::from_read_iter(assignments.as_bytes()) {
            let (key, value) = entry.map_err(|err| CredentialsError::Parse(err.to_string()))?;
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        Self::from_map(values)
    }

    /// Read the two required keys from the process environment.
    pub fn from_env() -> Result<Self, CredentialsError> {
        let values = [API_KEY_VAR, API_URL_VAR]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        Self::from_map(values)
    }

    /// Validate an already parsed mapping.
    pub fn from_map(mut values: BTreeMap<String, String>) -> Result<Self, CredentialsError> {
        let api_key = take_required(&mut values, API_KEY_VAR)?;
        let api_url = take_required(&mut values, API_URL_VAR)?;

        Ok(Self {
            api_key,
            api_url,
            extra: values,
        })
    }
}

fn reject_substitution(assignments: &str, key: &'static str) -> Result<(), CredentialsError> {
    for line in assignments.lines() {
        let line = line.trim_start();
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((name, raw)) = line.split_once('=') else {
            continue;
        };
        if name.trim() == key && raw.contains('$') && !raw.trim_start().starts_with('\'') {
            return Err(CredentialsError::Substitution { key });
        }
    }
    Ok(())
}

fn take_required(
    values: &mut BTreeMap<String, String>,
    key: &'static str,
) -> Result<String, CredentialsError> {
    values
        .remove(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(CredentialsError::MissingKey { key })
}
