use std::fmt;

use super::DocumentKey;

/// Location of an object in the staging or durable store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// Staging location of a downloaded document: `<key>/<filename>`.
    pub fn staging(key: &DocumentKey, filename: &str) -> Self {
        Self(format!("{}/{}", key.to_hex(), url_safe_name(filename)))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into().trim_matches('/').to_string())
    }

    pub fn join(&self, child: &str) -> Self {
        let child = child.trim_matches('/');
        if self.0.is_empty() {
            Self(child.to_string())
        } else {
            Self(format!("{}/{}", self.0, child))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`.
pub fn url_safe_name(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = safe.trim_start_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}
