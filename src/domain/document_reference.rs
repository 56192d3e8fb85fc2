use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque locator for a source document, exactly as it arrived on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentReference(String);

impl DocumentReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Last path segment, percent-decoded, with any query or fragment removed.
    ///
    /// Falls back to the raw segment when it is not valid percent-encoding.
    pub fn filename(&self) -> String {
        let without_suffix = self
            .0
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segment = without_suffix
            .rsplit('/')
            .next()
            .unwrap_or(without_suffix);

        let decoded = urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string());

        if decoded.trim().is_empty() {
            "document".to_string()
        } else {
            decoded
        }
    }

    /// Reference suitable for a network request.
    ///
    /// Each path segment is decoded and re-encoded, so a reference that was
    /// already encoded is not encoded a second time. A query string or
    /// fragment is carried over byte for byte.
    pub fn encoded_for_network(&self) -> String {
        let (head, rest) = split_authority(&self.0);
        let (path, suffix) = rest.split_at(rest.find(['?', '#']).unwrap_or(rest.len()));

        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| {
                let decoded = urlencoding::decode(segment)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| segment.to_string());
                urlencoding::encode(&decoded).into_owned()
            })
            .collect();

        format!("{head}{}{suffix}", encoded.join("/"))
    }
}

fn split_authority(raw: &str) -> (&str, &str) {
    match raw.find("://") {
        Some(scheme_end) => {
            let after_scheme = scheme_end + 3;
            match raw[after_scheme..].find('/') {
                Some(path_start) => raw.split_at(after_scheme + path_start),
                None => (raw, ""),
            }
        }
        None => ("", raw),
    }
}

impl fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentReference {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
