use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared origin of a document reference on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    /// Path inside the durable store.
    Hdfs,
    /// Local filesystem path or `file://` URL.
    File,
    /// `http://` or `https://` URL.
    Http,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Hdfs => "HDFS",
            SourceKind::File => "FILE",
            SourceKind::Http => "HTTP",
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HDFS" => Ok(SourceKind::Hdfs),
            "FILE" => Ok(SourceKind::File),
            "HTTP" | "HTTPS" | "URL" => Ok(SourceKind::Http),
            other => Err(format!("Unsupported source type: {}", other)),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
