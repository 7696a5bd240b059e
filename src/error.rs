//! Crate-level error types.

use std::fmt;

/// Errors produced while setting up the globe or loading its geometry.
#[derive(Debug)]
pub enum GlobeError {
    /// Configuration could not be read or failed validation.
    Config(String),
    /// Generic I/O failure (local dataset or export file).
    Io(std::io::Error),
    /// Network fetch of the geography dataset failed.
    Fetch(String),
    /// The dataset is not a usable TopoJSON topology.
    Topology(String),
    /// The topology has no object with the requested name.
    MissingObject(String),
    /// No usable output surface to draw into.
    Surface(String),
}

impl fmt::Display for GlobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Fetch(msg) => write!(f, "fetch error: {msg}"),
            Self::Topology(msg) => write!(f, "topology error: {msg}"),
            Self::MissingObject(name) => {
                write!(f, "topology has no object named {name:?}")
            }
            Self::Surface(msg) => write!(f, "output surface error: {msg}"),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GlobeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for GlobeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Topology(e.to_string())
    }
}

/// Convenience alias for results carrying a [`GlobeError`].
pub type Result<T> = std::result::Result<T, GlobeError>;
