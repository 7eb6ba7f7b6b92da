//! Local filesystem configuration.

use serde::{Deserialize, Serialize};

/// Local filesystem configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsConfig {
    /// Directory objects are read from.
    pub root: String,
}

impl FsConfig {
    /// Creates a new filesystem configuration.
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}
