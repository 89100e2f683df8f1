//! Plugin version representation and comparison

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of a detected media plugin as a `(major, minor, revision)` triple.
///
/// Versions compare lexicographically. The zero triple doubles as the
/// "absent" value: detection that finds a plugin but cannot read a usable
/// version number leaves the default in place rather than failing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PluginVersion {
    pub major: u16,
    pub minor: u16,
    pub revision: u16,
}

impl PluginVersion {
    /// Create a version from its parts.
    pub const fn get(major: u16, minor: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            revision,
        }
    }

    /// True unless this is the zero triple.
    pub fn is_present(&self) -> bool {
        *self != Self::default()
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}
