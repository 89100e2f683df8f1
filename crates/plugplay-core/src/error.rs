//! Error types for Plugplay Core

use crate::types::Plugin;
use crate::version::PluginVersion;
use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    /// The plugin is not installed, or the registered handler failed the
    /// authoritative vendor check.
    #[error("{plugin} plugin not available on this client")]
    PluginNotFound { plugin: Plugin },

    /// The plugin is installed but older than the wrapper requires.
    #[error("{plugin} plugin version {actual} found, {required} or later required")]
    PluginVersion {
        plugin: Plugin,
        required: PluginVersion,
        actual: PluginVersion,
    },

    /// The media failed to begin loading.
    #[error("failed to load media: {0}")]
    Load(String),

    /// An imperative call was made on a player that was never attached to the
    /// page, or was closed already.
    #[error("player not available, create an instance")]
    InstanceUnavailable,
}

impl Error {
    /// Returns true if this error is recoverable by the caller, typically by
    /// showing a missing-plugin notice or retrying with different media.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InstanceUnavailable)
    }

    /// Returns the error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::PluginNotFound { .. } => "PLUGIN_NOT_FOUND",
            Error::PluginVersion { .. } => "PLUGIN_VERSION",
            Error::Load(_) => "LOAD",
            Error::InstanceUnavailable => "INSTANCE_UNAVAILABLE",
        }
    }
}
