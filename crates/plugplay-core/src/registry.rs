//! Process-wide plugin capability registry
//!
//! Built exactly once at startup by running every detection strategy and
//! caching the successes; failures simply leave the plugin out of the
//! registry. The registry is never mutated afterwards, so sharing it between
//! players needs no synchronization beyond publishing the built value.

use crate::detect::{self, MimeHandlerTable, NativeControlProbe};
use crate::error::{Error, Result};
use crate::types::{Plugin, PluginInfo, WrapperDialect};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Cache of detection outcomes, keyed by plugin kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRegistry {
    infos: BTreeMap<Plugin, PluginInfo>,
}

impl PluginRegistry {
    /// Build the registry through the browser's handler table.
    ///
    /// Runs every detection strategy once. Absent plugins are dropped
    /// silently; detection never aborts the build.
    pub fn detect(table: &dyn MimeHandlerTable) -> Self {
        Self::build(|plugin| detect::detect(plugin, table))
    }

    /// Build the registry through direct native control queries, available
    /// only in privileged host environments.
    pub fn detect_privileged(
        probe: &dyn NativeControlProbe,
        table: &dyn MimeHandlerTable,
    ) -> Self {
        Self::build(|plugin| detect::detect_privileged(plugin, probe, table))
    }

    fn build(strategy: impl Fn(Plugin) -> Result<PluginInfo>) -> Self {
        let mut infos = BTreeMap::new();
        for plugin in Plugin::ALL {
            match strategy(plugin) {
                Ok(detected) => {
                    debug!(plugin = %plugin, version = %detected.version, "plugin detected");
                    infos.insert(plugin, detected);
                }
                Err(_) => {
                    // plugin not available
                    debug!(plugin = %plugin, "plugin not detected");
                }
            }
        }
        info!(detected = infos.len(), "plugin registry built");
        Self { infos }
    }

    /// Look up the cached descriptor for `plugin`.
    pub fn get(&self, plugin: Plugin) -> Result<&PluginInfo> {
        self.infos
            .get(&plugin)
            .ok_or(Error::PluginNotFound { plugin })
    }

    /// Whether `plugin` was detected on this client.
    pub fn is_detected(&self, plugin: Plugin) -> bool {
        self.infos.contains_key(&plugin)
    }

    /// True only when the plugin's wrapper dialect is the open-source
    /// re-implementation, which honors a richer embedding mode.
    pub fn supports_alternate_embedding_mode(&self, plugin: Plugin) -> bool {
        self.infos
            .get(&plugin)
            .map(|info| info.dialect == WrapperDialect::OpenSourceShim)
            .unwrap_or(false)
    }

    /// All detected plugins, in `Plugin` order.
    pub fn detected(&self) -> impl Iterator<Item = &PluginInfo> {
        self.infos.values()
    }
}
