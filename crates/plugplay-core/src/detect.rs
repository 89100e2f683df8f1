//! Plugin discovery and version resolution
//!
//! Detection is best-effort by design: a present handler whose version
//! string cannot be parsed still yields a descriptor, just with the zero
//! version. Only a truly absent plugin fails.

use crate::error::{Error, Result};
use crate::types::{MimeHandler, Plugin, PluginInfo, WrapperDialect};
use crate::version::PluginVersion;
use regex::Regex;
use tracing::debug;

/// Marker found in the file name or description of handlers that are the
/// totem-based open-source re-implementation of a vendor plugin.
const SHIM_MARKER: &str = "totem";

/// MIME signature registered by the Windows Media Player plugin for Firefox.
pub const WMP_FIREFOX_MIME: &str = "application/x-ms-wmp";
/// Generic Windows Media Player MIME signature, also claimed by other
/// handlers (VLC among them), hence the vendor check on this path.
pub const WMP_GENERIC_MIME: &str = "application/x-mplayer2";

const NATIVE_VERSION: PluginVersion = PluginVersion::get(5, 0, 0);
/// Sentinel version for Windows Media Player found via the handler table;
/// the exact version is not known on that path.
const WMP_SENTINEL_VERSION: PluginVersion = PluginVersion::get(1, 1, 1);

/// Read-only view of the browser's registered MIME handler table, plus the
/// probe for the built-in HTML5 media capability.
pub trait MimeHandlerTable {
    /// Returns the enabled handler registered for `mime`, if any.
    fn handler(&self, mime: &str) -> Option<MimeHandler>;

    /// Whether the host can construct a native audio object.
    fn has_native_audio(&self) -> bool;
}

/// Direct per-plugin version queries, available only in privileged host
/// environments. Versions obtained this way are exact, not sentinels.
pub trait NativeControlProbe {
    /// Returns the version reported by the plugin's native control object,
    /// or `None` when the control cannot be instantiated.
    fn version_of(&self, plugin: Plugin) -> Option<PluginVersion>;
}

/// Static probe metadata for the handler-table detection path.
struct MimeProfile {
    mime: &'static str,
    /// Substring the handler name must contain for the handler to be
    /// considered authoritative for this plugin
    whois: &'static str,
    /// Pattern extracting three numeric version groups
    version_pattern: &'static str,
    /// Whether the version appears in the handler name rather than the
    /// description
    version_in_name: bool,
}

static DIVX: MimeProfile = MimeProfile {
    mime: "video/divx",
    whois: "divx",
    version_pattern: r"(\d+).(\d+).(\d+)",
    version_in_name: false,
};

static FLASH: MimeProfile = MimeProfile {
    mime: "application/x-shockwave-flash",
    whois: "shockwave flash",
    version_pattern: r"(\d+).(\d+)\s*[rdb](\d+)",
    version_in_name: false,
};

static VLC: MimeProfile = MimeProfile {
    mime: "application/x-vlc-plugin",
    whois: "vlc",
    version_pattern: r"(\d+).(\d+).(\d+)",
    version_in_name: false,
};

static QUICKTIME: MimeProfile = MimeProfile {
    mime: "video/quicktime",
    whois: "quicktime",
    version_pattern: r"(\d+).(\d+).(\d+)",
    version_in_name: true,
};

/// Detect `plugin` through the browser's handler table.
///
/// Fails with [`Error::PluginNotFound`] when the plugin is absent.
pub fn detect(plugin: Plugin, table: &dyn MimeHandlerTable) -> Result<PluginInfo> {
    match plugin {
        Plugin::Native => detect_native(table),
        Plugin::WinMediaPlayer => detect_win_media(table),
        Plugin::FlashPlayer => detect_by_mime(plugin, &FLASH, table),
        Plugin::QuickTimePlayer => detect_by_mime(plugin, &QUICKTIME, table),
        Plugin::VlcPlayer => detect_by_mime(plugin, &VLC, table),
        Plugin::DivXPlayer => detect_by_mime(plugin, &DIVX, table),
    }
}

/// Detect `plugin` by querying its native control object directly.
///
/// Available only in privileged host environments; yields exact versions.
pub fn detect_privileged(
    plugin: Plugin,
    probe: &dyn NativeControlProbe,
    table: &dyn MimeHandlerTable,
) -> Result<PluginInfo> {
    let version = match plugin {
        Plugin::Native => {
            if table.has_native_audio() {
                NATIVE_VERSION
            } else {
                PluginVersion::default()
            }
        }
        _ => probe.version_of(plugin).unwrap_or_default(),
    };

    if version <= PluginVersion::default() {
        return Err(Error::PluginNotFound { plugin });
    }

    Ok(PluginInfo {
        plugin,
        version,
        dialect: WrapperDialect::Native,
        mime_signature: None,
    })
}

fn detect_native(table: &dyn MimeHandlerTable) -> Result<PluginInfo> {
    if table.has_native_audio() {
        Ok(PluginInfo {
            plugin: Plugin::Native,
            version: NATIVE_VERSION,
            dialect: WrapperDialect::Native,
            mime_signature: None,
        })
    } else {
        Err(Error::PluginNotFound {
            plugin: Plugin::Native,
        })
    }
}

/// Windows Media Player registers under two MIME signatures depending on how
/// it is hosted. The Firefox-plugin signature is authoritative on its own;
/// the generic signature is shared with other handlers and needs the vendor
/// check.
fn detect_win_media(table: &dyn MimeHandlerTable) -> Result<PluginInfo> {
    let plugin = Plugin::WinMediaPlayer;

    let (handler, mime) = match table.handler(WMP_FIREFOX_MIME) {
        Some(handler) => (handler, WMP_FIREFOX_MIME),
        None => {
            let handler = table
                .handler(WMP_GENERIC_MIME)
                .ok_or(Error::PluginNotFound { plugin })?;
            // who's got the mime? (WMP / VLC)
            if !handler.name.to_lowercase().contains("windows media player") {
                return Err(Error::PluginNotFound { plugin });
            }
            (handler, WMP_GENERIC_MIME)
        }
    };

    let dialect = if is_shim(&handler) {
        WrapperDialect::OpenSourceShim
    } else {
        WrapperDialect::Native
    };

    debug!(mime, ?dialect, "Windows Media Player handler found");
    Ok(PluginInfo {
        plugin,
        version: WMP_SENTINEL_VERSION,
        dialect,
        mime_signature: Some(mime.to_string()),
    })
}

fn detect_by_mime(
    plugin: Plugin,
    profile: &MimeProfile,
    table: &dyn MimeHandlerTable,
) -> Result<PluginInfo> {
    let handler = table
        .handler(profile.mime)
        .ok_or(Error::PluginNotFound { plugin })?;

    let mut info = PluginInfo {
        plugin,
        version: PluginVersion::default(),
        dialect: WrapperDialect::Native,
        mime_signature: Some(profile.mime.to_string()),
    };

    // Some browsers return a matching MIME type hosted by an unrelated
    // handler; without the vendor substring the handler is not
    // authoritative and the version stays absent.
    if handler.name.to_lowercase().contains(profile.whois) {
        let haystack = if profile.version_in_name {
            &handler.name
        } else {
            &handler.description
        };
        if let Some(version) = extract_version(profile.version_pattern, haystack) {
            info.version = version;
        } else {
            debug!(plugin = %plugin, "version string not parsable, keeping absent version");
        }
        if is_shim(&handler) {
            info.dialect = WrapperDialect::OpenSourceShim;
        }
    }

    Ok(info)
}

/// Run `pattern` against `text` and parse the three numeric groups. Any
/// failure degrades to `None`; detection never aborts on a bad version
/// string.
fn extract_version(pattern: &str, text: &str) -> Option<PluginVersion> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(text)?;
    Some(PluginVersion::get(
        caps.get(1)?.as_str().parse().ok()?,
        caps.get(2)?.as_str().parse().ok()?,
        caps.get(3)?.as_str().parse().ok()?,
    ))
}

fn is_shim(handler: &MimeHandler) -> bool {
    handler.file_name.to_lowercase().contains(SHIM_MARKER)
        || handler.description.to_lowercase().contains(SHIM_MARKER)
}
