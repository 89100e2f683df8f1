//! Core types for Plugplay

use crate::version::PluginVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media plugins the library can detect and wrap.
///
/// This is a closed set: every player kind maps to exactly one detection
/// path and one embedding convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Plugin {
    /// The browser's built-in HTML5 media capability
    Native,
    FlashPlayer,
    QuickTimePlayer,
    WinMediaPlayer,
    VlcPlayer,
    DivXPlayer,
}

impl Plugin {
    /// Every supported plugin, in detection order.
    pub const ALL: [Plugin; 6] = [
        Plugin::Native,
        Plugin::FlashPlayer,
        Plugin::QuickTimePlayer,
        Plugin::WinMediaPlayer,
        Plugin::VlcPlayer,
        Plugin::DivXPlayer,
    ];

    /// Minimum plugin version the corresponding wrapper requires.
    pub fn required_version(&self) -> PluginVersion {
        match self {
            Plugin::Native => PluginVersion::get(5, 0, 0),
            Plugin::FlashPlayer => PluginVersion::get(9, 0, 0),
            Plugin::QuickTimePlayer => PluginVersion::get(7, 2, 1),
            Plugin::WinMediaPlayer => PluginVersion::get(1, 1, 1),
            Plugin::VlcPlayer => PluginVersion::get(0, 8, 6),
            Plugin::DivXPlayer => PluginVersion::get(1, 4, 0),
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plugin::Native => write!(f, "HTML5 Native"),
            Plugin::FlashPlayer => write!(f, "Flash Player"),
            Plugin::QuickTimePlayer => write!(f, "QuickTime Player"),
            Plugin::WinMediaPlayer => write!(f, "Windows Media Player"),
            Plugin::VlcPlayer => write!(f, "VLC Media Player"),
            Plugin::DivXPlayer => write!(f, "DivX Web Player"),
        }
    }
}

/// Behavioral variant of a plugin family sharing one MIME signature.
///
/// Some handlers report themselves as the expected vendor plugin but are an
/// open-source re-implementation with different embedding conventions. The
/// variant is recorded at detection time and consulted when generating
/// embed markup.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum WrapperDialect {
    /// The vendor's own plugin
    #[default]
    Native,
    /// A compatible open-source re-implementation (totem-based)
    OpenSourceShim,
}

/// Name, description and file name of a registered MIME handler, as read
/// from the browser's handler table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeHandler {
    pub name: String,
    pub description: String,
    pub file_name: String,
}

impl MimeHandler {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            file_name: file_name.into(),
        }
    }
}

/// Cached, immutable record of one plugin's detection outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub plugin: Plugin,
    /// Detected version; the zero triple when the version could not be read
    pub version: PluginVersion,
    pub dialect: WrapperDialect,
    /// The MIME signature the plugin was found under, if detection went
    /// through the handler table
    pub mime_signature: Option<String>,
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.plugin, self.version)
    }
}

/// Metadata reported by the engine once the media headers are parsed.
///
/// Only the items the engine actually reported are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    pub video_width: Option<u32>,
    pub video_height: Option<u32>,
}

impl MediaInfo {
    /// True when the engine reported natural video dimensions.
    pub fn has_video_size(&self) -> bool {
        self.video_width.is_some() || self.video_height.is_some()
    }

    /// Serialize to JSON for diagnostics
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Notifications delivered by an embedded engine instance.
///
/// Only `Ready` affects the player state machine; everything else is
/// forwarded to listeners unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineNotification {
    /// The engine finished asynchronous initialization and will accept
    /// imperative calls
    Ready,
    Error(String),
    Debug(String),
    /// Loading progress as a fraction in `0.0..=1.0`
    LoadingProgress(f64),
    MediaInfo(MediaInfo),
    PlayStarted,
    PlayFinished,
}

/// Events forwarded to player listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready,
    Error(String),
    Debug(String),
    LoadingProgress(f64),
    MediaInfoAvailable(MediaInfo),
    PlayStarted,
    PlayFinished,
    /// The player geometry changed to match the natural video size
    DimensionChanged { width: u32, height: u32 },
}

/// Pixel geometry of a player on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// User interface modes of a plugin's built-in chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiMode {
    /// No visible user interface at all
    Invisible,
    /// Video window only, no controls
    None,
    /// Basic transport controls
    Mini,
    /// Full control set
    Full,
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiMode::Invisible => write!(f, "invisible"),
            UiMode::None => write!(f, "none"),
            UiMode::Mini => write!(f, "mini"),
            UiMode::Full => write!(f, "full"),
        }
    }
}

/// How the engine scales video inside its display area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMode {
    ShowAll,
    NoScale,
    ExactFit,
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleMode::ShowAll => write!(f, "showall"),
            ScaleMode::NoScale => write!(f, "noscale"),
            ScaleMode::ExactFit => write!(f, "exactfit"),
        }
    }
}

/// Enumerated configuration parameters.
///
/// Before attachment these become embed attributes; afterwards they are
/// applied as live engine calls, deferred like any other imperative
/// operation until the engine is ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigParam {
    UiMode(UiMode),
    /// Background color as a CSS color string
    BgColor(String),
    ScaleMode(ScaleMode),
}

impl ConfigParam {
    /// The attribute/parameter name understood by the engines.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigParam::UiMode(_) => "uimode",
            ConfigParam::BgColor(_) => "bgcolor",
            ConfigParam::ScaleMode(_) => "scale",
        }
    }

    /// The encoded attribute value.
    pub fn value(&self) -> String {
        match self {
            ConfigParam::UiMode(mode) => mode.to_string(),
            ConfigParam::BgColor(color) => color.clone(),
            ConfigParam::ScaleMode(mode) => mode.to_string(),
        }
    }
}
