//! Embed markup generation
//!
//! Emits an abstract node description per plugin embedding convention. Each
//! engine family differs in tag choice, attribute naming and boolean
//! encoding; an external rendering layer turns the description into a live
//! page node.

use crate::detect::WMP_GENERIC_MIME;
use crate::types::{Plugin, PluginInfo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag the rendering layer should instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagKind {
    /// HTML5 `<video>` element
    Video,
    /// `<embed>` element
    Embed,
    /// `<object>` element with nested `<param>` children
    Object,
}

/// Abstract description of an embed node: tag kind, element id, and an
/// ordered attribute/parameter mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: TagKind,
    pub id: String,
    params: IndexMap<String, String>,
}

impl ElementSpec {
    pub fn new(tag: TagKind, id: impl Into<String>) -> Self {
        Self {
            tag,
            id: id.into(),
            params: IndexMap::new(),
        }
    }

    /// Set a parameter. A repeated name overwrites in place, keeping its
    /// original position.
    pub fn param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Read a parameter back. Used as a fallback when the live engine
    /// cannot answer a configuration query.
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn remove_param(&mut self, name: &str) {
        self.params.shift_remove(name);
    }

    /// Parameters in the order they were applied.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Build the embed node description for a detected plugin.
///
/// Fixed per-engine parameters come first; caller-supplied `params` are
/// passed through verbatim afterwards, applied in key order so the output is
/// reproducible.
pub fn element_for(
    info: &PluginInfo,
    player_id: &str,
    media_url: &str,
    autoplay: bool,
    params: &BTreeMap<String, String>,
) -> ElementSpec {
    let mut spec = match info.plugin {
        Plugin::Native => native_element(player_id, media_url, autoplay),
        Plugin::FlashPlayer => flash_element(player_id, media_url),
        Plugin::QuickTimePlayer => quicktime_element(player_id, autoplay),
        Plugin::WinMediaPlayer => win_media_element(info, player_id, media_url, autoplay),
        Plugin::VlcPlayer => vlc_element(player_id, autoplay),
        Plugin::DivXPlayer => divx_element(player_id, autoplay),
    };
    for (name, value) in params {
        spec.param(name.clone(), value.clone());
    }
    spec
}

fn native_element(player_id: &str, media_url: &str, autoplay: bool) -> ElementSpec {
    let mut spec = ElementSpec::new(TagKind::Video, player_id);
    spec.param("src", media_url);
    if autoplay {
        spec.param("autoplay", "true");
    }
    spec.param("controls", "true");
    spec
}

/// The media URL of a Flash player is the swf to load; the actual media is
/// handed to the swf after initialization.
fn flash_element(player_id: &str, swf_url: &str) -> ElementSpec {
    let mut spec = ElementSpec::new(TagKind::Embed, player_id);
    spec.param("type", "application/x-shockwave-flash");
    spec.param("src", swf_url);
    spec.param("name", player_id);
    spec
}

fn quicktime_element(player_id: &str, autoplay: bool) -> ElementSpec {
    let mut spec = ElementSpec::new(TagKind::Embed, player_id);
    spec.param("type", "video/quicktime");
    spec.param("autoplay", text_bool(autoplay));
    spec
}

/// The attribute set depends on the hosting convention the plugin was found
/// under: the Firefox-style host takes text booleans and a `URL` attribute,
/// the plain host numeric booleans and `SRC`.
fn win_media_element(
    info: &PluginInfo,
    player_id: &str,
    media_url: &str,
    autoplay: bool,
) -> ElementSpec {
    let plain_host = info.mime_signature.as_deref() == Some(WMP_GENERIC_MIME);
    let mut spec = ElementSpec::new(TagKind::Object, player_id);
    spec.param(
        "type",
        info.mime_signature.as_deref().unwrap_or(WMP_GENERIC_MIME),
    );
    if plain_host {
        spec.param("autostart", if autoplay { "1" } else { "0" });
        spec.param("SRC", media_url);
    } else {
        spec.param("autostart", text_bool(autoplay));
        spec.param("URL", media_url);
    }
    spec
}

fn vlc_element(player_id: &str, autoplay: bool) -> ElementSpec {
    let mut spec = ElementSpec::new(TagKind::Embed, player_id);
    spec.param("loop", "false");
    spec.param("target", "");
    spec.param("autoplay", text_bool(autoplay));
    spec.param("type", "application/x-vlc-plugin");
    spec.param("events", "true");
    spec.param("version", "VideoLAN.VLCPlugin.2");
    spec
}

fn divx_element(player_id: &str, autoplay: bool) -> ElementSpec {
    let mut spec = ElementSpec::new(TagKind::Embed, player_id);
    spec.param("type", "video/divx");
    spec.param("autoPlay", text_bool(autoplay));
    spec
}

fn text_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
