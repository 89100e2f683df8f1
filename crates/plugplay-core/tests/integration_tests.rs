//! Integration tests for Plugplay Core

use plugplay_core::{
    element_for, AttachState, ConfigParam, ElementSpec, EngineHandle, EngineHost,
    EngineNotification, Error, Geometry, MediaInfo, MimeHandler, MimeHandlerTable,
    NativeControlProbe, Player, PlayerEvent, Plugin, PluginRegistry, PluginVersion, TagKind,
    UiMode, WrapperDialect,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct BrowserTable {
    handlers: HashMap<&'static str, MimeHandler>,
    native_audio: bool,
}

impl BrowserTable {
    fn with(
        mut self,
        mime: &'static str,
        name: &str,
        description: &str,
        file_name: &str,
    ) -> Self {
        self.handlers
            .insert(mime, MimeHandler::new(name, description, file_name));
        self
    }

    fn native_audio(mut self) -> Self {
        self.native_audio = true;
        self
    }
}

impl MimeHandlerTable for BrowserTable {
    fn handler(&self, mime: &str) -> Option<MimeHandler> {
        self.handlers.get(mime).cloned()
    }

    fn has_native_audio(&self) -> bool {
        self.native_audio
    }
}

type CallLog = Rc<RefCell<Vec<String>>>;

struct LogHandle(CallLog);

impl EngineHandle for LogHandle {
    fn set_parameter(&mut self, name: &str, value: &str) {
        self.0.borrow_mut().push(format!("param {name}={value}"));
    }

    fn load_media(&mut self, url: &str) -> Result<(), String> {
        self.0.borrow_mut().push(format!("load {url}"));
        Ok(())
    }
}

struct LogHost {
    calls: CallLog,
    recreate_on_resize: bool,
}

impl EngineHost for LogHost {
    type Handle = LogHandle;

    fn mount(&mut self, spec: &ElementSpec) -> LogHandle {
        self.calls.borrow_mut().push(format!("mount {}", spec.id));
        LogHandle(self.calls.clone())
    }

    fn replace(&mut self, spec: &ElementSpec) -> LogHandle {
        self.calls.borrow_mut().push(format!("replace {}", spec.id));
        LogHandle(self.calls.clone())
    }

    fn needs_recreate_on_resize(&self) -> bool {
        self.recreate_on_resize
    }
}

fn linux_firefox_table() -> BrowserTable {
    BrowserTable::default()
        .native_audio()
        .with(
            "application/x-shockwave-flash",
            "Shockwave Flash",
            "Shockwave Flash 10.0 r45",
            "libflashplayer.so",
        )
        .with(
            "application/x-vlc-plugin",
            "VLC Multimedia Plugin",
            "Version 1.0.2, copyright the VideoLAN team",
            "libvlcplugin.so",
        )
        .with(
            "application/x-mplayer2",
            "Windows Media Player Plug-in 10 (compatible; Totem)",
            "The Totem 2.30.2 plugin handles video and audio streams.",
            "libtotem-gmp-plugin.so",
        )
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_registry_from_browser_table() {
    let registry = PluginRegistry::detect(&linux_firefox_table());

    assert!(registry.is_detected(Plugin::Native));
    assert!(registry.is_detected(Plugin::FlashPlayer));
    assert!(registry.is_detected(Plugin::VlcPlayer));
    assert!(registry.is_detected(Plugin::WinMediaPlayer));
    assert!(!registry.is_detected(Plugin::QuickTimePlayer));
    assert!(!registry.is_detected(Plugin::DivXPlayer));

    let flash = registry.get(Plugin::FlashPlayer).unwrap();
    assert_eq!(flash.version, PluginVersion::get(10, 0, 45));
    assert_eq!(flash.dialect, WrapperDialect::Native);

    // totem hosts the generic WMP mime on this client
    let wmp = registry.get(Plugin::WinMediaPlayer).unwrap();
    assert_eq!(wmp.dialect, WrapperDialect::OpenSourceShim);
    assert!(registry.supports_alternate_embedding_mode(Plugin::WinMediaPlayer));
}

#[test]
fn test_registry_missing_plugin() {
    let registry = PluginRegistry::detect(&linux_firefox_table());
    assert!(matches!(
        registry.get(Plugin::DivXPlayer),
        Err(Error::PluginNotFound {
            plugin: Plugin::DivXPlayer
        })
    ));
}

#[test]
fn test_registry_determinism() {
    let first = PluginRegistry::detect(&linux_firefox_table());
    let second = PluginRegistry::detect(&linux_firefox_table());
    assert_eq!(first, second);
}

#[test]
fn test_privileged_registry_exact_versions() {
    struct ControlProbe;

    impl NativeControlProbe for ControlProbe {
        fn version_of(&self, plugin: Plugin) -> Option<PluginVersion> {
            match plugin {
                Plugin::FlashPlayer => Some(PluginVersion::get(10, 1, 102)),
                Plugin::WinMediaPlayer => Some(PluginVersion::get(12, 0, 0)),
                _ => None,
            }
        }
    }

    let registry =
        PluginRegistry::detect_privileged(&ControlProbe, &BrowserTable::default().native_audio());

    assert_eq!(
        registry.get(Plugin::FlashPlayer).unwrap().version,
        PluginVersion::get(10, 1, 102)
    );
    // no sentinel on this path
    assert_eq!(
        registry.get(Plugin::WinMediaPlayer).unwrap().version,
        PluginVersion::get(12, 0, 0)
    );
    assert!(!registry.is_detected(Plugin::VlcPlayer));
}

// =============================================================================
// Embed Factory Tests
// =============================================================================

#[test]
fn test_embed_markup_from_detected_descriptor() {
    let registry = PluginRegistry::detect(&linux_firefox_table());

    let vlc = registry.get(Plugin::VlcPlayer).unwrap();
    let mut params = BTreeMap::new();
    params.insert("bgcolor".to_string(), "#000000".to_string());
    let spec = element_for(vlc, "player1", "movie.avi", true, &params);

    assert_eq!(spec.tag, TagKind::Embed);
    assert_eq!(spec.get_param("type"), Some("application/x-vlc-plugin"));
    assert_eq!(spec.get_param("autoplay"), Some("true"));
    assert_eq!(spec.get_param("bgcolor"), Some("#000000"));
}

#[test]
fn test_embed_boolean_conventions() {
    let registry = PluginRegistry::detect(&linux_firefox_table());

    // the generic WMP hosting takes numeric booleans and the SRC attribute
    let wmp = registry.get(Plugin::WinMediaPlayer).unwrap();
    let spec = element_for(wmp, "player2", "x.mp3", true, &BTreeMap::new());
    assert_eq!(spec.tag, TagKind::Object);
    assert_eq!(spec.get_param("autostart"), Some("1"));
    assert_eq!(spec.get_param("SRC"), Some("x.mp3"));

    // native HTML5 takes text booleans
    let native = registry.get(Plugin::Native).unwrap();
    let spec = element_for(native, "player3", "x.mp3", true, &BTreeMap::new());
    assert_eq!(spec.tag, TagKind::Video);
    assert_eq!(spec.get_param("autoplay"), Some("true"));
}

// =============================================================================
// Player Lifecycle Tests
// =============================================================================

#[test]
fn test_full_player_lifecycle() {
    let registry = PluginRegistry::detect(&linux_firefox_table());
    let calls: CallLog = Rc::default();
    let events: Rc<RefCell<Vec<PlayerEvent>>> = Rc::default();

    let mut player = Player::new(
        &registry,
        Plugin::VlcPlayer,
        "movie.avi",
        false,
        Some(Geometry::new(320, 100)),
        LogHost {
            calls: calls.clone(),
            recreate_on_resize: true,
        },
    )
    .unwrap();

    let sink = events.clone();
    player.add_listener(move |event| sink.borrow_mut().push(event.clone()));
    player.set_resize_to_video_size(true);
    player.set_config_param(ConfigParam::UiMode(UiMode::Full)).unwrap();

    // config before attachment lands in the markup, not the engine
    assert_eq!(player.pending_param("uimode"), Some("full"));

    player.attach();
    assert_eq!(player.state(), AttachState::AwaitingReady);

    // issued before readiness, replayed after
    player
        .invoke("volume", |h| h.set_parameter("volume", "75"))
        .unwrap();
    player.notify(EngineNotification::Ready);
    assert_eq!(player.state(), AttachState::Ready);
    assert!(calls.borrow().contains(&"param volume=75".to_string()));

    // natural size arrives, platform requires engine recreation
    player.notify(EngineNotification::MediaInfo(MediaInfo {
        video_width: Some(320),
        video_height: Some(240),
        ..Default::default()
    }));
    assert!(player.is_resizing());
    assert_eq!(player.geometry(), Some(Geometry::new(320, 290)));

    player.notify(EngineNotification::Ready);
    assert!(!player.is_resizing());

    player.notify(EngineNotification::PlayStarted);
    player.notify(EngineNotification::PlayFinished);

    let seen = events.borrow().clone();
    assert!(seen.contains(&PlayerEvent::DimensionChanged {
        width: 320,
        height: 290,
    }));
    assert!(seen.contains(&PlayerEvent::PlayStarted));
    assert!(seen.contains(&PlayerEvent::PlayFinished));
}

#[test]
fn test_player_requires_detected_plugin() {
    let registry = PluginRegistry::detect(&linux_firefox_table());
    let calls: CallLog = Rc::default();

    let result = Player::new(
        &registry,
        Plugin::QuickTimePlayer,
        "clip.mov",
        false,
        None,
        LogHost {
            calls,
            recreate_on_resize: false,
        },
    );
    assert!(matches!(result, Err(Error::PluginNotFound { .. })));
}

#[test]
fn test_player_not_attached_is_unavailable() {
    let registry = PluginRegistry::detect(&linux_firefox_table());
    let calls: CallLog = Rc::default();

    let mut player = Player::new(
        &registry,
        Plugin::VlcPlayer,
        "movie.avi",
        false,
        None,
        LogHost {
            calls,
            recreate_on_resize: false,
        },
    )
    .unwrap();

    assert!(matches!(
        player.load_media("other.avi"),
        Err(Error::InstanceUnavailable)
    ));
}
