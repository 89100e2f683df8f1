//! Player attach/readiness state machine
//!
//! Embedded engines initialize asynchronously: between markup attachment and
//! the engine's readiness signal, imperative calls cannot reach the engine
//! yet. Every call made in that window is captured as a deferred operation
//! keyed by name and replayed in order on readiness. The same machinery
//! backs the resize quick-fix, which swaps the live engine object for a
//! fresh one to apply new geometry without losing queued intent.

use crate::embed::{self, ElementSpec};
use crate::error::{Error, Result};
use crate::registry::PluginRegistry;
use crate::types::{ConfigParam, EngineNotification, Geometry, PlayerEvent, Plugin, PluginInfo};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Height in pixels reserved for the plugin's control bar when resizing to
/// the natural video size.
const CONTROL_BAR_HEIGHT: u32 = 50;

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

fn next_player_id() -> String {
    format!("plugplay{}", NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed))
}

/// Attachment lifecycle of a player instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    /// Created but not yet attached to the page
    Constructed,
    /// Markup attached, engine still initializing
    AwaitingReady,
    /// Engine accepted initialization and takes imperative calls
    Ready,
}

/// Live engine instance bound to an attached player.
pub trait EngineHandle {
    /// Apply an enumerated configuration parameter on the live engine.
    fn set_parameter(&mut self, name: &str, value: &str);

    /// Begin loading new media.
    fn load_media(&mut self, url: &str) -> std::result::Result<(), String>;
}

/// The rendering layer that instantiates embed markup into live page nodes.
///
/// The core never touches a page node directly; it hands an [`ElementSpec`]
/// to the host and receives an engine handle back.
pub trait EngineHost {
    type Handle: EngineHandle;

    /// Instantiate the markup and return a handle to the new engine.
    fn mount(&mut self, spec: &ElementSpec) -> Self::Handle;

    /// Swap the current engine object for a fresh one in place, preserving
    /// the node's position on the page.
    fn replace(&mut self, spec: &ElementSpec) -> Self::Handle;

    /// Whether applying new geometry requires recreating the engine object
    /// on this platform.
    fn needs_recreate_on_resize(&self) -> bool {
        false
    }
}

type DeferredOp<H> = Box<dyn FnOnce(&mut H)>;

/// A plugin-backed media player.
///
/// Construction validates the plugin against the registry and the wrapper's
/// required version; attachment mounts the embed markup and waits for the
/// engine's readiness signal before letting imperative calls through.
pub struct Player<E: EngineHost> {
    host: E,
    info: PluginInfo,
    player_id: String,
    media_url: String,
    /// `None` puts the player in embedded mode: invisible, events only
    geometry: Option<Geometry>,
    resize_to_video_size: bool,
    /// Natural video size as last reported by the engine, `(width, height)`
    natural_size: Option<(u32, u32)>,
    state: AttachState,
    /// Orthogonal to `state`: set while the resize quick-fix waits for the
    /// replacement engine to signal ready
    resizing: bool,
    pending: IndexMap<String, DeferredOp<E::Handle>>,
    restore: Vec<Box<dyn Fn(&mut E::Handle)>>,
    listeners: Vec<Box<dyn Fn(&PlayerEvent)>>,
    spec: ElementSpec,
    handle: Option<E::Handle>,
}

impl<E: EngineHost> std::fmt::Debug for Player<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("info", &self.info)
            .field("player_id", &self.player_id)
            .field("media_url", &self.media_url)
            .field("geometry", &self.geometry)
            .field("resize_to_video_size", &self.resize_to_video_size)
            .field("natural_size", &self.natural_size)
            .field("state", &self.state)
            .field("resizing", &self.resizing)
            .finish_non_exhaustive()
    }
}

impl<E: EngineHost> Player<E> {
    /// Create a player for `plugin` backed by `host`.
    ///
    /// Fails with [`Error::PluginNotFound`] when the plugin was not detected
    /// and [`Error::PluginVersion`] when the detected version is older than
    /// the wrapper requires.
    pub fn new(
        registry: &PluginRegistry,
        plugin: Plugin,
        media_url: impl Into<String>,
        autoplay: bool,
        geometry: Option<Geometry>,
        host: E,
    ) -> Result<Self> {
        let info = registry.get(plugin)?.clone();
        let required = plugin.required_version();
        if info.version < required {
            return Err(Error::PluginVersion {
                plugin,
                required,
                actual: info.version,
            });
        }

        let media_url = media_url.into();
        let player_id = next_player_id();
        let spec = embed::element_for(&info, &player_id, &media_url, autoplay, &BTreeMap::new());
        info!(player = %player_id, plugin = %info.plugin, version = %info.version, "player created");

        Ok(Self {
            host,
            info,
            player_id,
            media_url,
            geometry,
            resize_to_video_size: false,
            natural_size: None,
            state: AttachState::Constructed,
            resizing: false,
            pending: IndexMap::new(),
            restore: Vec::new(),
            listeners: Vec::new(),
            spec,
            handle: None,
        })
    }

    /// Extra embed parameters applied onto the pending markup after the
    /// fixed per-engine ones. Only honored before attachment; composes with
    /// [`set_config_param`](Self::set_config_param) in either order.
    pub fn with_embed_params(mut self, params: BTreeMap<String, String>) -> Self {
        if self.state == AttachState::Constructed {
            for (name, value) in &params {
                self.spec.param(name.clone(), value.clone());
            }
        }
        self
    }

    /// Attach the embed markup to the page and start engine initialization.
    pub fn attach(&mut self) {
        if self.state != AttachState::Constructed {
            warn!(player = %self.player_id, "player already attached");
            return;
        }
        let handle = self.host.mount(&self.spec);
        self.handle = Some(handle);
        self.state = AttachState::AwaitingReady;
        debug!(player = %self.player_id, plugin = %self.info.plugin, "embed markup attached");
    }

    /// Run `op` against the engine, or defer it until the engine is ready.
    ///
    /// Re-issuing the same `key` before readiness supersedes the earlier
    /// request; only the final value replays. Calls on a player that was
    /// never attached fail with [`Error::InstanceUnavailable`].
    pub fn invoke<F>(&mut self, key: &str, op: F) -> Result<()>
    where
        F: FnOnce(&mut E::Handle) + 'static,
    {
        match self.state {
            AttachState::Constructed => Err(Error::InstanceUnavailable),
            AttachState::AwaitingReady => {
                self.enqueue(key, op);
                Ok(())
            }
            AttachState::Ready => {
                if self.resizing {
                    self.enqueue(key, op);
                    return Ok(());
                }
                match self.handle.as_mut() {
                    Some(handle) => {
                        op(handle);
                        Ok(())
                    }
                    None => Err(Error::InstanceUnavailable),
                }
            }
        }
    }

    /// Apply a configuration parameter.
    ///
    /// Before attachment the parameter becomes an embed attribute; afterwards
    /// it is applied as a live engine call, deferred like any other
    /// imperative operation.
    pub fn set_config_param(&mut self, param: ConfigParam) -> Result<()> {
        let key = param.key();
        let value = param.value();
        if self.state == AttachState::Constructed {
            self.spec.param(key, value);
            Ok(())
        } else {
            self.invoke(key, move |handle| handle.set_parameter(key, &value))
        }
    }

    /// Read a parameter back from the pending embed markup. Fallback for
    /// engines that cannot answer configuration queries.
    pub fn pending_param(&self, name: &str) -> Option<&str> {
        self.spec.get_param(name)
    }

    /// Load new media.
    ///
    /// Issued before readiness the load is deferred; a failure of a deferred
    /// load surfaces through the engine's error notification rather than the
    /// return value.
    pub fn load_media(&mut self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        self.media_url = url.clone();
        match self.state {
            AttachState::Constructed => Err(Error::InstanceUnavailable),
            AttachState::Ready if !self.resizing => {
                let handle = self.handle.as_mut().ok_or(Error::InstanceUnavailable)?;
                handle.load_media(&url).map_err(Error::Load)
            }
            _ => self.invoke("load", move |handle| {
                let _ = handle.load_media(&url);
            }),
        }
    }

    /// Deliver an engine notification.
    ///
    /// `Ready` drives the state machine and drains the deferred queue; all
    /// other notifications are forwarded to listeners unchanged.
    pub fn notify(&mut self, notification: EngineNotification) {
        match notification {
            EngineNotification::Ready => {
                match self.state {
                    AttachState::AwaitingReady => {
                        self.state = AttachState::Ready;
                        info!(player = %self.player_id, "engine ready");
                        self.drain();
                    }
                    AttachState::Ready if self.resizing => {
                        self.resizing = false;
                        debug!(player = %self.player_id, "replacement engine ready");
                        self.drain();
                    }
                    _ => {}
                }
                self.emit(&PlayerEvent::Ready);
            }
            EngineNotification::Error(description) => {
                self.emit(&PlayerEvent::Error(description));
            }
            EngineNotification::Debug(message) => {
                self.emit(&PlayerEvent::Debug(message));
            }
            EngineNotification::LoadingProgress(progress) => {
                self.emit(&PlayerEvent::LoadingProgress(progress));
            }
            EngineNotification::MediaInfo(media_info) => {
                if let (Some(width), Some(height)) =
                    (media_info.video_width, media_info.video_height)
                {
                    self.natural_size = Some((width, height));
                    self.check_video_size(height + CONTROL_BAR_HEIGHT, width);
                }
                self.emit(&PlayerEvent::MediaInfoAvailable(media_info));
            }
            EngineNotification::PlayStarted => self.emit(&PlayerEvent::PlayStarted),
            EngineNotification::PlayFinished => self.emit(&PlayerEvent::PlayFinished),
        }
    }

    /// Grow or shrink the player to match the natural video size as media
    /// metadata arrives.
    pub fn set_resize_to_video_size(&mut self, resize: bool) {
        self.resize_to_video_size = resize;
        if resize && self.state == AttachState::Ready {
            // natural size already known, apply now instead of waiting for
            // the next media info
            if let Some((width, height)) = self.natural_size {
                self.check_video_size(height + CONTROL_BAR_HEIGHT, width);
            }
        }
    }

    pub fn is_resize_to_video_size(&self) -> bool {
        self.resize_to_video_size
    }

    /// Register a listener for forwarded engine events.
    pub fn add_listener(&mut self, listener: impl Fn(&PlayerEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a callback re-run against the fresh engine handle whenever
    /// the resize quick-fix replaces the engine object.
    pub fn add_restore_callback(&mut self, restore: impl Fn(&mut E::Handle) + 'static) {
        self.restore.push(Box::new(restore));
    }

    /// Detach from the engine. Further imperative calls fail with
    /// [`Error::InstanceUnavailable`].
    pub fn close(&mut self) {
        debug!(player = %self.player_id, "player closed");
        self.handle = None;
        self.pending.clear();
        self.resizing = false;
        self.state = AttachState::Constructed;
    }

    pub fn state(&self) -> AttachState {
        self.state
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn plugin_info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    /// Number of operations waiting for the readiness signal.
    pub fn pending_operations(&self) -> usize {
        self.pending.len()
    }

    fn enqueue<F>(&mut self, key: &str, op: F)
    where
        F: FnOnce(&mut E::Handle) + 'static,
    {
        // a re-issued key supersedes the earlier request and moves to the
        // back of the queue
        self.pending.shift_remove(key);
        self.pending.insert(key.to_string(), Box::new(op));
        debug!(player = %self.player_id, key, "operation deferred until engine ready");
    }

    fn drain(&mut self) {
        let ops = std::mem::take(&mut self.pending);
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        for (key, op) in ops {
            debug!(player = %self.player_id, key = %key, "replaying deferred operation");
            op(handle);
        }
    }

    fn check_video_size(&mut self, target_height: u32, target_width: u32) {
        if !self.resize_to_video_size {
            return;
        }
        // embedded mode has no visible geometry to adjust
        let Some(current) = self.geometry else {
            return;
        };
        if target_height == 0 || target_width == 0 {
            return;
        }
        let target = Geometry::new(target_width, target_height);
        if target == current {
            return;
        }

        debug!(player = %self.player_id, size = %target, "resizing player");
        self.geometry = Some(target);
        if self.state == AttachState::Ready
            && !self.resizing
            && self.host.needs_recreate_on_resize()
        {
            self.begin_resize_recovery();
        }
        self.emit(&PlayerEvent::DimensionChanged {
            width: target_width,
            height: target_height,
        });
    }

    /// Quick resizing fix: on platforms that cannot resize a live engine,
    /// swap in a fresh embed at the same page position. The player stays in
    /// `Ready` with the resizing flag set until the replacement engine
    /// signals ready, at which point anything queued meanwhile drains.
    fn begin_resize_recovery(&mut self) {
        self.resizing = true;
        let mut spec = embed::element_for(
            &self.info,
            &self.player_id,
            &self.media_url,
            true,
            &BTreeMap::new(),
        );
        // the replacement markup keeps every accumulated parameter the fresh
        // fixed set does not claim, so configuration applied before the swap
        // survives it
        for (name, value) in self.spec.params() {
            if spec.get_param(name).is_none() {
                spec.param(name, value);
            }
        }
        self.spec = spec;
        let mut handle = self.host.replace(&self.spec);
        for restore in &self.restore {
            restore(&mut handle);
        }
        self.handle = Some(handle);
    }

    fn emit(&self, event: &PlayerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
