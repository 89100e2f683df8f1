//! Plugplay Core - Media Plugin Capability Negotiation
//!
//! This crate provides the core functionality for wrapping browser media
//! plugins behind one uniform player contract:
//! - Plugin discovery through the browser's MIME handler table
//! - Version extraction and comparison
//! - Wrapper-dialect detection for open-source plugin re-implementations
//! - Embed markup generation per engine convention
//! - Deferred-operation sequencing against asynchronously-initializing
//!   engines, including the resize quick-fix recovery protocol
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Plugplay Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  Detection   │  │    Plugin    │  │    Embed     │           │
//! │  │  Strategies  │──│   Registry   │──│   Factory    │           │
//! │  └──────┬───────┘  └──────────────┘  └──────┬───────┘           │
//! │         │                                   │                   │
//! │  ┌──────┴───────┐                    ┌──────┴──────┐            │
//! │  │ MIME Handler │                    │   Player    │            │
//! │  │    Table     │                    │ State/Queue │            │
//! │  └──────────────┘                    └──────┬──────┘            │
//! │                                             │                   │
//! │                                      ┌──────┴──────┐            │
//! │                                      │ Engine Host │            │
//! │                                      │  (external) │            │
//! │                                      └─────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All detection runs once at startup into a [`PluginRegistry`]; players
//! validate against the registry, mount their markup through an
//! [`EngineHost`], and queue imperative calls until the engine signals
//! ready.

pub mod detect;
pub mod embed;
pub mod error;
pub mod player;
pub mod registry;
pub mod types;
pub mod version;

pub use detect::{MimeHandlerTable, NativeControlProbe};
pub use embed::{element_for, ElementSpec, TagKind};
pub use error::{Error, Result};
pub use player::{AttachState, EngineHandle, EngineHost, Player};
pub use registry::PluginRegistry;
pub use types::*;
pub use version::PluginVersion;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Plugplay Core initialized");
}
