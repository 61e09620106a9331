//! # Visor Core
//!
//! Platform-independent routing logic for the Visor desktop shell.
//!
//! Visor embeds a platform webview and serves a bundled single-page
//! application under a private URI scheme. This crate holds everything that
//! does not touch a platform API: the interception decision for each request,
//! MIME resolution, the bundled asset stores, and the host-side bridge
//! surface. The adapters in `visor-webview` translate the engine's native
//! callback shapes into these types and back.
//!
//! ## Architecture
//!
//! ```text
//! engine request callback
//!        ↓
//! Interceptor::intercept(RequestContext) -> InterceptDecision
//!        ↓                       ↑
//! AssetSource (bundle)      MimeTypes (extension → type)
//! ```
//!
//! The interceptor is a pure function over immutable shared state: it can be
//! called concurrently from the engine's worker context without coordination.

pub mod assets;
pub mod bridge;
pub mod config;
mod error;
pub mod intercept;
pub mod mime;

pub use assets::{AssetSource, DirAssets, EmbeddedAsset, EmbeddedAssets};
pub use bridge::{BridgeHandler, BridgeMessage, BRIDGE_GLOBAL};
pub use config::ShellConfig;
pub use error::{MimeError, Result};
pub use intercept::{InterceptDecision, Interceptor, RequestContext};
pub use mime::{MimeTypes, DEFAULT_MIME_TYPE};
