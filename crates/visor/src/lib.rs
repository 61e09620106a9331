//! # Visor
//!
//! Desktop shell that serves a bundled web application through an embedded
//! webview, under a private URI scheme, with a host-side bridge object
//! exposed to page script.
//!
//! ## Architecture
//!
//! ```text
//! Your app (window + event loop)
//!        ↓ attach(parent view)
//! visor::Shell (wiring: mime table, interceptor, bridge registration)
//!        ↓
//! visor-webview (platform scheme handler / script-message adapter)
//!        ↓
//! visor-core (pure request → decision logic)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use visor::prelude::*;
//!
//! static WEB: &[EmbeddedAsset] = &[
//!     EmbeddedAsset { path: "web/index.html", data: include_bytes!("../web/index.html") },
//! ];
//!
//! struct Backend;
//! impl BridgeHandler for Backend {}
//!
//! let shell = Shell::initialize(ShellOptions::default(), EmbeddedAssets::new(WEB), Backend);
//! // later, from the main thread, with a native parent view:
//! // let webview = unsafe { shell.attach(parent) }?;
//! ```

// Re-export sub-crates
pub use visor_core as core;
pub use visor_webview as webview;

mod shell;

pub use shell::{Shell, ShellOptions, MIME_DEFINITIONS};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use visor_core::{
        // Asset stores
        AssetSource, DirAssets, EmbeddedAsset, EmbeddedAssets,
        // Bridge surface
        BridgeHandler, BridgeMessage, BRIDGE_GLOBAL,
        // Configuration
        ShellConfig,
        // Interception
        InterceptDecision, Interceptor, RequestContext,
        // MIME resolution
        MimeTypes, DEFAULT_MIME_TYPE,
    };
    pub use visor_webview::{WebViewConfig, WebViewSource};

    pub use crate::shell::{Shell, ShellOptions};
}
