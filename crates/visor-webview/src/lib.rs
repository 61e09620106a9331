//! Platform webview adapters for the Visor desktop shell.
//!
//! Thin translation layer between the platform engine's callback shapes
//! (scheme-handler tasks, script messages) and the pure decision logic in
//! `visor-core`. The interceptor and bridge handler are registered once via
//! [`registry`] before a webview is attached; the platform callbacks reach
//! them through that registration.

mod error;
pub mod platform;
pub mod registry;

pub use error::{Result, WebViewError};
pub use registry::{register_bridge, register_interceptor};

/// Content source for a webview.
pub enum WebViewSource<'a> {
    /// Serve the bundled application under the registered custom scheme.
    App {
        /// Startup URL, e.g. `app://dashboard/`.
        url: &'a str,
        /// The custom scheme to route through the registered interceptor.
        scheme: &'a str,
    },
    /// Navigate to a URL (dev server).
    Url(&'a str),
}

/// Configuration for attaching a webview.
pub struct WebViewConfig<'a> {
    /// Content source.
    pub source: WebViewSource<'a>,
    /// Whether to enable developer tools.
    pub dev_tools: bool,
    /// Global property name the bridge object is installed under.
    pub bridge_global: &'a str,
}
