//! One-time shell wiring.
//!
//! [`Shell::initialize`] builds the MIME table, constructs the interceptor
//! over the application's asset bundle, and registers both the interceptor
//! and the bridge handler with the platform layer. That registration happens
//! exactly once, before any webview is attached; the registered state lives
//! for the process duration.

use std::path::PathBuf;

use visor_core::{
    AssetSource, BridgeHandler, Interceptor, MimeTypes, ShellConfig, BRIDGE_GLOBAL,
};
use visor_webview::{WebViewConfig, WebViewSource};

/// The MIME definition resource bundled with the shell.
pub const MIME_DEFINITIONS: &str = include_str!("../resources/mime-types.properties");

/// Startup options for the shell.
#[derive(Debug, Default)]
pub struct ShellOptions {
    /// Application identity and window constants.
    pub config: ShellConfig,
    /// Optional on-disk MIME definition resource overriding the bundled one.
    pub mime_definitions: Option<PathBuf>,
    /// Dev server to load instead of the bundle when `config.dev_mode` is set.
    pub dev_server_url: Option<String>,
}

/// The wired shell. Holds the attach-time configuration; the routing state
/// itself is registered process-wide during [`Shell::initialize`].
pub struct Shell {
    config: ShellConfig,
    app_url: String,
    dev_server_url: Option<String>,
}

impl Shell {
    /// Wire the shell: build the MIME table (definition resource with
    /// built-in fallback), construct the interceptor over `assets`, and
    /// register interceptor and bridge handler with the platform layer.
    ///
    /// The routing state intentionally lives for the process duration; the
    /// platform callbacks reach it for as long as the engine delivers
    /// events. Calling this more than once keeps the first registration.
    pub fn initialize<A, H>(options: ShellOptions, assets: A, handler: H) -> Self
    where
        A: AssetSource + 'static,
        H: BridgeHandler + 'static,
    {
        let mime_types = match &options.mime_definitions {
            Some(path) => MimeTypes::load_or_builtin(Some(path)),
            None => MimeTypes::from_definition(MIME_DEFINITIONS).unwrap_or_else(|err| {
                log::warn!("bundled mime definitions unusable: {err}; using built-in set");
                MimeTypes::builtin()
            }),
        };

        let config: &'static ShellConfig = Box::leak(Box::new(options.config.clone()));
        let mime_types: &'static MimeTypes = Box::leak(Box::new(mime_types));
        let assets: &'static A = Box::leak(Box::new(assets));
        let interceptor: &'static Interceptor<'static, A> =
            Box::leak(Box::new(Interceptor::new(config, mime_types, assets)));

        visor_webview::register_interceptor(Box::new(move |request| {
            interceptor.intercept(request)
        }));
        visor_webview::register_bridge(Box::new(handler));

        let app_url = options.config.app_url();
        Self {
            config: options.config,
            app_url,
            dev_server_url: options.dev_server_url,
        }
    }

    /// The shell's static configuration.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The URL the webview navigates to at startup.
    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Build the attach-time webview configuration: bundle-serving in
    /// production, the dev server in dev mode, bridge installed in both.
    pub fn webview_config(&self) -> WebViewConfig<'_> {
        let source = match &self.dev_server_url {
            Some(url) if self.config.dev_mode => WebViewSource::Url(url),
            _ => WebViewSource::App {
                url: &self.app_url,
                scheme: self.config.scheme,
            },
        };
        WebViewConfig {
            source,
            dev_tools: self.config.dev_mode,
            bridge_global: BRIDGE_GLOBAL,
        }
    }

    /// Attach a webview to a native parent view and start the initial
    /// navigation.
    ///
    /// # Safety
    ///
    /// `parent` must be a valid platform view handle (`NSView*` on macOS,
    /// `HWND` on Windows). Must be called from the main thread.
    #[cfg(any(target_os = "macos", target_os = "windows"))]
    pub unsafe fn attach(
        &self,
        parent: *mut std::ffi::c_void,
    ) -> visor_webview::Result<visor_webview::platform::PlatformWebView> {
        // SAFETY: forwarded caller contract.
        unsafe {
            visor_webview::platform::PlatformWebView::attach_to_parent(
                parent,
                &self.webview_config(),
            )
        }
    }
}
