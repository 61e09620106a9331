//! macOS WKWebView implementation.

use std::ffi::c_void;

use objc2::rc::Retained;
use objc2::{msg_send, MainThreadMarker};
use objc2_app_kit::NSView;
use objc2_foundation::{NSString, NSURL, NSURLRequest};
use objc2_web_kit::{WKWebView, WKWebViewConfiguration};

use crate::error::{Result, WebViewError};
use crate::platform::{macos_bridge, macos_scheme};
use crate::{WebViewConfig, WebViewSource};

/// macOS webview backed by WKWebView.
pub struct MacosWebView {
    webview: Retained<WKWebView>,
}

impl MacosWebView {
    /// Attach a WKWebView to the given parent NSView.
    ///
    /// Registers the custom scheme handler (app mode), installs the bridge,
    /// creates the webview and starts the initial navigation. The
    /// interceptor and bridge handler must already be registered via
    /// [`crate::registry`].
    ///
    /// # Safety
    ///
    /// `parent` must be a valid `NSView` pointer provided by the embedding
    /// application. Must be called from the main thread.
    pub unsafe fn attach_to_parent(
        parent: *mut c_void,
        config: &WebViewConfig<'_>,
    ) -> Result<Self> {
        if parent.is_null() {
            return Err(WebViewError::CreationFailed("null parent view".into()));
        }

        let mtm = MainThreadMarker::new().ok_or_else(|| {
            WebViewError::CreationFailed("must be called from the main thread".into())
        })?;

        // SAFETY: caller guarantees `parent` is a valid NSView pointer.
        let parent_view: &NSView = unsafe { &*(parent as *const NSView) };
        let frame = parent_view.frame();

        // SAFETY: WKWebViewConfiguration::new is safe when called on the main thread.
        let wk_config = unsafe { WKWebViewConfiguration::new(mtm) };

        if let WebViewSource::App { scheme, .. } = &config.source {
            // SAFETY: called on the main thread.
            let handler = unsafe { macos_scheme::new_scheme_handler(mtm) };
            let ns_scheme = NSString::from_str(scheme);
            // SAFETY: handler conforms to WKURLSchemeHandler; wk_config is a
            // valid configuration not yet used by a webview.
            unsafe {
                let _: () =
                    msg_send![&wk_config, setURLSchemeHandler: &*handler, forURLScheme: &*ns_scheme];
            }
        }

        // The bridge is installed in both app and dev-server mode.
        // SAFETY: main thread, before the webview is created from wk_config.
        unsafe { macos_bridge::install(&wk_config, config.bridge_global, mtm) };

        // SAFETY: frame and wk_config are valid; we are on the main thread.
        let webview = unsafe {
            WKWebView::initWithFrame_configuration(mtm.alloc(), frame, &wk_config)
        };

        if config.dev_tools {
            // SAFETY: setInspectable is safe to call on a valid WKWebView.
            unsafe { webview.setInspectable(true) };
        }

        let url = match &config.source {
            WebViewSource::App { url, .. } => url,
            WebViewSource::Url(url) => url,
        };
        let ns_url = NSURL::URLWithString(&NSString::from_str(url))
            .ok_or_else(|| WebViewError::CreationFailed(format!("invalid url: {url}")))?;
        // SAFETY: ns_url is a valid NSURL.
        let request = unsafe { NSURLRequest::requestWithURL(&ns_url) };
        // SAFETY: request is valid; webview was just created on the main thread.
        let _ = unsafe { webview.loadRequest(&request) };

        parent_view.addSubview(&webview);

        Ok(Self { webview })
    }

    /// Update the webview frame.
    pub fn set_frame(&self, x: i32, y: i32, width: i32, height: i32) {
        let frame = objc2_foundation::NSRect::new(
            objc2_foundation::NSPoint::new(x as f64, y as f64),
            objc2_foundation::NSSize::new(width as f64, height as f64),
        );
        self.webview.setFrame(frame);
    }

    /// Remove the webview from its parent.
    pub fn detach(&mut self) {
        self.webview.removeFromSuperview();
    }
}
