//! Bridge installation and message delivery for WKWebView.
//!
//! Two pieces: a document-start `WKUserScript` that installs the bridge
//! object on each new document's global scope, and a
//! `WKScriptMessageHandler` class that receives the posted messages and
//! forwards them to the registered [`BridgeHandler`]. Invoke replies are
//! evaluated back into the originating page so its Promise settles. If the
//! page's scope or a message body is unavailable at delivery time the event
//! is skipped silently; that is an expected navigation race, not an error.
//!
//! The handler class uses a fixed name (`VisorBridgeHandler`): one shell per
//! process, and the implementation carries no per-instance state.
//!
//! [`BridgeHandler`]: visor_core::BridgeHandler

use std::sync::OnceLock;

use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject, ClassBuilder, Sel};
use objc2::{msg_send, sel, ClassType, MainThreadMarker};
use objc2_foundation::{NSInteger, NSObject, NSString};
use objc2_web_kit::WKWebViewConfiguration;

use visor_core::bridge;

use crate::registry;

/// Message channel name registered with the user content controller.
pub const MESSAGE_CHANNEL: &str = "visorBridge";

/// Global property name the bridge was installed under; replies address it.
static INSTALLED_GLOBAL: OnceLock<String> = OnceLock::new();

/// The platform's post expression, handed to the bootstrap script.
fn post_expression() -> String {
    format!("window.webkit.messageHandlers.{MESSAGE_CHANNEL}.postMessage")
}

/// Get or register the bridge message handler ObjC class.
fn bridge_handler_class() -> &'static AnyClass {
    let c_name = c"VisorBridgeHandler";

    if let Some(existing) = AnyClass::get(c_name) {
        return existing;
    }

    let superclass = NSObject::class();
    let mut builder = match ClassBuilder::new(c_name, superclass) {
        Some(b) => b,
        None => {
            return AnyClass::get(c_name)
                .expect("class must exist after ClassBuilder::new returned None");
        }
    };

    // SAFETY: method signature matches the WKScriptMessageHandler protocol.
    unsafe {
        builder.add_method(
            sel!(userContentController:didReceiveScriptMessage:),
            did_receive_script_message
                as unsafe extern "C-unwind" fn(*mut AnyObject, Sel, *const AnyObject, *const AnyObject),
        );
    }

    builder.register()
}

/// `userContentController:didReceiveScriptMessage:` implementation.
///
/// WebKit delivers these from its own context. Every failure path is a
/// silent return; nothing may escape this callback.
unsafe extern "C-unwind" fn did_receive_script_message(
    _this: *mut AnyObject,
    _cmd: Sel,
    _controller: *const AnyObject,
    message: *const AnyObject,
) {
    // SAFETY: WebKit provides a valid message pointer.
    let message: &AnyObject = unsafe { &*message };

    // SAFETY: WKScriptMessage has a `body` property.
    let body: *const AnyObject = unsafe { msg_send![message, body] };
    if body.is_null() {
        return;
    }

    // SAFETY: body is a valid NSString from postMessage(JSON.stringify(...)).
    let utf8: *const u8 = unsafe { msg_send![body, UTF8String] };
    if utf8.is_null() {
        return;
    }
    // SAFETY: NSUTF8StringEncoding = 4; body is a valid NSString.
    let len: usize = unsafe { msg_send![body, lengthOfBytesUsingEncoding: 4u64] };

    // SAFETY: UTF8String is valid for `len` bytes for the duration of this call.
    let bytes = unsafe { std::slice::from_raw_parts(utf8, len) };
    let Ok(raw) = std::str::from_utf8(bytes) else {
        return;
    };

    let Some(handler) = registry::bridge() else {
        return;
    };
    let global = INSTALLED_GLOBAL
        .get()
        .map(String::as_str)
        .unwrap_or(bridge::BRIDGE_GLOBAL);
    let Some(reply) = bridge::dispatch(handler, raw, global) else {
        return;
    };

    // SAFETY: WKScriptMessage has a nullable `webView` property.
    let webview: *const AnyObject = unsafe { msg_send![message, webView] };
    if webview.is_null() {
        // The page navigated away before the reply; its Promise dies with it.
        return;
    }
    // SAFETY: non-null webView from a live WKScriptMessage.
    let webview: &AnyObject = unsafe { &*webview };

    let source = NSString::from_str(&reply);
    let no_completion: *const AnyObject = std::ptr::null();
    // SAFETY: webview is a valid WKWebView; a nil completion handler is
    // allowed by evaluateJavaScript:completionHandler:.
    unsafe {
        let _: () = msg_send![
            webview,
            evaluateJavaScript: &*source,
            completionHandler: no_completion
        ];
    }
}

/// Allocate a bridge message handler instance.
///
/// # Safety
///
/// Must be called from the main thread.
unsafe fn new_bridge_handler(_mtm: MainThreadMarker) -> Retained<AnyObject> {
    let cls = bridge_handler_class();

    // SAFETY: standard ObjC alloc + init pattern on a class we just built.
    let obj: *mut AnyObject = unsafe { msg_send![cls, alloc] };
    // SAFETY: init on a freshly allocated object.
    let obj: *mut AnyObject = unsafe { msg_send![obj, init] };
    assert!(!obj.is_null(), "alloc+init returned nil");

    // SAFETY: alloc+init returned a +1 retained, non-null object.
    unsafe { Retained::from_raw(obj) }.unwrap()
}

/// Install the bridge on a webview configuration: registers the message
/// channel and adds the document-start script that exposes the bridge
/// object under `global` on each new document.
///
/// # Safety
///
/// Must be called from the main thread, before the WKWebView is created
/// from `config`.
pub unsafe fn install(config: &WKWebViewConfiguration, global: &str, mtm: MainThreadMarker) {
    let _ = INSTALLED_GLOBAL.set(global.to_string());

    // SAFETY: config is a valid WKWebViewConfiguration on the main thread.
    let controller = unsafe { config.userContentController() };

    // SAFETY: called on the main thread per this function's contract.
    let handler = unsafe { new_bridge_handler(mtm) };
    let channel = NSString::from_str(MESSAGE_CHANNEL);
    // SAFETY: handler conforms to WKScriptMessageHandler; controller is valid.
    unsafe {
        let _: () = msg_send![&controller, addScriptMessageHandler: &*handler, name: &*channel];
    }

    let source = NSString::from_str(&bridge::bootstrap_script(global, &post_expression()));
    let user_script_class = objc2_web_kit::WKUserScript::class();
    // WKUserScriptInjectionTimeAtDocumentStart.
    let at_document_start: NSInteger = 0;

    // SAFETY: standard alloc + init with arguments matching the
    // initWithSource:injectionTime:forMainFrameOnly: signature.
    let script: *mut AnyObject = unsafe {
        let obj: *mut AnyObject = msg_send![user_script_class, alloc];
        msg_send![
            obj,
            initWithSource: &*source,
            injectionTime: at_document_start,
            forMainFrameOnly: false
        ]
    };
    assert!(!script.is_null(), "alloc+init returned nil");
    // SAFETY: alloc+init returned a +1 retained, non-null object.
    let script = unsafe { Retained::from_raw(script) }.unwrap();

    // SAFETY: script is a valid WKUserScript; controller is valid.
    unsafe {
        let _: () = msg_send![&controller, addUserScript: &*script];
    }
}
