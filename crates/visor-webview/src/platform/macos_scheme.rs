//! Custom URL scheme handler answering app requests from the bundle.
//!
//! Uses `ClassBuilder` with a fixed class name: one shell runs per process,
//! and the handler carries no per-instance state. Each `start` event pulls
//! the request URL, resolves it through the registered interceptor, and
//! answers with the decision's status, Content-Type and body. Tasks that
//! cannot be answered that way are completed with `didFailWithError:`, so
//! no load is ever left hanging. WebKit invokes
//! these methods from its own internal context, not the UI thread; the
//! interceptor is safe there and no UI work happens here.

use objc2::rc::Retained;
use objc2::runtime::{AnyClass, AnyObject, AnyProtocol, ClassBuilder, Sel};
use objc2::{msg_send, sel, AnyThread, ClassType, MainThreadMarker};
use objc2_foundation::{
    NSData, NSDictionary, NSError, NSHTTPURLResponse, NSInteger, NSObject, NSString, NSURL,
    NSURLRequest,
};

use visor_core::InterceptDecision;

use crate::registry;

/// Get or register the scheme handler ObjC class.
///
/// `ClassBuilder::new` returns `None` if the class already exists (a second
/// attach in the same process), in which case the existing class is reused.
///
/// Must be called from the main thread (class registration is not thread-safe).
fn scheme_handler_class() -> &'static AnyClass {
    let c_name = c"VisorSchemeHandler";

    if let Some(existing) = AnyClass::get(c_name) {
        return existing;
    }

    let superclass = NSObject::class();
    let mut builder = match ClassBuilder::new(c_name, superclass) {
        Some(b) => b,
        // Registered between the AnyClass::get check and this point.
        None => {
            return AnyClass::get(c_name)
                .expect("class must exist after ClassBuilder::new returned None");
        }
    };

    // Declare WKURLSchemeHandler protocol conformance.
    let proto = AnyProtocol::get(c"WKURLSchemeHandler")
        .expect("WKURLSchemeHandler protocol must be available");
    builder.add_protocol(proto);

    // SAFETY: the method signatures match the WKURLSchemeHandler protocol.
    // Raw pointers are used for the receiver to satisfy HRTB requirements.
    unsafe {
        builder.add_method(
            sel!(webView:startURLSchemeTask:),
            start_url_scheme_task
                as unsafe extern "C-unwind" fn(*mut AnyObject, Sel, *const AnyObject, *const AnyObject),
        );
        builder.add_method(
            sel!(webView:stopURLSchemeTask:),
            stop_url_scheme_task
                as unsafe extern "C-unwind" fn(*mut AnyObject, Sel, *const AnyObject, *const AnyObject),
        );
    }

    builder.register()
}

/// Allocate a scheme handler instance.
///
/// The returned object conforms to `WKURLSchemeHandler` and serves the
/// bundled application when WebKit intercepts a request under the app scheme.
/// The interceptor must already be registered via
/// [`registry::register_interceptor`].
///
/// # Safety
///
/// Must be called from the main thread.
pub unsafe fn new_scheme_handler(_mtm: MainThreadMarker) -> Retained<AnyObject> {
    let cls = scheme_handler_class();

    // SAFETY: standard ObjC alloc + init pattern on a class we just built.
    let obj: *mut AnyObject = unsafe { msg_send![cls, alloc] };
    // SAFETY: init on a freshly allocated object.
    let obj: *mut AnyObject = unsafe { msg_send![obj, init] };
    assert!(!obj.is_null(), "alloc+init returned nil");

    // SAFETY: alloc+init returned a +1 retained, non-null object.
    unsafe { Retained::from_raw(obj) }.unwrap()
}

/// `webView:startURLSchemeTask:` implementation.
unsafe extern "C-unwind" fn start_url_scheme_task(
    _this: *mut AnyObject,
    _cmd: Sel,
    _webview: *const AnyObject,
    task: *const AnyObject,
) {
    // SAFETY: WebKit provides a valid task pointer.
    let task: &AnyObject = unsafe { &*task };

    // SAFETY: task conforms to WKURLSchemeTask; request returns a valid object.
    let request: *const NSURLRequest = unsafe { msg_send![task, request] };
    // SAFETY: request is a valid NSURLRequest.
    let url_opt: Option<Retained<NSURL>> = unsafe { msg_send![request, URL] };
    let Some(url) = url_opt else {
        fail(task, "scheme task carries no URL");
        return;
    };

    // The full URL string: the interceptor does its own scheme/host check
    // and path parsing, so the raw form is what it wants.
    let Some(abs) = url.absoluteString() else {
        fail(task, "scheme task URL has no string form");
        return;
    };
    let url_string = abs.to_string();

    let Some(decision) = registry::intercept(&url_string) else {
        fail(task, &format!("no interceptor registered for {url_string}"));
        return;
    };

    match decision {
        // WebKit routes every request under the registered scheme here
        // regardless of host; a pass-through decision means the host did not
        // match. There is nothing to serve, but the task must still be
        // completed or the load hangs.
        InterceptDecision::NotMyScheme => {
            fail(task, &format!("scheme task outside app host: {url_string}"));
        }
        InterceptDecision::Served { body, mime } => {
            respond(task, &url_string, 200, &mime, &body);
        }
        InterceptDecision::NotFound { mime } => {
            respond(task, &url_string, 404, &mime, &[]);
        }
        InterceptDecision::ReadError { mime } => {
            respond(task, &url_string, 500, &mime, &[]);
        }
    }
}

/// `webView:stopURLSchemeTask:` implementation.
///
/// No-op: `start` is fully synchronous and never yields the run loop, so
/// `stop` can only be called after `didFinish` has already been sent.
unsafe extern "C-unwind" fn stop_url_scheme_task(
    _this: *mut AnyObject,
    _cmd: Sel,
    _webview: *const AnyObject,
    _task: *const AnyObject,
) {
}

/// Complete the task with an error. Every `start` path must end in either
/// `didFinish` or `didFailWithError:`; a task left unanswered hangs the load.
fn fail(task: &AnyObject, reason: &str) {
    log::warn!("failing scheme task: {reason}");

    let domain = NSString::from_str("VisorSchemeHandler");
    let no_user_info: *const AnyObject = std::ptr::null();
    // SAFETY: class method with a valid domain string; nil userInfo is allowed.
    let error: *mut AnyObject = unsafe {
        msg_send![
            NSError::class(),
            errorWithDomain: &*domain,
            code: 1 as NSInteger,
            userInfo: no_user_info
        ]
    };
    if error.is_null() {
        return;
    }

    // SAFETY: error is a valid NSError; task has received no other completion.
    unsafe {
        let _: () = msg_send![task, didFailWithError: &*error];
    }
}

/// Send an HTTP response back to the scheme task. The error statuses carry
/// an empty body but still complete the task, so the request never hangs.
fn respond(task: &AnyObject, url_string: &str, status: i32, mime: &str, body: &[u8]) {
    let Some(ns_url) = NSURL::URLWithString(&NSString::from_str(url_string)) else {
        fail(task, &format!("failed to construct response URL: {url_string}"));
        return;
    };

    let key = NSString::from_str("Content-Type");
    let val = NSString::from_str(mime);
    let headers: Retained<NSDictionary<NSString, NSString>> =
        NSDictionary::from_slices(&[&*key], &[&*val]);

    let Some(response) = NSHTTPURLResponse::initWithURL_statusCode_HTTPVersion_headerFields(
        NSHTTPURLResponse::alloc(),
        &ns_url,
        status as NSInteger,
        None,
        Some(&headers),
    ) else {
        fail(task, &format!("failed to construct HTTP response for: {url_string}"));
        return;
    };

    let ns_data = NSData::with_bytes(body);

    // SAFETY: response and data are valid; task has not been stopped.
    unsafe {
        let _: () = msg_send![task, didReceiveResponse: &*response];
        let _: () = msg_send![task, didReceiveData: &*ns_data];
        let _: () = msg_send![task, didFinish];
    }
}
