//! Process-wide registration for the platform callbacks.
//!
//! The engine's scheme-handler and script-message classes are plain platform
//! objects with no good way to carry Rust generics, so the shell registers
//! its interceptor and bridge handler here once during startup and the
//! platform callbacks look them up per event. Registration is write-once;
//! later calls are ignored.

use std::sync::OnceLock;

use visor_core::{BridgeHandler, InterceptDecision, RequestContext};

/// Type-erased interception entry point.
pub type InterceptFn = dyn Fn(RequestContext<'_>) -> InterceptDecision + Send + Sync;

static GLOBAL_INTERCEPTOR: OnceLock<Box<InterceptFn>> = OnceLock::new();
static GLOBAL_BRIDGE: OnceLock<Box<dyn BridgeHandler>> = OnceLock::new();

/// Register the interception entry point. Called once during shell startup.
pub fn register_interceptor(intercept: Box<InterceptFn>) {
    GLOBAL_INTERCEPTOR.set(intercept).ok();
}

/// Resolve a request URL through the registered interceptor.
///
/// `None` when no interceptor has been registered yet; the scheme handler
/// treats that as an unanswerable event.
pub fn intercept(url: &str) -> Option<InterceptDecision> {
    let intercept = GLOBAL_INTERCEPTOR.get()?;
    Some(intercept(RequestContext::new(url)))
}

/// Register the bridge handler. Called once during shell startup.
pub fn register_bridge(handler: Box<dyn BridgeHandler>) {
    GLOBAL_BRIDGE.set(handler).ok();
}

/// The registered bridge handler, if any.
pub fn bridge() -> Option<&'static dyn BridgeHandler> {
    GLOBAL_BRIDGE.get().map(|handler| handler.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use visor_core::{EmbeddedAsset, EmbeddedAssets, Interceptor, MimeTypes, ShellConfig};

    struct NoopBridge;
    impl BridgeHandler for NoopBridge {}

    // OnceLock state is per-process, so registration and lookup are covered
    // by a single test.
    #[test]
    fn test_registration_round_trip() {
        assert!(intercept("app://dashboard/").is_none());
        assert!(bridge().is_none());

        static BUNDLE: &[EmbeddedAsset] = &[EmbeddedAsset {
            path: "web/index.html",
            data: b"<p>ok</p>",
        }];
        let config: &'static ShellConfig = Box::leak(Box::new(ShellConfig::default()));
        let mime_types: &'static MimeTypes = Box::leak(Box::new(MimeTypes::builtin()));
        let assets: &'static EmbeddedAssets = Box::leak(Box::new(EmbeddedAssets::new(BUNDLE)));
        let interceptor: &'static Interceptor<'static, EmbeddedAssets> =
            Box::leak(Box::new(Interceptor::new(config, mime_types, assets)));

        register_interceptor(Box::new(move |request| interceptor.intercept(request)));
        register_bridge(Box::new(NoopBridge));

        let decision = intercept("app://dashboard/").expect("interceptor registered");
        assert_eq!(decision.status(), Some(200));
        assert!(bridge().is_some());

        // Second registration is ignored, not an error.
        register_interceptor(Box::new(|_| InterceptDecision::NotMyScheme));
        let decision = intercept("app://dashboard/").expect("interceptor registered");
        assert_eq!(decision.status(), Some(200));
    }
}
