//! Custom-scheme request interception.
//!
//! The engine calls [`Interceptor::intercept`] for every outgoing request.
//! Requests outside the application's `scheme://host` pass through to the
//! engine's normal handling; everything under it is answered from the bundle,
//! either with the asset bytes or with an HTTP-style error. Once the prefix
//! matches the decision is always an intercepted response, so the embedded
//! page can never fall through to a real network fetch for its own scheme.

use std::io::Read;

use percent_encoding::percent_decode_str;

use crate::assets::AssetSource;
use crate::config::ShellConfig;
use crate::mime::MimeTypes;

/// One inbound request as seen at the interception hook.
///
/// Borrows the engine-provided URL for the duration of a single intercept
/// call; never retained.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    url: &'a str,
}

impl<'a> RequestContext<'a> {
    /// Wrap a request URL.
    pub fn new(url: &'a str) -> Self {
        Self { url }
    }

    /// The request's full URL string.
    pub fn url(&self) -> &'a str {
        self.url
    }
}

/// Outcome of intercepting one request.
#[derive(Debug, PartialEq, Eq)]
pub enum InterceptDecision {
    /// The URL is outside the application scheme; the engine handles it
    /// through its normal path.
    NotMyScheme,
    /// Asset found and read: status 200 with body and Content-Type.
    Served { body: Vec<u8>, mime: String },
    /// No such bundled asset: status 404, empty body.
    NotFound { mime: String },
    /// Asset exists but could not be fully read: status 500, empty body.
    ReadError { mime: String },
}

impl InterceptDecision {
    /// HTTP status for the intercepted branches; `None` for pass-through.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotMyScheme => None,
            Self::Served { .. } => Some(200),
            Self::NotFound { .. } => Some(404),
            Self::ReadError { .. } => Some(500),
        }
    }

    /// Content-Type for the intercepted branches; `None` for pass-through.
    pub fn mime(&self) -> Option<&str> {
        match self {
            Self::NotMyScheme => None,
            Self::Served { mime, .. } | Self::NotFound { mime } | Self::ReadError { mime } => {
                Some(mime)
            }
        }
    }

    /// Response body. Empty for the error branches.
    pub fn body(&self) -> &[u8] {
        match self {
            Self::Served { body, .. } => body,
            _ => &[],
        }
    }
}

/// Maps requests under the application scheme to bundled assets.
///
/// All fields are immutable after construction; a shared reference can be
/// used concurrently from the engine's worker context without coordination.
/// Constructed once at engine setup and kept for the process lifetime.
pub struct Interceptor<'a, S: AssetSource> {
    prefix: String,
    content_root: &'a str,
    entry_document: &'a str,
    mime_types: &'a MimeTypes,
    assets: &'a S,
}

impl<'a, S: AssetSource> Interceptor<'a, S> {
    /// Build an interceptor for the configured scheme and host, resolving
    /// against `assets` and `mime_types`.
    pub fn new(config: &'a ShellConfig, mime_types: &'a MimeTypes, assets: &'a S) -> Self {
        Self {
            prefix: format!("{}://{}", config.scheme, config.host),
            content_root: config.content_root,
            entry_document: config.entry_document,
            mime_types,
            assets,
        }
    }

    /// Resolve one request. Always returns synchronously, exactly once,
    /// and never panics or errors across this boundary.
    pub fn intercept(&self, request: RequestContext<'_>) -> InterceptDecision {
        let Some(rest) = request.url().strip_prefix(&self.prefix) else {
            return InterceptDecision::NotMyScheme;
        };
        // The host must end exactly where the prefix does; a longer host
        // such as "dashboardx" is a different origin.
        if !rest.is_empty() && !rest.starts_with(['/', '?', '#']) {
            return InterceptDecision::NotMyScheme;
        }

        // Path component: cut query and fragment, then percent-decode. An
        // undecodable path is used verbatim and simply misses the store.
        let raw_path = rest.split(['?', '#']).next().unwrap_or("");
        let path = match percent_decode_str(raw_path).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw_path.to_string(),
        };

        // SPA fallback: only the exact root is rewritten to the entry
        // document. Directory-like paths such as "/assets/" are looked up
        // verbatim and 404 when absent.
        let file_name = if path == "/" {
            self.entry_document.to_string()
        } else {
            path
        };

        self.load_asset(&file_name)
    }

    /// Load a bundled asset and build the matching decision. The Content-Type
    /// is resolved from `file_name` on every branch, including the errors.
    fn load_asset(&self, file_name: &str) -> InterceptDecision {
        let resource_path = format!("{}{}", self.content_root, file_name);
        let mime = self.mime_types.mime_type(file_name).to_string();

        match self.assets.open(&resource_path) {
            None => {
                log::warn!("asset not found: {resource_path}");
                InterceptDecision::NotFound { mime }
            }
            Some(mut stream) => {
                // Stream is scoped to this arm and dropped on both exits.
                let mut body = Vec::new();
                match stream.read_to_end(&mut body) {
                    Ok(_) => InterceptDecision::Served { body, mime },
                    Err(err) => {
                        log::warn!("failed to read asset {resource_path}: {err}");
                        InterceptDecision::ReadError { mime }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::assets::{EmbeddedAsset, EmbeddedAssets};
    use crate::mime::DEFAULT_MIME_TYPE;

    static BUNDLE: &[EmbeddedAsset] = &[
        EmbeddedAsset {
            path: "web/index.html",
            data: b"<p>hello</p>",
        },
        EmbeddedAsset {
            path: "web/app.js",
            data: b"export {}",
        },
        EmbeddedAsset {
            path: "web/a b.txt",
            data: b"spaced",
        },
    ];

    fn config() -> ShellConfig {
        ShellConfig::default()
    }

    fn intercept(url: &str) -> InterceptDecision {
        let config = config();
        let mime_types = MimeTypes::builtin();
        let assets = EmbeddedAssets::new(BUNDLE);
        let interceptor = Interceptor::new(&config, &mime_types, &assets);
        interceptor.intercept(RequestContext::new(url))
    }

    /// Records how often the store is consulted.
    struct CountingSource(AtomicUsize);

    impl AssetSource for CountingSource {
        fn open(&self, _path: &str) -> Option<Box<dyn Read + '_>> {
            self.0.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Always opens, always fails mid-read.
    struct BrokenSource;

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    impl AssetSource for BrokenSource {
        fn open(&self, _path: &str) -> Option<Box<dyn Read + '_>> {
            Some(Box::new(BrokenReader))
        }
    }

    #[test]
    fn test_foreign_scheme_passes_through_without_io() {
        let config = config();
        let mime_types = MimeTypes::builtin();
        let source = CountingSource(AtomicUsize::new(0));
        let interceptor = Interceptor::new(&config, &mime_types, &source);

        let decision = interceptor.intercept(RequestContext::new("https://example.com/x"));
        assert_eq!(decision, InterceptDecision::NotMyScheme);
        assert_eq!(decision.status(), None);
        assert_eq!(source.0.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_longer_host_is_not_intercepted() {
        let config = config();
        let mime_types = MimeTypes::builtin();
        let source = CountingSource(AtomicUsize::new(0));
        let interceptor = Interceptor::new(&config, &mime_types, &source);

        for url in [
            "app://dashboardx/a",
            "app://dashboard.evil/index.html",
            "app://dashboardindex.html",
        ] {
            let decision = interceptor.intercept(RequestContext::new(url));
            assert_eq!(decision, InterceptDecision::NotMyScheme, "url: {url}");
        }
        assert_eq!(source.0.load(Ordering::Relaxed), 0);

        assert_eq!(
            interceptor
                .intercept(RequestContext::new("app://dashboard?x=1"))
                .status(),
            Some(404)
        );
    }

    #[test]
    fn test_root_resolves_entry_document() {
        let root = intercept("app://dashboard/");
        let explicit = intercept("app://dashboard/index.html");
        assert_eq!(root, explicit);
        assert_eq!(root.status(), Some(200));
        assert_eq!(root.mime(), Some("text/html"));
        assert_eq!(root.body(), b"<p>hello</p>");
    }

    #[test]
    fn test_served_body_is_byte_exact() {
        let decision = intercept("app://dashboard/app.js");
        assert_eq!(decision.status(), Some(200));
        assert_eq!(decision.mime(), Some("text/javascript"));
        assert_eq!(decision.body(), b"export {}");
    }

    #[test]
    fn test_missing_asset_is_not_found_with_mime() {
        let decision = intercept("app://dashboard/missing.file");
        assert_eq!(decision.status(), Some(404));
        // Content-Type reflects the requested name even on the error branch.
        assert_eq!(decision.mime(), Some(DEFAULT_MIME_TYPE));
        assert!(decision.body().is_empty());
    }

    #[test]
    fn test_directory_path_is_not_rewritten() {
        // Only the exact root gets the SPA fallback; "/assets/" is looked up
        // verbatim and misses.
        let decision = intercept("app://dashboard/assets/");
        assert_eq!(decision.status(), Some(404));
    }

    #[test]
    fn test_query_and_fragment_are_stripped() {
        let decision = intercept("app://dashboard/app.js?v=3#top");
        assert_eq!(decision.status(), Some(200));
        assert_eq!(decision.body(), b"export {}");
    }

    #[test]
    fn test_percent_encoded_path_is_decoded() {
        let decision = intercept("app://dashboard/a%20b.txt");
        assert_eq!(decision.status(), Some(200));
        assert_eq!(decision.body(), b"spaced");
    }

    #[test]
    fn test_read_failure_is_server_error() {
        let config = config();
        let mime_types = MimeTypes::builtin();
        let source = BrokenSource;
        let interceptor = Interceptor::new(&config, &mime_types, &source);

        let decision = interceptor.intercept(RequestContext::new("app://dashboard/app.js"));
        assert_eq!(decision.status(), Some(500));
        assert_eq!(decision.mime(), Some("text/javascript"));
        assert!(decision.body().is_empty());
    }

    #[test]
    fn test_dashboard_scenario() {
        // Bundle: /web/index.html (11 bytes), /web/styles.css (empty).
        static SCENARIO: &[EmbeddedAsset] = &[
            EmbeddedAsset {
                path: "web/index.html",
                data: b"hello world",
            },
            EmbeddedAsset {
                path: "web/styles.css",
                data: b"",
            },
        ];
        let config = config();
        let mime_types = MimeTypes::builtin();
        let assets = EmbeddedAssets::new(SCENARIO);
        let interceptor = Interceptor::new(&config, &mime_types, &assets);

        let root = interceptor.intercept(RequestContext::new("app://dashboard/"));
        assert_eq!(root.status(), Some(200));
        assert_eq!(root.mime(), Some("text/html"));
        assert_eq!(root.body().len(), 11);

        let css = interceptor.intercept(RequestContext::new("app://dashboard/styles.css"));
        assert_eq!(css.status(), Some(200));
        assert_eq!(css.mime(), Some("text/css"));
        assert!(css.body().is_empty());

        let icon = interceptor.intercept(RequestContext::new("app://dashboard/favicon.ico"));
        assert_eq!(icon.status(), Some(404));
        assert_eq!(icon.mime(), Some("image/vnd.microsoft.icon"));
    }
}
