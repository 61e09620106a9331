//! Error types for webview operations.

/// Errors that can occur while attaching or managing a webview.
///
/// Per-request and per-message callbacks never produce these; they resolve
/// every failure into a response or a silent skip.
#[derive(Debug)]
pub enum WebViewError {
    /// The current platform is not supported.
    PlatformNotSupported,
    /// Webview creation failed.
    CreationFailed(String),
    /// A webview is already attached.
    AlreadyAttached,
    /// No webview is currently attached.
    NotAttached,
}

impl std::fmt::Display for WebViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformNotSupported => write!(f, "platform not supported"),
            Self::CreationFailed(msg) => write!(f, "webview creation failed: {msg}"),
            Self::AlreadyAttached => write!(f, "webview already attached"),
            Self::NotAttached => write!(f, "no webview attached"),
        }
    }
}

impl std::error::Error for WebViewError {}

/// Result type for webview operations.
pub type Result<T> = std::result::Result<T, WebViewError>;
