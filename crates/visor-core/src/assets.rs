//! Bundled asset stores.
//!
//! [`AssetSource`] is the seam the interceptor reads through: an asset is
//! opened as a byte stream, drained within the same interception call, and
//! the stream is dropped on every exit path. `None` from [`AssetSource::open`]
//! means the asset is absent; a reader that fails mid-read means the asset
//! exists but cannot be served.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// A store of bundled assets addressable by slash-separated path.
///
/// Implementations must be safe to call from the engine's request-delivery
/// context; the interceptor performs no locking around them.
pub trait AssetSource: Send + Sync {
    /// Open the asset at `path` as a byte stream, or `None` if absent.
    ///
    /// A leading `/` in `path` is ignored; lookup keys are relative to the
    /// bundle root.
    fn open(&self, path: &str) -> Option<Box<dyn Read + '_>>;
}

/// A single file embedded at compile time.
#[derive(Debug)]
pub struct EmbeddedAsset {
    /// Relative path within the bundle (e.g. "web/index.html").
    pub path: &'static str,
    /// File contents.
    pub data: &'static [u8],
}

/// Collection of assets embedded at compile time via `include_bytes!`.
///
/// Reads from this store never fail; only absence is observable.
#[derive(Debug)]
pub struct EmbeddedAssets {
    assets: &'static [EmbeddedAsset],
}

impl EmbeddedAssets {
    /// Create a new asset collection.
    pub const fn new(assets: &'static [EmbeddedAsset]) -> Self {
        Self { assets }
    }

    /// Look up a file by path (e.g. "web/index.html").
    pub fn get(&self, path: &str) -> Option<&'static [u8]> {
        self.assets.iter().find(|a| a.path == path).map(|a| a.data)
    }
}

impl AssetSource for EmbeddedAssets {
    fn open(&self, path: &str) -> Option<Box<dyn Read + '_>> {
        let key = path.strip_prefix('/').unwrap_or(path);
        self.get(key).map(|data| Box::new(data) as Box<dyn Read>)
    }
}

/// Filesystem-backed asset store rooted at a directory.
///
/// Used by dev builds and tests, where the web bundle sits on disk instead
/// of inside the binary. Paths containing anything but normal components
/// (`..`, absolute prefixes) resolve to absent.
#[derive(Debug)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Create a store serving files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn open(&self, path: &str) -> Option<Box<dyn Read + '_>> {
        let key = path.strip_prefix('/').unwrap_or(path);
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        let file = File::open(self.root.join(relative)).ok()?;
        Some(Box::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FILES: &[EmbeddedAsset] = &[
        EmbeddedAsset {
            path: "web/index.html",
            data: b"<p>hi</p>",
        },
        EmbeddedAsset {
            path: "web/app.js",
            data: b"console.log(1)",
        },
    ];

    #[test]
    fn test_embedded_lookup() {
        let assets = EmbeddedAssets::new(FILES);
        assert_eq!(assets.get("web/index.html"), Some(b"<p>hi</p>" as &[u8]));
        assert!(assets.get("web/missing.css").is_none());
    }

    #[test]
    fn test_embedded_open_ignores_leading_slash() {
        let assets = EmbeddedAssets::new(FILES);
        let mut body = Vec::new();
        let mut reader = assets.open("/web/app.js").unwrap();
        reader.read_to_end(&mut body).unwrap();
        assert_eq!(body, b"console.log(1)");
    }

    #[test]
    fn test_dir_assets_reject_traversal() {
        let assets = DirAssets::new(std::env::temp_dir());
        assert!(assets.open("../etc/passwd").is_none());
        assert!(assets.open("/a/../../b").is_none());
    }
}
