//! MIME type resolution for bundled web assets.
//!
//! The table is built once at startup, either from a properties-style
//! definition resource or from a built-in minimal set, and is never mutated
//! afterward. Lookup is total: every input path resolves to some type.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{MimeError, Result};

/// Type returned when an extension has no table entry or the path has none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// The minimal fallback set: markup, styles, scripts, JSON, common images
/// and web fonts. Used when no definition resource can be loaded.
const BUILTIN: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("mjs", "text/javascript"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("wasm", "application/wasm"),
];

/// Immutable mapping from lowercase file extension (no leading dot) to
/// MIME type.
///
/// No interior mutability; a shared reference is safe to use from any
/// thread, including the engine's request-delivery context.
#[derive(Debug)]
pub struct MimeTypes {
    types: HashMap<String, String>,
}

impl MimeTypes {
    /// Build the built-in minimal table.
    pub fn builtin() -> Self {
        let types = BUILTIN
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        Self { types }
    }

    /// Parse a properties-style definition: one `extension=type` pair per
    /// line, `#`/`!` comment lines, blank lines ignored. Keys are lowercased;
    /// a later duplicate wins.
    pub fn from_definition(definition: &str) -> Result<Self> {
        let mut types = HashMap::new();
        for line in definition.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            types.insert(key, value.to_string());
        }
        if types.is_empty() {
            return Err(MimeError::Empty);
        }
        Ok(Self { types })
    }

    /// Load a definition resource from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let definition = fs::read_to_string(path)?;
        Self::from_definition(&definition)
    }

    /// Startup entry point: load the definition resource when a path is
    /// given, falling back to the built-in table on any failure. The failure
    /// is logged and otherwise swallowed; the returned table is never empty.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(types) => types,
            Err(err) => {
                log::warn!(
                    "failed to load mime definitions from {}: {err}; using built-in set",
                    path.display()
                );
                Self::builtin()
            }
        }
    }

    /// Resolve the MIME type for a file path from its extension.
    ///
    /// Matching is case-insensitive. Paths without a `.`, with a trailing
    /// dot, or with an unknown extension all resolve to
    /// [`DEFAULT_MIME_TYPE`]. Never fails.
    pub fn mime_type(&self, path: &str) -> &str {
        let Some((_, extension)) = path.rsplit_once('.') else {
            return DEFAULT_MIME_TYPE;
        };
        self.types
            .get(&extension.to_lowercase())
            .map(String::as_str)
            .unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// Number of extensions in the table.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the table has no entries. Construction guarantees this is
    /// never true for tables obtained through the public constructors.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
