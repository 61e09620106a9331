//! Error types for core operations.

/// Errors from loading a MIME definition resource.
///
/// These never cross the interception boundary: [`MimeTypes::load_or_builtin`]
/// recovers from all of them by substituting the built-in table.
///
/// [`MimeTypes::load_or_builtin`]: crate::mime::MimeTypes::load_or_builtin
#[derive(Debug)]
pub enum MimeError {
    /// The definition resource could not be read.
    Io(std::io::Error),
    /// The definition resource parsed to zero entries.
    Empty,
}

impl std::fmt::Display for MimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "mime definitions unreadable: {err}"),
            Self::Empty => write!(f, "mime definitions contain no entries"),
        }
    }
}

impl std::error::Error for MimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Empty => None,
        }
    }
}

impl From<std::io::Error> for MimeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, MimeError>;
