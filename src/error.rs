//! Error types for plan_doc.

use std::io;

use thiserror::Error;

/// Result type alias for plan_doc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, loading or serializing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// A task status string outside of `done`, `todo` and `skip`.
    #[error("Unknown task status `{0}` (expected done, todo or skip)")]
    UnknownStatus(String),

    /// A heading level outside of 1..=3.
    #[error("Invalid heading level {0} (expected 1, 2 or 3)")]
    InvalidHeadingLevel(u8),

    /// A color that is not a `RRGGBB` hexadecimal value.
    #[error("Invalid color `{0}`; use six hexadecimal digits such as `#1E3A5F`")]
    InvalidColor(String),

    /// A color name that is not part of the theme palette.
    #[error("Unknown palette color `{0}`")]
    UnknownColor(String),

    /// A theme whose values break the layout invariants.
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    /// Attempt to append to a builder that has already been finalized.
    #[error("Document is frozen; blocks cannot be appended after finalize")]
    Frozen,

    /// The output format could not be determined.
    #[error("Unsupported output format `{0}` (expected pdf or docx)")]
    UnsupportedFormat(String),

    /// An outline or theme file is not valid TOML for its schema.
    #[error("Failed to parse TOML: {0}")]
    Outline(#[from] toml::de::Error),

    /// Layout or font failure reported by `genpdf`.
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// The DOCX container could not be written or opened.
    #[error("DOCX container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Text containing a character that XML 1.0 cannot represent.
    #[error("Character {0:?} cannot be written to DOCX text")]
    UnsupportedCharacter(char),

    /// The DOCX package was readable but its content was not.
    #[error("DOCX decoding error: {0}")]
    Decode(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bookmarks could not be embedded into the rendered PDF.
    #[cfg(feature = "bookmarks")]
    #[error("Failed to embed bookmarks: {0}")]
    Bookmarks(#[from] crate::bookmarks::BookmarkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::UnknownStatus("doing".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown task status `doing` (expected done, todo or skip)"
        );

        let err = Error::InvalidHeadingLevel(4);
        assert_eq!(err.to_string(), "Invalid heading level 4 (expected 1, 2 or 3)");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
