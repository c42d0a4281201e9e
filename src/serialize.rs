//! The serializer seam and the final write to storage.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::error::{Error, Result};
use crate::model::Document;

/// Output container formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Docx,
}

impl OutputFormat {
    /// Infers the format from the file extension of `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension
            .parse()
            .map_err(|_| Error::UnsupportedFormat(path.display().to_string()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" => Ok(OutputFormat::Docx),
            _ => Err(Error::UnsupportedFormat(value.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Converts a finalized document into the bytes of one output container.
pub trait Serializer {
    /// The container format produced by this serializer.
    fn format(&self) -> OutputFormat;

    /// Encodes the whole document in memory.
    fn serialize(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Serializes `document` and writes it to `path` in a single write.
///
/// Nothing touches the file system unless serialization succeeds.  Returns the number of bytes
/// written.
pub fn write_document<S>(document: &Document, serializer: &S, path: impl AsRef<Path>) -> Result<usize>
where
    S: Serializer + ?Sized,
{
    let path = path.as_ref();
    let bytes = serializer.serialize(document)?;
    fs::write(path, &bytes)?;
    info!(
        "Wrote {} document to {} ({} bytes)",
        serializer.format(),
        path.display(),
        bytes.len()
    );
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DocumentBuilder;

    struct FailingSerializer;

    impl Serializer for FailingSerializer {
        fn format(&self) -> OutputFormat {
            OutputFormat::Pdf
        }

        fn serialize(&self, _document: &Document) -> Result<Vec<u8>> {
            Err(Error::Decode("boom".to_string()))
        }
    }

    #[test]
    fn infers_format_from_extension() {
        assert_eq!(OutputFormat::from_path("plan.PDF").unwrap(), OutputFormat::Pdf);
        assert_eq!(OutputFormat::from_path("out/plan.docx").unwrap(), OutputFormat::Docx);
        assert!(matches!(
            OutputFormat::from_path("plan.odt"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path("plan").is_err());
    }

    #[test]
    fn failed_serialization_writes_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("plan.pdf");
        let document = DocumentBuilder::default().finalize();

        let result = write_document(&document, &FailingSerializer, &path);
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
