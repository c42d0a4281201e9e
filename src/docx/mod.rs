//! WordprocessingML (`.docx`) output and a matching reader.
//!
//! The package is assembled in memory: each part is rendered to a string by [`xml`] and stored in a
//! zip archive whose entries carry a fixed timestamp, so the same document always produces the
//! same bytes.

mod reader;
mod xml;

use std::io::{Cursor, Write};

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

use crate::error::Result;
use crate::model::Document;
use crate::serialize::{OutputFormat, Serializer};

pub use self::reader::{read_document, DecodedBlock, DecodedDocument, DecodedRun};

/// Writes documents as `.docx` packages.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocxSerializer;

impl DocxSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for DocxSerializer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn serialize(&self, document: &Document) -> Result<Vec<u8>> {
        xml::check_document(document)?;

        let parts = [
            (xml::CONTENT_TYPES_PART, xml::content_types()),
            (xml::PACKAGE_RELS_PART, xml::package_relationships()),
            (xml::CORE_PART, xml::core_properties(document.title())),
            (xml::DOCUMENT_PART, xml::document_body(document)),
            (xml::STYLES_PART, xml::styles(document)),
            (xml::NUMBERING_PART, xml::numbering(document)),
            (xml::DOCUMENT_RELS_PART, xml::document_relationships()),
        ];

        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in &parts {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        let bytes = zip.finish()?.into_inner();

        debug!(
            "Packed {} blocks into {} docx parts ({} bytes)",
            document.blocks().len(),
            parts.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::builder::DocumentBuilder;

    #[test]
    fn package_contains_every_part() {
        let document = DocumentBuilder::default().with_title("Plan").finalize();
        let bytes = DocxSerializer.serialize(&document).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "word/document.xml",
            "word/styles.xml",
            "word/numbering.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(archive.by_name(name).is_ok(), "missing part {}", name);
        }

        let mut core = String::new();
        archive
            .by_name("docProps/core.xml")
            .unwrap()
            .read_to_string(&mut core)
            .unwrap();
        assert!(core.contains("<dc:title>Plan</dc:title>"));
    }

    #[test]
    fn output_is_byte_for_byte_stable() {
        let mut builder = DocumentBuilder::default();
        let note = builder.blocks().note("stable");
        builder.append(note).unwrap();
        let document = builder.finalize();

        let first = DocxSerializer.serialize(&document).unwrap();
        let second = DocxSerializer.serialize(&document).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn refuses_text_xml_cannot_carry() {
        let mut builder = DocumentBuilder::default();
        let paragraph = builder.blocks().paragraph("a\u{1}b");
        builder.append(paragraph).unwrap();

        let err = DocxSerializer.serialize(&builder.finalize()).unwrap_err();
        assert!(matches!(err, crate::error::Error::UnsupportedCharacter('\u{1}')));
        assert_eq!(err.to_string(), "Character '\\u{1}' cannot be written to DOCX text");
    }
}
