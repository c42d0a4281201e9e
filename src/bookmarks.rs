//! PDF outline (bookmark) injection built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use thiserror::Error;

use crate::pdf::OutlineEntry;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed or saved by `lopdf`.
    #[error("Failed to parse PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// Writing the updated document failed.
    #[error("Failed to write PDF bytes: {0}")]
    Io(#[from] std::io::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A heading refers to a page the rendered document does not have.
    #[error("Heading '{title}' refers to missing page {page}")]
    MissingPage { title: String, page: usize },
}

/// Adds a flat `/Outlines` tree with one `/Dest [page /Fit]` entry per heading.
///
/// Returns the input unchanged when `entries` is empty.
pub fn apply_outline(pdf_bytes: &[u8], entries: &[OutlineEntry]) -> Result<Vec<u8>, BookmarkError> {
    if entries.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let items = resolve_items(&mut document, entries, &pages)?;

    let outlines_id = document.new_object_id();
    link_items(outlines_id, &mut document, &items);
    insert_outlines_root(outlines_id, &mut document, &items)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineItem {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn resolve_items(
    document: &mut Document,
    entries: &[OutlineEntry],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineItem>, BookmarkError> {
    entries
        .iter()
        .map(|entry| {
            let page_ref = u32::try_from(entry.page)
                .ok()
                .and_then(|page| pages.get(&page).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: entry.title.clone(),
                    page: entry.page,
                })?;

            Ok(OutlineItem {
                object_id: document.new_object_id(),
                page_ref,
                title: entry.title.clone(),
            })
        })
        .collect()
}

/// Encodes an outline title as a PDF text string.
///
/// ASCII titles are written as literals; anything else as UTF-16BE with a byte order mark.
fn text_string(title: &str) -> Object {
    if title.is_ascii() {
        return Object::string_literal(title);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in title.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn link_items(outlines_id: ObjectId, document: &mut Document, items: &[OutlineItem]) {
    for (index, item) in items.iter().enumerate() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", text_string(&item.title));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(item.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(items[index - 1].object_id));
        }
        if let Some(next) = items.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }

        document
            .objects
            .insert(item.object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    items: &[OutlineItem],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(items.len() as i64));
    if let Some(first) = items.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = items.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_titles_stay_literal() {
        assert!(matches!(
            text_string("Phase 0"),
            Object::String(bytes, StringFormat::Literal) if bytes == b"Phase 0"
        ));
    }

    #[test]
    fn other_titles_use_utf16_with_bom() {
        let Object::String(bytes, _) = text_string("A—é") else {
            panic!("title should be a string object");
        };
        assert_eq!(bytes, [0xFE, 0xFF, 0x00, 0x41, 0x20, 0x14, 0x00, 0xE9]);
    }
}
