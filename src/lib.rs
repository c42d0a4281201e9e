//! Core entry point for the plan_doc crate.
//!
//! Documents are described as an ordered list of [`model::Block`] values produced by the
//! [`blocks::Blocks`] vocabulary, frozen by [`builder::DocumentBuilder::finalize`] and handed to a
//! [`serialize::Serializer`] (PDF through `genpdf`, or a DOCX package).

pub mod blocks;
pub mod builder;
pub mod docx;
pub mod error;
pub mod fonts;
pub mod model;
pub mod outline;
pub mod pdf;
pub mod serialize;
pub mod summary;
pub mod theme;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::DocumentBuilder;
pub use error::{Error, Result};
pub use model::{Block, Document};
pub use serialize::{write_document, OutputFormat, Serializer};
pub use theme::Theme;
