//! PDF output through `genpdf`.

mod elements;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::{Error as GenpdfError, ErrorKind};
use genpdf::style::{self, Color, Style};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position, Size};
use log::debug;

#[cfg(feature = "hyphenation")]
use hyphenation::Standard;

use crate::error::Result;
use crate::fonts;
use crate::model::{self, Document, HeadingLevel};
use crate::serialize::{OutputFormat, Serializer};

use self::elements::{mm_from_f64, BlockElement, PageAnchor, RunFonts};

pub use self::elements::OutlineEntry;

const FOOTER_HEIGHT_MM: f64 = 10.0;
const FOOTER_FONT_SIZE: u8 = 8;
const FOOTER_COLOR: Color = Color::Rgb(0x66, 0x66, 0x66);

/// Lays documents out as PDF pages.
///
/// Page size and margins come from the document's [`PageSettings`](crate::model::PageSettings);
/// fonts are located through [`crate::fonts`].
#[derive(Default)]
pub struct PdfSerializer {
    page_numbers: bool,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<Standard>,
}

impl PdfSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints `Page N` centered at the bottom of every page.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Adds an outline entry for every level 1 heading.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// Enables hyphenation using the provided hyphenation dictionary.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Renders `document` and returns the PDF bytes together with the level 1 heading pages.
    pub fn render(&self, document: &Document) -> Result<(Vec<u8>, Vec<OutlineEntry>)> {
        let font_family = fonts::default_font_family()?;
        let mut pdf = genpdf::Document::new(font_family);
        let run_fonts = RunFonts {
            mono: fonts::monospace_font_family().map(|family| pdf.add_font_family(family)),
        };

        let page = document.page();
        pdf.set_title(document.title());
        pdf.set_font_size(document.styles().default_run.size);
        pdf.set_paper_size(Size::new(
            mm_from_f64(model::twips_to_mm(page.width)),
            mm_from_f64(model::twips_to_mm(page.height)),
        ));

        let current_page = Rc::new(Cell::new(0));
        let footer = self.page_numbers.then(|| PageFooter {
            height: mm_from_f64(FOOTER_HEIGHT_MM),
            style: Style::new()
                .with_font_size(FOOTER_FONT_SIZE)
                .with_color(FOOTER_COLOR),
        });
        pdf.set_page_decorator(PlanPageDecorator::new(
            Rc::clone(&current_page),
            margins(page),
            footer,
        ));

        #[cfg(feature = "hyphenation")]
        if let Some(hyphenator) = &self.hyphenator {
            pdf.set_hyphenator(hyphenator.clone());
        }

        let outline = Rc::new(RefCell::new(Vec::new()));
        let mut ordinals: HashMap<&str, usize> = HashMap::new();

        for block in document.blocks() {
            let ordinal = block.list().map(|membership| {
                let counter = ordinals.entry(membership.reference.as_str()).or_insert(0);
                *counter += 1;
                *counter
            });

            let mut element = BlockElement::new(document, block, &run_fonts, ordinal);
            if block.heading() == Some(HeadingLevel::One) {
                element = element.with_anchor(PageAnchor::new(
                    block.text(),
                    Rc::clone(&current_page),
                    Rc::clone(&outline),
                ));
            }
            pdf.push(element);
        }

        let mut bytes = Vec::new();
        pdf.render(&mut bytes)?;
        debug!(
            "Rendered {} blocks onto {} pages ({} bytes)",
            document.blocks().len(),
            current_page.get(),
            bytes.len()
        );

        let entries = outline.borrow().clone();
        Ok((bytes, entries))
    }
}

impl Serializer for PdfSerializer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn serialize(&self, document: &Document) -> Result<Vec<u8>> {
        let (bytes, _entries) = self.render(document)?;

        #[cfg(feature = "bookmarks")]
        if self.bookmarks {
            return Ok(crate::bookmarks::apply_outline(&bytes, &_entries)?);
        }

        Ok(bytes)
    }
}

fn margins(page: &model::PageSettings) -> Margins {
    let mm = |twips| mm_from_f64(model::twips_to_mm(twips));
    Margins::trbl(
        mm(page.margin_top),
        mm(page.margin_right),
        mm(page.margin_bottom),
        mm(page.margin_left),
    )
}

/// Footer printing the page number.
struct PageFooter {
    height: Mm,
    style: Style,
}

/// Applies the page margins, counts pages and prints the optional footer.
struct PlanPageDecorator {
    current_page: Rc<Cell<usize>>,
    margins: Margins,
    footer: Option<PageFooter>,
}

impl PlanPageDecorator {
    fn new(current_page: Rc<Cell<usize>>, margins: Margins, footer: Option<PageFooter>) -> Self {
        Self {
            current_page,
            margins,
            footer,
        }
    }
}

impl PageDecorator for PlanPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> std::result::Result<genpdf::render::Area<'a>, GenpdfError> {
        let page = self.current_page.get() + 1;
        self.current_page.set(page);

        area.add_margins(self.margins);

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(GenpdfError::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut line = Paragraph::new(format!("Page {}", page));
            line.set_alignment(Alignment::Center);
            let result = line.render(context, footer_area, style.and(footer.style))?;
            if result.has_more {
                return Err(GenpdfError::new(
                    "Footer does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}
