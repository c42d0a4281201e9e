//! `genpdf` element that lays out one [`Block`].
//!
//! The upstream crate has no notion of paragraph borders, hanging list markers or spacing before
//! and after a paragraph, so [`BlockElement`] wraps a [`Paragraph`] and draws those itself.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::Error;
use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Margins, Mm, Position, RenderResult, Size};

use crate::model::{self, Block, Border, Document, RunStyle};
use crate::theme::Rgb;

/// Approximate width of a single stroke drawn by `Area::draw_line`.
const STROKE_MM: f64 = 0.35;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_from_twips(twips: u32) -> Mm {
    mm_from_f64(model::twips_to_mm(twips))
}

fn min_mm(a: Mm, b: Mm) -> Mm {
    if a < b {
        a
    } else {
        b
    }
}

pub(crate) fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Font families available to run styles.
#[derive(Clone, Debug, Default)]
pub(crate) struct RunFonts {
    pub mono: Option<FontFamily<Font>>,
}

impl RunFonts {
    pub fn style(&self, resolved: &RunStyle) -> Style {
        let mut style = Style::new().with_font_size(resolved.size);
        if resolved.bold {
            style.set_bold();
        }
        if resolved.italic {
            style.set_italic();
        }
        if let Some(rgb) = resolved.color {
            style.set_color(color(rgb));
        }
        if resolved.monospace {
            if let Some(mono) = &self.mono {
                style.set_font_family(mono.clone());
            }
        }
        style
    }
}

/// Level 1 heading recorded for the PDF outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    /// 1-based page number the heading was placed on.
    pub page: usize,
}

/// Records the page a heading lands on the first time its text is rendered.
pub(crate) struct PageAnchor {
    title: String,
    current_page: Rc<Cell<usize>>,
    entries: Rc<RefCell<Vec<OutlineEntry>>>,
}

impl PageAnchor {
    pub fn new(
        title: String,
        current_page: Rc<Cell<usize>>,
        entries: Rc<RefCell<Vec<OutlineEntry>>>,
    ) -> Self {
        Self {
            title,
            current_page,
            entries,
        }
    }

    fn record(self) {
        self.entries.borrow_mut().push(OutlineEntry {
            title: self.title,
            page: self.current_page.get(),
        });
    }
}

struct Rule {
    width: Mm,
    space: Mm,
    color: Color,
}

impl From<Border> for Rule {
    fn from(border: Border) -> Self {
        Self {
            width: mm_from_f64(border.width_mm().max(STROKE_MM)),
            space: mm_from_f64(border.space_mm()),
            color: color(border.color),
        }
    }
}

impl Rule {
    fn strokes(&self) -> usize {
        let width: printpdf::Mm = self.width.into();
        (width.0 / STROKE_MM).ceil().max(1.0) as usize
    }

    fn draw_vertical(&self, area: &render::Area<'_>, height: Mm) {
        let style = Style::new().with_color(self.color);
        for stroke in 0..self.strokes() {
            let x = mm_from_f64(STROKE_MM * stroke as f64);
            area.draw_line(
                vec![Position::new(x, Mm::default()), Position::new(x, height)],
                style,
            );
        }
    }

    fn draw_horizontal(&self, area: &render::Area<'_>, y: Mm) {
        let style = Style::new().with_color(self.color);
        let width = area.size().width;
        for stroke in 0..self.strokes() {
            let y = y + mm_from_f64(STROKE_MM * stroke as f64);
            area.draw_line(
                vec![Position::new(Mm::default(), y), Position::new(width, y)],
                style,
            );
        }
    }
}

/// List marker printed in the hanging indent of the first line.
struct Marker {
    text: StyledString,
    hanging: Mm,
}

/// Renders one block: spacing, indent, marker, borders and the styled runs.
pub(crate) struct BlockElement {
    paragraph: Option<Paragraph>,
    marker: Option<Marker>,
    spacing_before: Mm,
    spacing_after: Mm,
    indent: Mm,
    left_border: Option<Rule>,
    bottom_border: Option<Rule>,
    anchor: Option<PageAnchor>,
    started: bool,
}

impl BlockElement {
    /// Builds the element for `block`.  `ordinal` is the 1-based position of the block in its
    /// list, if it belongs to one.
    pub fn new(document: &Document, block: &Block, fonts: &RunFonts, ordinal: Option<usize>) -> Self {
        let styles = document.styles();
        let mut indent = mm_from_twips(block.indent_left());
        let mut marker = None;

        let paragraph = if block.runs().is_empty() {
            None
        } else {
            let mut paragraph = Paragraph::default();
            for run in block.runs() {
                if run.text().is_empty() {
                    continue;
                }
                let resolved = styles.resolve(block.heading(), run);
                paragraph.push_styled(run.text().to_string(), fonts.style(&resolved));
            }
            paragraph.set_alignment(alignment(block.alignment()));
            Some(paragraph)
        };

        if let Some(membership) = block.list() {
            match document.list(&membership.reference) {
                Some((_, list)) => {
                    let hanging = mm_from_twips(list.hanging);
                    indent = mm_from_twips(list.indent_left.saturating_sub(list.hanging));
                    let marker_style = block
                        .runs()
                        .first()
                        .map(|run| fonts.style(&styles.resolve(block.heading(), run)))
                        .unwrap_or_else(|| fonts.style(&styles.default_run));
                    marker = Some(Marker {
                        text: StyledString::new(list.marker(ordinal.unwrap_or(1)), marker_style),
                        hanging,
                    });
                }
                None => log::warn!(
                    "Block references undefined list '{}'; rendering without marker",
                    membership.reference
                ),
            }
        }

        Self {
            paragraph,
            marker,
            spacing_before: mm_from_twips(block.spacing().before),
            spacing_after: mm_from_twips(block.spacing().after),
            indent,
            left_border: block.borders().left.map(Rule::from),
            bottom_border: block.borders().bottom.map(Rule::from),
            anchor: None,
            started: false,
        }
    }

    /// Records the page of this block into the document outline.
    pub fn with_anchor(mut self, anchor: PageAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

fn alignment(alignment: model::Alignment) -> genpdf::Alignment {
    match alignment {
        model::Alignment::Left | model::Alignment::Justified => genpdf::Alignment::Left,
        model::Alignment::Center => genpdf::Alignment::Center,
        model::Alignment::Right => genpdf::Alignment::Right,
    }
}

impl Element for BlockElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let mut consumed = Mm::default();

        if !self.started {
            let before = min_mm(self.spacing_before, area.size().height);
            area.add_offset(Position::new(Mm::default(), before));
            consumed += before;
            self.started = true;
        }

        area.add_margins(Margins::trbl(0, 0, 0, self.indent));

        let mut content_area = area.clone();
        if let Some(rule) = &self.left_border {
            content_area.add_margins(Margins::trbl(0, 0, 0, rule.width + rule.space));
        }
        if let Some(marker) = &self.marker {
            content_area.add_margins(Margins::trbl(0, 0, 0, marker.hanging));
        }

        let mut content_height = Mm::default();
        if let Some(paragraph) = self.paragraph.as_mut() {
            let inner = paragraph.render(context, content_area, style)?;
            content_height = inner.size.height;
            result.has_more = inner.has_more;

            if content_height > Mm::default() {
                if let Some(marker) = self.marker.take() {
                    let mut marker_area = area.clone();
                    if let Some(rule) = &self.left_border {
                        marker_area.add_margins(Margins::trbl(0, 0, 0, rule.width + rule.space));
                    }
                    let marker_style = style.and(marker.text.style);
                    marker_area.print_str(
                        &context.font_cache,
                        Position::new(0, 0),
                        marker_style,
                        &marker.text.s,
                    )?;
                }
                if let Some(anchor) = self.anchor.take() {
                    anchor.record();
                }
            }
        }

        if let Some(rule) = &self.left_border {
            if content_height > Mm::default() {
                rule.draw_vertical(&area, content_height);
            }
        }
        consumed += content_height;

        if result.has_more {
            result.size = Size::new(area.size().width, consumed);
            return Ok(result);
        }
        self.paragraph = None;

        let mut used = content_height;
        if let Some(rule) = &self.bottom_border {
            let y = content_height + rule.space;
            if y + rule.width > area.size().height {
                // Only the rule is left; it opens the next page.
                result.has_more = true;
                result.size = Size::new(area.size().width, consumed);
                return Ok(result);
            }
            rule.draw_horizontal(&area, y);
            used += rule.space + rule.width;
        }
        consumed += used - content_height;

        let remaining = area.size().height - used;
        if remaining > Mm::default() {
            consumed += min_mm(self.spacing_after, remaining);
        }
        result.size = Size::new(area.size().width, consumed);
        Ok(result)
    }
}
