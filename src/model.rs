//! Data structures describing the logical content of a document.
//!
//! The types in this module are renderer-neutral value objects.  Measurements follow the
//! WordprocessingML conventions the documents were first authored in: spacing and indents are in
//! twips (1/20 pt), border widths in eighths of a point and run sizes in whole points.  The PDF
//! serializer converts them to millimetres when laying the blocks out.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::theme::{Rgb, Theme};

/// Twips per inch.
pub const TWIPS_PER_INCH: u32 = 1440;

const MM_PER_INCH: f64 = 25.4;
const MM_PER_POINT: f64 = MM_PER_INCH / 72.0;

/// Converts twips to millimetres.
pub fn twips_to_mm(twips: u32) -> f64 {
    f64::from(twips) * MM_PER_INCH / f64::from(TWIPS_PER_INCH)
}

/// Converts points to millimetres.
pub fn points_to_mm(points: f64) -> f64 {
    points * MM_PER_POINT
}

/// Heading levels supported by the style sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

impl HeadingLevel {
    /// All levels from the largest to the smallest.
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::One, HeadingLevel::Two, HeadingLevel::Three];

    /// Returns the numeric level (1-based).
    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::One => 1,
            HeadingLevel::Two => 2,
            HeadingLevel::Three => 3,
        }
    }

    /// Identifier of the matching paragraph style, e.g. `Heading1`.
    pub fn style_id(self) -> String {
        format!("Heading{}", self.number())
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            1 => Ok(HeadingLevel::One),
            2 => Ok(HeadingLevel::Two),
            3 => Ok(HeadingLevel::Three),
            other => Err(Error::InvalidHeadingLevel(other)),
        }
    }
}

/// Progress marker attached to task blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskStatus {
    Done,
    Todo,
    Skip,
}

impl TaskStatus {
    /// The bracketed label text, e.g. `DONE`.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Done => "DONE",
            TaskStatus::Todo => "TODO",
            TaskStatus::Skip => "SKIP",
        }
    }

    /// The label color taken from the theme palette.
    pub fn color(self, theme: &Theme) -> Rgb {
        match self {
            TaskStatus::Done => theme.palette.success,
            TaskStatus::Todo => theme.palette.primary,
            TaskStatus::Skip => theme.palette.danger,
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "done" => Ok(TaskStatus::Done),
            "todo" => Ok(TaskStatus::Todo),
            "skip" => Ok(TaskStatus::Skip),
            other => Err(Error::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Atomic styled text.
///
/// Attributes left unset fall back to the [`StyleSheet`] when the block is rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextRun {
    text: String,
    bold: bool,
    italic: bool,
    size: Option<u8>,
    color: Option<Rgb>,
    font: Option<String>,
    monospace: bool,
}

impl TextRun {
    /// Creates a run with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Font size in points, if overridden.
    pub fn size(&self) -> Option<u8> {
        self.size
    }

    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    /// Font family name, if overridden.
    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }

    pub fn is_monospace(&self) -> bool {
        self.monospace
    }

    /// Marks the run as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the run as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Sets the font size in points.
    pub fn sized(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    /// Assigns a color to the run.
    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the font family name.
    pub fn in_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Renders the run with a fixed-width font named `font`.
    pub fn monospace(mut self, font: impl Into<String>) -> Self {
        self.monospace = true;
        self.font = Some(font.into());
        self
    }
}

/// Line style of a paragraph border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Thick,
}

impl BorderStyle {
    /// The WordprocessingML `w:val` keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            BorderStyle::Single => "single",
            BorderStyle::Thick => "thick",
        }
    }
}

/// One side of a paragraph border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Border {
    pub style: BorderStyle,
    /// Line width in eighths of a point.
    pub size: u8,
    pub color: Rgb,
    /// Distance between the line and the text, in points.
    pub space: u8,
}

impl Border {
    pub fn single(size: u8, color: Rgb, space: u8) -> Self {
        Self {
            style: BorderStyle::Single,
            size,
            color,
            space,
        }
    }

    pub fn thick(size: u8, color: Rgb, space: u8) -> Self {
        Self {
            style: BorderStyle::Thick,
            size,
            color,
            space,
        }
    }

    /// Line width in millimetres.
    pub fn width_mm(&self) -> f64 {
        points_to_mm(f64::from(self.size) / 8.0)
    }

    /// Gap between the line and the text in millimetres.
    pub fn space_mm(&self) -> f64 {
        points_to_mm(f64::from(self.space))
    }
}

/// Borders drawn around a block.  Only the sides the builders use are modelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Borders {
    pub left: Option<Border>,
    pub bottom: Option<Border>,
}

impl Borders {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.bottom.is_none()
    }
}

/// Vertical space around a block, in twips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

impl Spacing {
    pub const fn new(before: u32, after: u32) -> Self {
        Self { before, after }
    }
}

/// Horizontal alignment of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

impl Alignment {
    /// The WordprocessingML `w:jc` keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justified => "both",
        }
    }
}

/// Reference from a block to a [`ListDefinition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListMembership {
    pub reference: String,
    pub level: u8,
}

/// Semantic origin of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Heading(HeadingLevel),
    Paragraph,
    Lead,
    Bullet,
    Numbered,
    Task(TaskStatus),
    Milestone,
    Note,
    VersionBox,
    KeyValue,
    Legend,
    Centered,
    Spacer,
    Divider,
}

/// One styled, orderable unit of document content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    runs: Vec<TextRun>,
    heading: Option<HeadingLevel>,
    spacing: Spacing,
    indent_left: u32,
    borders: Borders,
    alignment: Alignment,
    list: Option<ListMembership>,
}

impl Block {
    /// Creates a left-aligned block without spacing, borders or list membership.
    pub fn new(kind: BlockKind, runs: impl Into<Vec<TextRun>>) -> Self {
        let heading = match kind {
            BlockKind::Heading(level) => Some(level),
            _ => None,
        };
        Self {
            kind,
            runs: runs.into(),
            heading,
            spacing: Spacing::default(),
            indent_left: 0,
            borders: Borders::default(),
            alignment: Alignment::Left,
            list: None,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn heading(&self) -> Option<HeadingLevel> {
        self.heading
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// Left indent in twips.
    pub fn indent_left(&self) -> u32 {
        self.indent_left
    }

    pub fn borders(&self) -> Borders {
        self.borders
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn list(&self) -> Option<&ListMembership> {
        self.list.as_ref()
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(TextRun::text).collect()
    }

    /// Sets the spacing (twips) and returns the updated block.
    pub fn with_spacing(mut self, before: u32, after: u32) -> Self {
        self.spacing = Spacing::new(before, after);
        self
    }

    /// Sets the left indent (twips) and returns the updated block.
    pub fn with_indent(mut self, indent_left: u32) -> Self {
        self.indent_left = indent_left;
        self
    }

    pub fn with_left_border(mut self, border: Border) -> Self {
        self.borders.left = Some(border);
        self
    }

    pub fn with_bottom_border(mut self, border: Border) -> Self {
        self.borders.bottom = Some(border);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Makes the block an item of the referenced list.
    pub fn in_list(mut self, reference: impl Into<String>, level: u8) -> Self {
        self.list = Some(ListMembership {
            reference: reference.into(),
            level,
        });
        self
    }
}

/// Marker format of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Bullet,
    Decimal,
}

impl ListFormat {
    /// The WordprocessingML `w:numFmt` keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ListFormat::Bullet => "bullet",
            ListFormat::Decimal => "decimal",
        }
    }
}

/// A named bullet or numbering style referenced by list member blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListDefinition {
    pub reference: String,
    pub format: ListFormat,
    /// Marker text; `%1` is replaced by the item number for decimal lists.
    pub text: String,
    /// Left indent of the item text, in twips.
    pub indent_left: u32,
    /// Hanging indent of the marker, in twips.
    pub hanging: u32,
}

impl ListDefinition {
    /// Reference name of the default bullet list.
    pub const BULLETS: &'static str = "bullets";
    /// Reference name of the default numbered list.
    pub const NUMBERS: &'static str = "numbers";

    pub fn bullets() -> Self {
        Self {
            reference: Self::BULLETS.to_string(),
            format: ListFormat::Bullet,
            text: "-".to_string(),
            indent_left: 720,
            hanging: 360,
        }
    }

    pub fn numbers() -> Self {
        Self {
            reference: Self::NUMBERS.to_string(),
            format: ListFormat::Decimal,
            text: "%1.".to_string(),
            indent_left: 720,
            hanging: 360,
        }
    }

    /// Marker for the item at the given (1-based) position.
    pub fn marker(&self, ordinal: usize) -> String {
        match self.format {
            ListFormat::Bullet => self.text.clone(),
            ListFormat::Decimal => self.text.replace("%1", &ordinal.to_string()),
        }
    }
}

/// Fully resolved character formatting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunStyle {
    pub font: String,
    pub size: u8,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
    pub monospace: bool,
}

/// Named paragraph style used as a fallback for heading blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParagraphStyle {
    pub id: String,
    pub name: String,
    pub level: HeadingLevel,
    pub run: RunStyle,
    pub spacing: Spacing,
}

/// Default run formatting plus the heading paragraph styles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleSheet {
    pub default_run: RunStyle,
    pub headings: Vec<ParagraphStyle>,
}

impl StyleSheet {
    /// Derives the style sheet from the theme.
    pub fn from_theme(theme: &Theme) -> Self {
        let default_run = RunStyle {
            font: theme.fonts.body.clone(),
            size: theme.sizes.body,
            bold: false,
            italic: false,
            color: None,
            monospace: false,
        };

        let headings = HeadingLevel::ALL
            .iter()
            .map(|&level| {
                let (size, color, spacing) = heading_metrics(theme, level);
                ParagraphStyle {
                    id: level.style_id(),
                    name: format!("Heading {}", level.number()),
                    level,
                    run: RunStyle {
                        size,
                        bold: true,
                        color: Some(color),
                        ..default_run.clone()
                    },
                    spacing,
                }
            })
            .collect();

        Self {
            default_run,
            headings,
        }
    }

    /// Returns the paragraph style of the given heading level.
    pub fn heading(&self, level: HeadingLevel) -> Option<&ParagraphStyle> {
        self.headings.iter().find(|style| style.level == level)
    }

    /// Resolves the effective formatting of `run` inside a block with the given heading level.
    pub fn resolve(&self, heading: Option<HeadingLevel>, run: &TextRun) -> RunStyle {
        let base = heading
            .and_then(|level| self.heading(level))
            .map(|style| &style.run)
            .unwrap_or(&self.default_run);

        RunStyle {
            font: run.font().unwrap_or(base.font.as_str()).to_string(),
            size: run.size().unwrap_or(base.size),
            bold: run.is_bold() || base.bold,
            italic: run.is_italic() || base.italic,
            color: run.color().or(base.color),
            monospace: run.is_monospace(),
        }
    }
}

/// Size, color and spacing of a heading level under the given theme.
pub(crate) fn heading_metrics(theme: &Theme, level: HeadingLevel) -> (u8, Rgb, Spacing) {
    match level {
        HeadingLevel::One => (theme.sizes.h1, theme.palette.primary, Spacing::new(400, 160)),
        HeadingLevel::Two => (theme.sizes.h2, theme.palette.accent, Spacing::new(280, 100)),
        HeadingLevel::Three => (theme.sizes.h3, theme.palette.primary, Spacing::new(200, 80)),
    }
}

/// Page geometry in twips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSettings {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
}

impl PageSettings {
    /// US Letter with one-inch margins.
    pub fn letter() -> Self {
        Self {
            width: 12240,
            height: 15840,
            margin_top: TWIPS_PER_INCH,
            margin_right: TWIPS_PER_INCH,
            margin_bottom: TWIPS_PER_INCH,
            margin_left: TWIPS_PER_INCH,
        }
    }

    /// A4 with one-inch margins.
    pub fn a4() -> Self {
        Self {
            width: 11906,
            height: 16838,
            ..Self::letter()
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self::letter()
    }
}

/// Finalized document: global settings plus the ordered block sequence.
///
/// Values of this type are produced by
/// [`DocumentBuilder::finalize`](crate::builder::DocumentBuilder::finalize) and expose read-only
/// accessors only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) title: String,
    pub(crate) page: PageSettings,
    pub(crate) styles: StyleSheet,
    pub(crate) lists: Vec<ListDefinition>,
    pub(crate) blocks: Vec<Block>,
}

impl Document {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page(&self) -> &PageSettings {
        &self.page
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn lists(&self) -> &[ListDefinition] {
        &self.lists
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Looks up a list definition and its position (0-based) in the definition table.
    pub fn list(&self, reference: &str) -> Option<(usize, &ListDefinition)> {
        self.lists
            .iter()
            .enumerate()
            .find(|(_, list)| list.reference == reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_level_rejects_out_of_range() {
        assert_eq!(HeadingLevel::try_from(2).unwrap(), HeadingLevel::Two);
        assert!(matches!(
            HeadingLevel::try_from(0),
            Err(Error::InvalidHeadingLevel(0))
        ));
        assert!(matches!(
            HeadingLevel::try_from(4),
            Err(Error::InvalidHeadingLevel(4))
        ));
    }

    #[test]
    fn task_status_parses_closed_set() {
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("skip".parse::<TaskStatus>().unwrap(), TaskStatus::Skip);
        for bad in ["DONE", "doing", "", " done"] {
            assert!(matches!(
                bad.parse::<TaskStatus>(),
                Err(Error::UnknownStatus(_))
            ));
        }
    }

    #[test]
    fn resolve_prefers_run_overrides() {
        let theme = Theme::default();
        let sheet = StyleSheet::from_theme(&theme);

        let plain = sheet.resolve(Some(HeadingLevel::Two), &TextRun::new("x"));
        assert_eq!(plain.size, theme.sizes.h2);
        assert!(plain.bold);
        assert_eq!(plain.color, Some(theme.palette.accent));

        let custom = sheet.resolve(None, &TextRun::new("x").sized(9).italic());
        assert_eq!(custom.size, 9);
        assert!(custom.italic);
        assert!(!custom.bold);
        assert_eq!(custom.font, "Arial");
    }

    #[test]
    fn decimal_marker_substitutes_ordinal() {
        assert_eq!(ListDefinition::numbers().marker(3), "3.");
        assert_eq!(ListDefinition::bullets().marker(3), "-");
    }

    #[test]
    fn twips_convert_to_millimetres() {
        assert!((twips_to_mm(1440) - 25.4).abs() < 1e-9);
        assert!((points_to_mm(72.0) - 25.4).abs() < 1e-9);
    }
}
