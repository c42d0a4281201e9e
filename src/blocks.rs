//! The block vocabulary.
//!
//! [`Blocks`] wraps a [`Theme`] and turns plain content values into styled [`Block`] descriptors.
//! Each method encodes one recurring visual pattern (heading, bullet, task status, callout), so an
//! authoring sequence reads as a list of intents rather than raw formatting.  None of the
//! constructors has side effects or can fail; invalid statuses and heading levels are rejected
//! earlier, when strings are parsed into [`TaskStatus`] and [`HeadingLevel`].

use serde::Deserialize;

use crate::model::{
    heading_metrics, Alignment, Block, BlockKind, Border, ListDefinition, TextRun,
};
use crate::theme::{Rgb, Theme};

pub use crate::model::{HeadingLevel, TaskStatus};

const CALLOUT_INDENT: u32 = 360;

/// Centered lines used on the cover and in the closing of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenteredStyle {
    Title,
    Subtitle,
    Tagline,
    Banner,
    Motto,
    Signoff,
}

/// Block constructors bound to a theme.
#[derive(Clone, Copy, Debug)]
pub struct Blocks<'t> {
    theme: &'t Theme,
}

impl<'t> Blocks<'t> {
    pub fn new(theme: &'t Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &'t Theme {
        self.theme
    }

    fn body(&self, text: impl Into<String>) -> TextRun {
        TextRun::new(text)
            .sized(self.theme.sizes.body)
            .in_font(self.theme.fonts.body.as_str())
    }

    /// Section heading.  Only level 1 carries an underline.
    pub fn heading(&self, level: HeadingLevel, text: impl Into<String>) -> Block {
        let (size, color, spacing) = heading_metrics(self.theme, level);
        let run = TextRun::new(text)
            .bold()
            .sized(size)
            .colored(color)
            .in_font(self.theme.fonts.body.as_str());

        let block = Block::new(BlockKind::Heading(level), vec![run])
            .with_spacing(spacing.before, spacing.after);

        match level {
            HeadingLevel::One => {
                block.with_bottom_border(Border::single(4, self.theme.palette.accent, 6))
            }
            HeadingLevel::Two | HeadingLevel::Three => block,
        }
    }

    /// Plain body text.
    pub fn paragraph(&self, text: impl Into<String>) -> Block {
        Block::new(BlockKind::Paragraph, vec![self.body(text)]).with_spacing(80, 80)
    }

    /// Bold body text introducing the list that follows.
    pub fn lead(&self, text: impl Into<String>) -> Block {
        Block::new(BlockKind::Lead, vec![self.body(text).bold()]).with_spacing(60, 40)
    }

    /// Item of the default bullet list.
    pub fn bullet(&self, text: impl Into<String>) -> Block {
        Block::new(BlockKind::Bullet, vec![self.body(text)])
            .with_spacing(50, 50)
            .in_list(ListDefinition::BULLETS, 0)
    }

    /// Item of the default numbered list.
    pub fn numbered(&self, text: impl Into<String>) -> Block {
        Block::new(BlockKind::Numbered, vec![self.body(text)])
            .with_spacing(50, 50)
            .in_list(ListDefinition::NUMBERS, 0)
    }

    /// Task line with a bracketed, monospaced status label colored by status.
    pub fn task(&self, status: TaskStatus, text: impl Into<String>) -> Block {
        let label = TextRun::new(format!("[{}] ", status.label()))
            .bold()
            .sized(self.theme.sizes.label)
            .monospace(self.theme.fonts.mono.as_str())
            .colored(status.color(self.theme));

        Block::new(BlockKind::Task(status), vec![label, self.body(text)])
            .with_spacing(60, 60)
            .with_indent(CALLOUT_INDENT)
    }

    /// Milestone callout: success-colored bar and italic body.
    pub fn milestone(&self, text: impl Into<String>) -> Block {
        let color = self.theme.palette.success;
        Block::new(
            BlockKind::Milestone,
            vec![
                self.body("Milestone: ").bold().colored(color),
                self.body(text).italic(),
            ],
        )
        .with_spacing(160, 160)
        .with_indent(CALLOUT_INDENT)
        .with_left_border(Border::thick(6, color, 8))
    }

    /// Note callout: warning-colored bar and a bold `Note:` prefix.
    pub fn note(&self, text: impl Into<String>) -> Block {
        let color = self.theme.palette.warning;
        Block::new(
            BlockKind::Note,
            vec![self.body("Note: ").bold().colored(color), self.body(text)],
        )
        .with_spacing(120, 120)
        .with_indent(CALLOUT_INDENT)
        .with_left_border(Border::thick(6, color, 8))
    }

    /// Roadmap entry: version tag, bold title and muted description next to a colored bar.
    pub fn version_box(
        &self,
        version: impl AsRef<str>,
        title: impl AsRef<str>,
        description: impl Into<String>,
        color: Rgb,
    ) -> Block {
        let size = self.theme.sizes.version;
        let runs = vec![
            self.body(format!("{} — ", version.as_ref()))
                .bold()
                .sized(size)
                .colored(color),
            self.body(format!("{}: ", title.as_ref())).bold().sized(size),
            self.body(description).colored(self.theme.palette.muted),
        ];

        Block::new(BlockKind::VersionBox, runs)
            .with_spacing(120, 120)
            .with_indent(CALLOUT_INDENT)
            .with_left_border(Border::thick(8, color, 8))
    }

    /// `label: value` row with the label in the primary color.
    pub fn key_value_row(&self, label: impl AsRef<str>, value: impl Into<String>) -> Block {
        self.key_value_row_in(label, value, self.theme.palette.primary)
    }

    /// `label: value` row with a custom label color.
    pub fn key_value_row_in(
        &self,
        label: impl AsRef<str>,
        value: impl Into<String>,
        color: Rgb,
    ) -> Block {
        Block::new(
            BlockKind::KeyValue,
            vec![
                self.body(format!("{}: ", label.as_ref())).bold().colored(color),
                self.body(value),
            ],
        )
        .with_spacing(60, 60)
    }

    /// Legend entry: colored label separated from its explanation by two spaces.
    pub fn legend_row(&self, label: impl AsRef<str>, value: impl Into<String>, color: Rgb) -> Block {
        Block::new(
            BlockKind::Legend,
            vec![
                self.body(format!("{}  ", label.as_ref())).bold().colored(color),
                self.body(value),
            ],
        )
        .with_spacing(60, 60)
    }

    /// Centered cover or closing line.
    pub fn centered(&self, text: impl Into<String>, style: CenteredStyle) -> Block {
        let sizes = &self.theme.sizes;
        let palette = &self.theme.palette;
        let run = TextRun::new(text).in_font(self.theme.fonts.body.as_str());

        let (run, before, after) = match style {
            CenteredStyle::Title => (run.bold().sized(sizes.title).colored(palette.primary), 1440, 200),
            CenteredStyle::Subtitle => {
                (run.bold().sized(sizes.subtitle).colored(palette.accent), 0, 160)
            }
            CenteredStyle::Tagline => {
                (run.italic().sized(sizes.tagline).colored(palette.muted), 0, 80)
            }
            CenteredStyle::Banner => {
                (run.bold().sized(sizes.banner).colored(palette.success), 160, 80)
            }
            CenteredStyle::Motto => (
                run.bold().italic().sized(sizes.motto).colored(palette.primary),
                200,
                80,
            ),
            CenteredStyle::Signoff => {
                (run.italic().sized(sizes.signoff).colored(palette.muted), 0, 80)
            }
        };

        Block::new(BlockKind::Centered, vec![run])
            .with_spacing(before, after)
            .with_alignment(Alignment::Center)
    }

    /// Empty block that only adds vertical space.
    pub fn spacer(&self) -> Block {
        Block::new(BlockKind::Spacer, Vec::new()).with_spacing(60, 60)
    }

    /// Thin full-width rule separating sections.
    pub fn divider(&self) -> Block {
        Block::new(BlockKind::Divider, Vec::new())
            .with_spacing(200, 200)
            .with_bottom_border(Border::single(2, self.theme.palette.rule, 4))
    }
}
