//! TOML outlines describing a document as a list of builder invocations.
//!
//! An outline keeps the literal content out of code:
//!
//! ```toml
//! title = "Plan"
//! blocks = [
//!   { kind = "heading", level = 1, text = "Phase 0" },
//!   { kind = "task", status = "done", text = "Create repository" },
//!   { kind = "task-summary" },
//! ]
//! ```
//!
//! Status and heading level values are checked while parsing; palette colors when the blocks are
//! built.  Both fail before anything is appended.

use serde::Deserialize;

use crate::blocks::CenteredStyle;
use crate::builder::DocumentBuilder;
use crate::error::Result;
use crate::model::{Block, Document, HeadingLevel, PageSettings, TaskStatus};
use crate::summary;
use crate::theme::Theme;

/// The bundled project plan.
pub const DEFAULT_OUTLINE: &str = include_str!("../assets/project_plan.toml");

/// Named page geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    pub fn settings(self) -> PageSettings {
        match self {
            PageSize::Letter => PageSettings::letter(),
            PageSize::A4 => PageSettings::a4(),
        }
    }
}

/// One outline entry; `kind` selects the builder.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BlockSpec {
    Heading {
        level: HeadingLevel,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Lead {
        text: String,
    },
    Bullet {
        text: String,
    },
    Numbered {
        text: String,
    },
    Task {
        status: TaskStatus,
        text: String,
    },
    Milestone {
        text: String,
    },
    Note {
        text: String,
    },
    Version {
        version: String,
        title: String,
        description: String,
        color: String,
    },
    KeyValue {
        label: String,
        value: String,
        #[serde(default)]
        color: Option<String>,
    },
    Legend {
        label: String,
        value: String,
        color: String,
    },
    Centered {
        text: String,
        style: CenteredStyle,
    },
    Spacer,
    Divider,
    /// Expands to one row per section with tasks, computed from the blocks before it.
    TaskSummary,
}

/// A parsed outline.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Outline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page: PageSize,
    pub blocks: Vec<BlockSpec>,
}

impl Outline {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Parses [`DEFAULT_OUTLINE`].
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(DEFAULT_OUTLINE)
    }

    /// Returns a builder configured with the outline's title and page size.
    pub fn builder(&self, theme: Theme) -> DocumentBuilder {
        DocumentBuilder::new(theme)
            .with_title(self.title.as_str())
            .with_page_settings(self.page.settings())
    }

    /// Appends the blocks of every entry to `builder`, in order.
    pub fn append_to(&self, builder: &mut DocumentBuilder) -> Result<()> {
        for spec in &self.blocks {
            let blocks = expand(spec, builder)?;
            builder.extend(blocks)?;
        }
        Ok(())
    }

    /// Builds and finalizes the whole document.
    pub fn build(&self, theme: Theme) -> Result<Document> {
        let mut builder = self.builder(theme);
        self.append_to(&mut builder)?;
        log::debug!(
            "Outline '{}' expanded into {} blocks",
            self.title,
            builder.len()
        );
        Ok(builder.finalize())
    }
}

fn expand(spec: &BlockSpec, builder: &DocumentBuilder) -> Result<Vec<Block>> {
    let blocks = builder.blocks();
    let palette = &builder.theme().palette;

    let block = match spec {
        BlockSpec::Heading { level, text } => blocks.heading(*level, text.as_str()),
        BlockSpec::Paragraph { text } => blocks.paragraph(text.as_str()),
        BlockSpec::Lead { text } => blocks.lead(text.as_str()),
        BlockSpec::Bullet { text } => blocks.bullet(text.as_str()),
        BlockSpec::Numbered { text } => blocks.numbered(text.as_str()),
        BlockSpec::Task { status, text } => blocks.task(*status, text.as_str()),
        BlockSpec::Milestone { text } => blocks.milestone(text.as_str()),
        BlockSpec::Note { text } => blocks.note(text.as_str()),
        BlockSpec::Version {
            version,
            title,
            description,
            color,
        } => blocks.version_box(version, title, description.as_str(), palette.resolve(color)?),
        BlockSpec::KeyValue {
            label,
            value,
            color: None,
        } => blocks.key_value_row(label, value.as_str()),
        BlockSpec::KeyValue {
            label,
            value,
            color: Some(color),
        } => blocks.key_value_row_in(label, value.as_str(), palette.resolve(color)?),
        BlockSpec::Legend {
            label,
            value,
            color,
        } => blocks.legend_row(label, value.as_str(), palette.resolve(color)?),
        BlockSpec::Centered { text, style } => blocks.centered(text.as_str(), *style),
        BlockSpec::Spacer => blocks.spacer(),
        BlockSpec::Divider => blocks.divider(),
        BlockSpec::TaskSummary => {
            let sections = summary::tally_sections(builder.appended());
            return Ok(summary::summary_rows(blocks, &sections));
        }
    };

    Ok(vec![block])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::BlockKind;

    #[test]
    fn parses_every_kind() {
        let outline = Outline::from_toml_str(
            r##"
            title = "All kinds"
            page = "a4"
            blocks = [
              { kind = "heading", level = 2, text = "H" },
              { kind = "paragraph", text = "P" },
              { kind = "lead", text = "L" },
              { kind = "bullet", text = "B" },
              { kind = "numbered", text = "N" },
              { kind = "task", status = "skip", text = "T" },
              { kind = "milestone", text = "M" },
              { kind = "note", text = "No" },
              { kind = "version", version = "v1", title = "One", description = "D", color = "#123456" },
              { kind = "key-value", label = "K", value = "V" },
              { kind = "key-value", label = "K", value = "V", color = "danger" },
              { kind = "legend", label = "Lg", value = "V", color = "success" },
              { kind = "centered", text = "C", style = "motto" },
              { kind = "spacer" },
              { kind = "divider" },
            ]
            "##,
        )
        .unwrap();

        assert_eq!(outline.page, PageSize::A4);
        let document = outline.build(Theme::default()).unwrap();
        assert_eq!(document.title(), "All kinds");
        assert_eq!(document.page(), &PageSettings::a4());
        assert_eq!(document.blocks().len(), 15);
        assert_eq!(
            document.blocks()[0].kind(),
            BlockKind::Heading(HeadingLevel::Two)
        );
        assert_eq!(
            document.blocks()[5].kind(),
            BlockKind::Task(TaskStatus::Skip)
        );
    }

    #[test]
    fn rejects_unknown_status() {
        let err = Outline::from_toml_str(
            r#"blocks = [ { kind = "task", status = "doing", text = "x" } ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Outline(_)));
        assert!(err.to_string().contains("doing"));
    }

    #[test]
    fn rejects_out_of_range_heading_level() {
        let err = Outline::from_toml_str(
            r#"blocks = [ { kind = "heading", level = 4, text = "x" } ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Outline(_)));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Outline::from_toml_str(r#"blocks = [ { kind = "table" } ]"#).unwrap_err();
        assert!(matches!(err, Error::Outline(_)));
    }

    #[test]
    fn rejects_unknown_palette_color() {
        let outline = Outline::from_toml_str(
            r#"blocks = [ { kind = "legend", label = "a", value = "b", color = "teal" } ]"#,
        )
        .unwrap();
        assert!(matches!(
            outline.build(Theme::default()),
            Err(Error::UnknownColor(name)) if name == "teal"
        ));
    }

    #[test]
    fn task_summary_counts_preceding_tasks() {
        let outline = Outline::from_toml_str(
            r#"
            blocks = [
              { kind = "heading", level = 1, text = "Phase A" },
              { kind = "task", status = "done", text = "a" },
              { kind = "task", status = "todo", text = "b" },
              { kind = "heading", level = 1, text = "Summary" },
              { kind = "task-summary" },
              { kind = "task", status = "todo", text = "after the summary" },
            ]
            "#,
        )
        .unwrap();

        let document = outline.build(Theme::default()).unwrap();
        let texts: Vec<String> = document.blocks().iter().map(Block::text).collect();
        assert_eq!(
            texts[4],
            "Phase A: 2 tasks — IN PROGRESS (1 done, 1 to do, 0 skipped)"
        );
        assert_eq!(texts[6], "Total tasks: 2 across 1 section");
        assert_eq!(texts.len(), 8);
    }

    #[test]
    fn bundled_outline_builds() {
        let outline = Outline::bundled().unwrap();
        assert!(!outline.title.is_empty());

        let document = outline.build(Theme::default()).unwrap();
        let sections = summary::tally_sections(document.blocks());
        assert_eq!(sections.len(), 7);
        assert_eq!(sections[0].counts.done, 8);
        assert_eq!(summary::overall(&sections).total(), 78);
    }
}
