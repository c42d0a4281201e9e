//! Document assembly.

use log::debug;

use crate::blocks::Blocks;
use crate::error::{Error, Result};
use crate::model::{Block, Document, ListDefinition, PageSettings, StyleSheet};
use crate::theme::Theme;

/// Collects blocks in authoring order and freezes them into a [`Document`].
///
/// The builder starts with the default `bullets` and `numbers` list definitions, a style sheet
/// derived from its theme and US Letter page settings.  Once [`finalize`](Self::finalize) has been
/// called every further [`append`](Self::append) fails with [`Error::Frozen`].
#[derive(Clone, Debug)]
pub struct DocumentBuilder {
    theme: Theme,
    title: String,
    page: PageSettings,
    lists: Vec<ListDefinition>,
    blocks: Vec<Block>,
    frozen: bool,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl DocumentBuilder {
    /// Creates a builder using the given theme.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            title: String::new(),
            page: PageSettings::default(),
            lists: vec![ListDefinition::bullets(), ListDefinition::numbers()],
            blocks: Vec::new(),
            frozen: false,
        }
    }

    /// Sets the document title stored in the output metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the page geometry.
    pub fn with_page_settings(mut self, page: PageSettings) -> Self {
        self.page = page;
        self
    }

    /// Adds a list definition, replacing any existing definition with the same reference.
    pub fn with_list(mut self, list: ListDefinition) -> Self {
        match self
            .lists
            .iter_mut()
            .find(|existing| existing.reference == list.reference)
        {
            Some(existing) => *existing = list,
            None => self.lists.push(list),
        }
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Returns the block vocabulary bound to this builder's theme.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(&self.theme)
    }

    /// Blocks appended so far.
    pub fn appended(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Adds a block to the end of the sequence.
    pub fn append(&mut self, block: Block) -> Result<()> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Appends every block of `blocks` in iteration order.
    pub fn extend<I>(&mut self, blocks: I) -> Result<()>
    where
        I: IntoIterator<Item = Block>,
    {
        if self.frozen {
            return Err(Error::Frozen);
        }
        self.blocks.extend(blocks);
        Ok(())
    }

    /// Freezes the builder and returns a snapshot of the document.
    pub fn finalize(&mut self) -> Document {
        if !self.frozen {
            debug!(
                "Finalizing document '{}' with {} blocks",
                self.title,
                self.blocks.len()
            );
            self.frozen = true;
        }

        Document {
            title: self.title.clone(),
            page: self.page,
            styles: StyleSheet::from_theme(&self.theme),
            lists: self.lists.clone(),
            blocks: self.blocks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{HeadingLevel, TaskStatus};

    #[test]
    fn preserves_append_order() {
        let mut builder = DocumentBuilder::default();
        let texts = ["one", "two", "two", "three"];
        for text in texts {
            let block = builder.blocks().paragraph(text);
            builder.append(block).unwrap();
        }

        let document = builder.finalize();
        let actual: Vec<_> = document.blocks().iter().map(Block::text).collect();
        assert_eq!(actual, texts);
    }

    #[test]
    fn finalize_twice_yields_equal_snapshots() {
        let mut builder = DocumentBuilder::default().with_title("Plan");
        let heading = builder.blocks().heading(HeadingLevel::One, "Title");
        builder.append(heading).unwrap();

        let first = builder.finalize();
        let second = builder.finalize();
        assert_eq!(first, second);
        assert_eq!(first.title(), "Plan");
    }

    #[test]
    fn append_after_finalize_fails() {
        let mut builder = DocumentBuilder::default();
        let _ = builder.finalize();

        let block = builder.blocks().task(TaskStatus::Todo, "late");
        assert!(matches!(builder.append(block), Err(Error::Frozen)));
        assert!(matches!(builder.extend(Vec::new()), Err(Error::Frozen)));
        assert!(builder.finalize().blocks().is_empty());
    }

    #[test]
    fn with_list_replaces_by_reference() {
        let mut bullets = ListDefinition::bullets();
        bullets.text = "•".to_string();
        let mut builder = DocumentBuilder::default().with_list(bullets);

        let document = builder.finalize();
        assert_eq!(document.lists().len(), 2);
        let (index, list) = document.list("bullets").expect("bullets defined");
        assert_eq!(index, 0);
        assert_eq!(list.text, "•");
    }
}
