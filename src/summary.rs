//! Task counts per document section.

use std::fmt;
use std::ops::AddAssign;

use crate::blocks::Blocks;
use crate::model::{Block, BlockKind, HeadingLevel, TaskStatus};
use crate::theme::{Rgb, Theme};

/// Title used for tasks that appear before the first level 1 heading.
pub const UNSECTIONED: &str = "Preamble";

/// Number of tasks per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub done: usize,
    pub todo: usize,
    pub skip: usize,
}

impl TaskCounts {
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Done => self.done += 1,
            TaskStatus::Todo => self.todo += 1,
            TaskStatus::Skip => self.skip += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.done + self.todo + self.skip
    }

    pub fn progress(&self) -> Progress {
        if self.todo == 0 {
            Progress::Complete
        } else if self.done == 0 {
            Progress::NotStarted
        } else {
            Progress::InProgress
        }
    }

    /// Row text such as `13 tasks — IN PROGRESS (2 done, 11 to do, 0 skipped)`.
    pub fn describe(&self) -> String {
        let total = self.total();
        format!(
            "{} {} — {} ({} done, {} to do, {} skipped)",
            total,
            if total == 1 { "task" } else { "tasks" },
            self.progress(),
            self.done,
            self.todo,
            self.skip
        )
    }
}

impl AddAssign for TaskCounts {
    fn add_assign(&mut self, other: Self) {
        self.done += other.done;
        self.todo += other.todo;
        self.skip += other.skip;
    }
}

/// Completion state of a group of tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    NotStarted,
    InProgress,
    Complete,
}

impl Progress {
    /// Palette color used for the summary row label.
    pub fn color(self, theme: &Theme) -> Rgb {
        match self {
            Progress::NotStarted => theme.palette.primary,
            Progress::InProgress => theme.palette.warning,
            Progress::Complete => theme.palette.success,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Progress::NotStarted => "NOT STARTED",
            Progress::InProgress => "IN PROGRESS",
            Progress::Complete => "COMPLETE",
        })
    }
}

/// Tasks found under one level 1 heading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionTally {
    pub title: String,
    pub counts: TaskCounts,
}

/// Groups task blocks under the level 1 heading that precedes them.
///
/// Sections without tasks are omitted; the result keeps document order.
pub fn tally_sections(blocks: &[Block]) -> Vec<SectionTally> {
    let mut sections: Vec<SectionTally> = Vec::new();
    let mut current = SectionTally {
        title: UNSECTIONED.to_string(),
        counts: TaskCounts::default(),
    };

    for block in blocks {
        match block.kind() {
            BlockKind::Heading(HeadingLevel::One) => {
                let next = SectionTally {
                    title: block.text(),
                    counts: TaskCounts::default(),
                };
                let finished = std::mem::replace(&mut current, next);
                if finished.counts.total() > 0 {
                    sections.push(finished);
                }
            }
            BlockKind::Task(status) => current.counts.record(status),
            _ => {}
        }
    }

    if current.counts.total() > 0 {
        sections.push(current);
    }
    sections
}

/// Sums the counts of every section.
pub fn overall(sections: &[SectionTally]) -> TaskCounts {
    let mut total = TaskCounts::default();
    for section in sections {
        total += section.counts;
    }
    total
}

/// One key/value row per section followed by a total row.
pub fn summary_rows(blocks: Blocks<'_>, sections: &[SectionTally]) -> Vec<Block> {
    let theme = blocks.theme();
    let mut rows: Vec<Block> = sections
        .iter()
        .map(|section| {
            blocks.key_value_row_in(
                &section.title,
                section.counts.describe(),
                section.counts.progress().color(theme),
            )
        })
        .collect();

    let total = overall(sections);
    rows.push(blocks.spacer());
    rows.push(blocks.key_value_row(
        "Total tasks",
        format!(
            "{} across {} {}",
            total.total(),
            sections.len(),
            if sections.len() == 1 { "section" } else { "sections" }
        ),
    ));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(theme: &Theme) -> Vec<Block> {
        let b = Blocks::new(theme);
        vec![
            b.task(TaskStatus::Todo, "loose"),
            b.heading(HeadingLevel::One, "Phase 0"),
            b.task(TaskStatus::Done, "a"),
            b.heading(HeadingLevel::Three, "Tasks"),
            b.task(TaskStatus::Done, "b"),
            b.heading(HeadingLevel::One, "Notes"),
            b.paragraph("no tasks here"),
            b.heading(HeadingLevel::One, "Phase 1"),
            b.task(TaskStatus::Done, "c"),
            b.task(TaskStatus::Todo, "d"),
            b.task(TaskStatus::Skip, "e"),
        ]
    }

    #[test]
    fn groups_tasks_by_level_one_heading() {
        let theme = Theme::default();
        let sections = tally_sections(&sample(&theme));

        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, [UNSECTIONED, "Phase 0", "Phase 1"]);
        assert_eq!(sections[1].counts, TaskCounts { done: 2, todo: 0, skip: 0 });
        assert_eq!(sections[2].counts, TaskCounts { done: 1, todo: 1, skip: 1 });
        assert_eq!(overall(&sections).total(), 6);
    }

    #[test]
    fn progress_follows_counts() {
        assert_eq!(TaskCounts { done: 0, todo: 3, skip: 0 }.progress(), Progress::NotStarted);
        assert_eq!(TaskCounts { done: 1, todo: 3, skip: 0 }.progress(), Progress::InProgress);
        assert_eq!(TaskCounts { done: 2, todo: 0, skip: 1 }.progress(), Progress::Complete);
        assert_eq!(
            TaskCounts { done: 1, todo: 0, skip: 0 }.describe(),
            "1 task — COMPLETE (1 done, 0 to do, 0 skipped)"
        );
    }

    #[test]
    fn summary_rows_end_with_total() {
        let theme = Theme::default();
        let sections = tally_sections(&sample(&theme));
        let rows = summary_rows(Blocks::new(&theme), &sections);

        assert_eq!(rows.len(), sections.len() + 2);
        assert_eq!(
            rows[1].text(),
            "Phase 0: 2 tasks — COMPLETE (2 done, 0 to do, 0 skipped)"
        );
        assert_eq!(rows[1].runs()[0].color(), Some(theme.palette.success));
        assert_eq!(rows[2].runs()[0].color(), Some(theme.palette.warning));
        assert_eq!(rows.last().map(Block::text).as_deref(), Some("Total tasks: 6 across 3 sections"));
    }
}
