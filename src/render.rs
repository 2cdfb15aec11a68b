//! TUI rendering traits for calblock types.
//!
//! Extension traits that add colored terminal rendering to calblock-core
//! types using owo_colors.

use calblock_core::reconcile::{BlockPlan, PlannedBlock, RunFailure, RunReport};
use calblock_core::{CalendarEvent, TimeRange, Window};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Threshold for compact view (show counts instead of individual blocks)
const COMPACT_THRESHOLD: usize = 5;

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

impl Render for TimeRange {
    fn render(&self) -> String {
        let start = self.start.format("%a %Y-%m-%d %H:%M");
        if self.start.date_naive() == self.end.date_naive() {
            format!("{} - {}", start, self.end.format("%H:%M"))
        } else {
            format!("{} - {}", start, self.end.format("%a %Y-%m-%d %H:%M"))
        }
    }
}

impl Render for Window {
    fn render(&self) -> String {
        format!(
            "{} → {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
        .dimmed()
        .to_string()
    }
}

impl Render for PlannedBlock {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "+".green(),
            self.range.render().green(),
            format!("({} on {})", self.source_title, self.calendar_id).dimmed()
        )
    }
}

impl Render for RunFailure {
    fn render(&self) -> String {
        format!("{} {}", "!".red(), self.to_string().red())
    }
}

fn render_created(blocks: &[CalendarEvent], lines: &mut Vec<String>) {
    if blocks.len() <= COMPACT_THRESHOLD {
        for block in blocks {
            lines.push(format!("   {} {}", "+".green(), block.time_range().render().green()));
        }
    } else {
        let label = format!("({} new {})", blocks.len(), pluralize("block", blocks.len()));
        lines.push(format!("   {} {}", "+".green(), label.green()));
    }
}

fn render_deleted(blocks: &[CalendarEvent], lines: &mut Vec<String>) {
    if blocks.len() <= COMPACT_THRESHOLD {
        for block in blocks {
            lines.push(format!("   {} {}", "-".red(), block.time_range().render().red()));
        }
    } else {
        let label = format!("({} removed {})", blocks.len(), pluralize("block", blocks.len()));
        lines.push(format!("   {} {}", "-".red(), label.red()));
    }
}

impl Render for RunReport {
    fn render(&self) -> String {
        let mut lines = vec![format!("📅 {}", self.window.render())];

        if self.is_unchanged() && self.is_success() {
            lines.push(format!("   {}", "Blocks are up to date".dimmed()));
        }

        render_created(&self.created, &mut lines);
        render_deleted(&self.deleted, &mut lines);

        for failure in &self.failures {
            lines.push(format!("   {}", failure.render()));
        }

        lines.join("\n")
    }
}

impl Render for BlockPlan {
    fn render(&self) -> String {
        let mut lines = vec![format!("📅 {}", self.window.render())];

        if self.is_empty() {
            lines.push(format!("   {}", "Blocks are up to date".dimmed()));
            return lines.join("\n");
        }

        for block in &self.to_create {
            lines.push(format!("   {}", block.render()));
        }
        for block in &self.to_delete {
            lines.push(format!(
                "   {} {} {}",
                "-".red(),
                block.time_range().render().red(),
                "(no matching remote event)".dimmed()
            ));
        }

        lines.join("\n")
    }
}
