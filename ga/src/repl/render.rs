//! Terminal rendering for the roadmap tree and transcript

use std::fmt;

use colored::{ColoredString, Colorize};

use crate::roadmap::{Roadmap, StepStatus, render_plan};
use crate::session::{EntryKind, TranscriptEntry};

/// Prefix for failures shown in the transcript ("system error")
pub const SYSTEM_ERROR_PREFIX: &str = "خطای سیستم:";

/// Shown under the root title when the plan has no steps ("no steps defined")
pub const NO_STEPS: &str = "هیچ مرحله‌ای تعریف نشده";

/// Shown when there is no plan yet ("waiting for the project definition")
pub const AWAITING_PLAN: &str = "در انتظار تعریف پروژه...";

const INDENT: &str = "  ";

pub fn status_marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Done => "✓",
        StepStatus::Active => "▶",
        StepStatus::Pending => "○",
    }
}

/// One printable line of the roadmap panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeLine {
    Root(String),
    Step {
        depth: usize,
        status: StepStatus,
        title: String,
    },
    Placeholder(&'static str),
}

impl TreeLine {
    /// Colored form for the terminal
    pub fn paint(&self) -> ColoredString {
        let plain = self.to_string();
        match self {
            TreeLine::Root(_) => plain.bright_white().bold(),
            TreeLine::Step { status, .. } => match status {
                StepStatus::Done => plain.green(),
                StepStatus::Active => plain.bright_yellow(),
                StepStatus::Pending => plain.normal(),
            },
            TreeLine::Placeholder(_) => plain.dimmed().italic(),
        }
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeLine::Root(title) => write!(f, "{}", title),
            TreeLine::Step { depth, status, title } => {
                write!(f, "{}{} {}", INDENT.repeat(depth + 1), status_marker(*status), title)
            }
            TreeLine::Placeholder(text) => write!(f, "{}{}", INDENT, text),
        }
    }
}

/// Lay out the roadmap panel: root title, then one line per step
pub fn tree_lines(roadmap: Option<&Roadmap>) -> Vec<TreeLine> {
    let Some(roadmap) = roadmap else {
        return vec![TreeLine::Placeholder(AWAITING_PLAN)];
    };

    let mut lines = vec![TreeLine::Root(roadmap.root.clone())];
    let plan = render_plan(roadmap);
    if plan.is_empty() {
        lines.push(TreeLine::Placeholder(NO_STEPS));
        return lines;
    }

    lines.extend(plan.into_iter().map(|entry| TreeLine::Step {
        depth: entry.depth,
        status: entry.node.status,
        title: entry.node.title.clone(),
    }));
    lines
}

/// Summary such as "2/5 done, 1 active"; `None` without steps
pub fn progress_line(roadmap: Option<&Roadmap>) -> Option<String> {
    let progress = roadmap?.progress();
    if progress.total == 0 {
        return None;
    }
    Some(format!(
        "{}/{} done, {} active",
        progress.done, progress.total, progress.active
    ))
}

pub fn error_line(message: &str) -> String {
    format!("{} {}", SYSTEM_ERROR_PREFIX, message)
}

/// Print the whole roadmap panel
pub fn print_roadmap(roadmap: Option<&Roadmap>) {
    println!();
    for line in tree_lines(roadmap) {
        println!("{}", line.paint());
    }
    if let Some(progress) = progress_line(roadmap) {
        println!("{}", progress.dimmed());
    }
    println!();
}

/// Print transcript entries, in full or as one-line previews
pub fn print_transcript(entries: &[TranscriptEntry], preview: bool) {
    if entries.is_empty() {
        println!("{}", "No conversation history.".dimmed());
        return;
    }

    for (i, entry) in entries.iter().enumerate() {
        let label = match entry.kind {
            EntryKind::User => "User".bright_green(),
            EntryKind::Model => "Architect".bright_blue(),
            EntryKind::Error => "Error".red(),
        };
        if preview {
            println!("  {}. {}: {}", i + 1, label, preview_of(&entry.text, 50));
        } else {
            println!("{}", label.bold());
            println!("{}", entry.text);
            println!();
        }
    }
}

fn preview_of(text: &str, limit: usize) -> String {
    let flat = text.replace('\n', " ");
    let preview: String = flat.chars().take(limit).collect();
    if flat.chars().count() > limit {
        format!("{}...", preview)
    } else {
        preview
    }
}
