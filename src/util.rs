use chrono::{DateTime, NaiveDate, Utc};

use crate::export::html_to_markdown;
use crate::filter::{is_overdue, DailyProgress};
use crate::model::{Category, Note, Task};

const PREVIEW_CHARS: usize = 60;
const PROGRESS_WIDTH: usize = 20;

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

/// Relative label the way the date badge shows it.
pub fn format_due(due: NaiveDate, today: NaiveDate) -> String {
    if due == today {
        "Today".to_string()
    } else if Some(due) == today.succ_opt() {
        "Tomorrow".to_string()
    } else if Some(due) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        due.format("%b %-d").to_string()
    }
}

pub fn due_label(task: &Task, today: NaiveDate) -> String {
    match task.due_date {
        Some(due) if is_overdue(task, today) => format!("{} (overdue)", format_due(due, today)),
        Some(due) => format_due(due, today),
        None => "-".to_string(),
    }
}

pub fn checkbox(done: bool) -> &'static str {
    if done {
        "x"
    } else {
        " "
    }
}

pub fn progress_bar(progress: &DailyProgress) -> String {
    let filled = (progress.percentage() / 100.0 * PROGRESS_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_WIDTH);
    format!(
        "[{}{}] {}/{} ({:.0}%)",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        progress.completed,
        progress.total,
        progress.percentage()
    )
}

/// First line of the note body as plain text, truncated.
pub fn note_preview(note: &Note) -> String {
    let text = html_to_markdown(&note.content);
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let mut preview: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

pub fn format_task_detail(task: &Task, today: NaiveDate) -> String {
    let mut output = String::new();
    output.push_str(&format!("Task ID: {}\n", task.id));
    output.push_str(&format!("Title: {}\n", task.title));
    output.push_str(&format!(
        "Status: {}\n",
        if task.completed { "done" } else { "open" }
    ));
    output.push_str(&format!("Priority: {}\n", task.priority.as_str()));
    output.push_str(&format!("Category: {}\n", task.category));
    match task.due_date {
        Some(due) => output.push_str(&format!("Due: {} ({})\n", due, due_label(task, today))),
        None => output.push_str("Due: (none)\n"),
    }
    if !task.tags.is_empty() {
        output.push_str(&format!("Tags: {}\n", task.tags.join(", ")));
    }
    if !task.description.trim().is_empty() {
        output.push_str(&format!("Description: {}\n", task.description));
    }
    output.push_str(&format!("Created: {}\n", format_datetime(task.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(task.updated_at)));
    output.trim_end().to_string()
}

pub fn format_category_detail(category: &Category, open_tasks: usize) -> String {
    let mut output = String::new();
    output.push_str(&format!("Category ID: {}\n", category.id));
    output.push_str(&format!("Name: {}\n", category.name));
    output.push_str(&format!("Color: {}\n", category.color));
    output.push_str(&format!("Icon: {}\n", category.icon));
    output.push_str(&format!("Open tasks: {}\n", open_tasks));
    output.push_str(&format!("Updated: {}\n", format_datetime(category.updated_at)));
    output.trim_end().to_string()
}

pub fn format_note_detail(note: &Note) -> String {
    let mut output = String::new();
    output.push_str(&format!("Note ID: {}\n", note.id));
    output.push_str(&format!("Title: {}\n", note.title));
    output.push_str(&format!("Folder: {}\n", note.folder));
    output.push_str(&format!(
        "Pinned: {}\n",
        if note.is_pinned { "yes" } else { "no" }
    ));
    if !note.tags.is_empty() {
        output.push_str(&format!("Tags: {}\n", note.tags.join(", ")));
    }
    if !note.shared_with.is_empty() {
        output.push_str(&format!("Shared with: {}\n", note.shared_with.join(", ")));
    }
    output.push_str(&format!("Created: {}\n", format_datetime(note.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(note.updated_at)));
    output.push('\n');
    let body = html_to_markdown(&note.content);
    if body.is_empty() {
        output.push_str("(empty)");
    } else {
        output.push_str(&body);
    }
    output.trim_end().to_string()
}
