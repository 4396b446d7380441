use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::autosave::DEFAULT_AUTOSAVE_WINDOW;

#[derive(Parser, Debug)]
#[command(
    name = "taskflow",
    version,
    about = "Track tasks and notes from the terminal"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Data directory (default: $TASKFLOW_HOME or ~/.taskflow)"
    )]
    pub home: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_enum,
        help = "Storage backend (default: $TASKFLOW_BACKEND or records)"
    )]
    pub backend: Option<BackendArg>,
    #[arg(
        long,
        global = true,
        value_name = "MS",
        help = "Artificial delay for the memory backend"
    )]
    pub latency_ms: Option<u64>,
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
    #[arg(
        long,
        global = true,
        value_name = "DATE",
        help = "Treat DATE (YYYY-MM-DD) as today"
    )]
    pub date: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Today page: filtered tasks, progress and range counts.
    Today(TaskFilterArgs),
    /// Notes page: sidebar listing with folders and tags.
    Notes(NoteFilterArgs),
    /// Render the page a route path points at.
    Open(OpenArgs),
    /// List navigation routes.
    Routes,
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Category(CategoryCommand),
    #[command(subcommand)]
    Note(NoteCommand),
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    Add(TaskAdd),
    List(TaskList),
    Show(TaskShow),
    Update(TaskUpdate),
    Done(TaskIds),
    Reopen(TaskIds),
    Toggle(TaskShow),
    Remove(TaskIds),
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Add(CategoryAdd),
    List,
    Show(CategoryShow),
    Update(CategoryUpdate),
    Remove(CategoryShow),
}

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    New(NoteNew),
    List(NoteFilterArgs),
    Show(NoteShow),
    Edit(NoteEdit),
    /// Read content lines from stdin and auto-save them.
    Write(NoteWrite),
    Pin(NoteShow),
    Share(NoteShare),
    Export(NoteExport),
    Remove(NoteRemove),
    Folders,
    Tags,
}

#[derive(Args, Debug, Default)]
pub struct TaskFilterArgs {
    #[arg(long, value_enum)]
    pub range: Option<DateRangeArg>,
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,
    #[arg(long = "priority", value_enum)]
    pub priorities: Vec<PriorityArg>,
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
    #[arg(long)]
    pub show_completed: bool,
}

#[derive(Args, Debug, Default)]
pub struct NoteFilterArgs {
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,
    #[arg(long)]
    pub folder: Option<String>,
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    pub path: String,
}

#[derive(Args, Debug)]
pub struct TaskAdd {
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(
        long,
        value_name = "DATE",
        help = "YYYY-MM-DD, today, tomorrow or week"
    )]
    pub due: Option<String>,
    #[arg(long, value_name = "TAGS", help = "Comma-separated tags")]
    pub tags: Option<String>,
}

#[derive(Args, Debug)]
pub struct TaskList {
    #[command(flatten)]
    pub filter: TaskFilterArgs,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TaskShow {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct TaskIds {
    #[arg(value_name = "ID", num_args = 1..)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct TaskUpdate {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum)]
    pub priority: Option<PriorityArg>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_name = "DATE", conflicts_with = "no_due")]
    pub due: Option<String>,
    #[arg(long, help = "Clear the due date")]
    pub no_due: bool,
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,
}

#[derive(Args, Debug)]
pub struct CategoryAdd {
    pub name: String,
    #[arg(long, value_name = "#RRGGBB")]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args, Debug)]
pub struct CategoryShow {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct CategoryUpdate {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_name = "#RRGGBB")]
    pub color: Option<String>,
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args, Debug)]
pub struct NoteNew {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub folder: Option<String>,
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,
    #[arg(long, value_name = "HTML")]
    pub content: Option<String>,
}

#[derive(Args, Debug)]
pub struct NoteShow {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct NoteEdit {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_name = "HTML")]
    pub content: Option<String>,
    #[arg(long)]
    pub folder: Option<String>,
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,
}

#[derive(Args, Debug)]
pub struct NoteWrite {
    pub id: i64,
    #[arg(
        long,
        value_name = "MS",
        default_value_t = DEFAULT_AUTOSAVE_WINDOW.as_millis() as u64
    )]
    pub debounce_ms: u64,
}

#[derive(Args, Debug)]
pub struct NoteShare {
    pub id: i64,
    #[arg(value_name = "EMAIL")]
    pub emails: Vec<String>,
    #[arg(long, conflicts_with = "emails", help = "Stop sharing")]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct NoteExport {
    pub id: i64,
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: ExportFormatArg,
    #[arg(
        long,
        value_name = "PATH",
        help = "Output file (default: <home>/exports/<title>.<ext>)"
    )]
    pub output: Option<PathBuf>,
    #[arg(long, conflicts_with = "output", help = "Print to stdout")]
    pub stdout: bool,
}

#[derive(Args, Debug)]
pub struct NoteRemove {
    pub id: i64,
    #[arg(long, help = "Confirm deletion")]
    pub yes: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    #[value(alias = "mock")]
    Memory,
    #[value(alias = "remote")]
    Records,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DateRangeArg {
    Today,
    Upcoming,
    Overdue,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExportFormatArg {
    Markdown,
    Html,
    Pdf,
}
