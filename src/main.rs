mod app;
mod autosave;
mod cli;
mod config;
mod db;
mod entities;
mod error;
mod export;
mod filter;
mod logging;
mod model;
mod routes;
mod service;
mod store;
mod util;

use std::collections::BTreeSet;
use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use clap::Parser;

use crate::app::App;
use crate::autosave::AutoSaver;
use crate::cli::{
    BackendArg, CategoryAdd, CategoryCommand, CategoryShow, CategoryUpdate, Cli, Command,
    DateRangeArg, ExportFormatArg, NoteCommand, NoteEdit, NoteExport, NoteFilterArgs, NoteNew,
    NoteRemove, NoteShare, NoteShow, NoteWrite, PriorityArg, TaskAdd, TaskCommand,
    TaskFilterArgs, TaskIds, TaskList, TaskShow, TaskUpdate,
};
use crate::config::{BackendKind, Config, Overrides};
use crate::error::AppError;
use crate::export::escape_html;
use crate::filter::{daily_progress, range_counts, TaskFilter};
use crate::model::{
    split_tags, Category, CategoryChanges, CategoryInput, DateRange, ExportFormat, Note,
    NoteChanges, NoteInput, NoteQuery, Priority, Task, TaskChanges, TaskInput,
    DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON,
};
use crate::routes::{Page, HOME_PATH, ROUTES};
use crate::store::{Backend, MemoryBackend, RecordsBackend};
use crate::util::{
    checkbox, due_label, format_category_detail, format_datetime, format_note_detail,
    format_task_detail, note_preview, progress_bar,
};

/// Per-invocation state shared by every handler.
struct Context {
    home: PathBuf,
    today: NaiveDate,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        if err.is_not_found() {
            log::warn!("event=command module=main status=error error={err}");
        } else {
            log::error!("event=command module=main status=error error={err}");
        }
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Cli {
        home,
        backend,
        latency_ms,
        log_level,
        date,
        command,
    } = Cli::parse();

    let config = Config::resolve(Overrides {
        home,
        backend: backend.map(backend_from_arg),
        latency_ms,
        log_level,
    })?;
    if let Err(err) = logging::init_logging(&config.log_level, &db::resolve_log_dir(&config.home))
    {
        eprintln!("Warning: file logging disabled: {err}");
    }
    log::debug!(
        "event=command_start module=main status=ok backend={} home={}",
        config.backend.as_str(),
        config.home.display()
    );

    if let Command::Routes = command {
        print_routes();
        return Ok(());
    }

    let context = Context {
        home: config.home.clone(),
        today: resolve_today(date.as_deref())?,
    };

    match config.backend {
        BackendKind::Memory => {
            let backend = MemoryBackend::with_fixtures(config.latency)?;
            dispatch(&App::new(&backend), &context, command).await
        }
        BackendKind::Records => {
            let db_path = db::resolve_db_path(&config.home);
            db::ensure_parent_dir(&db_path)?;
            let mut lock = db::open_lock(&db_path)?;
            let _guard = lock.write()?;

            let conn = db::connect(&db_path).await?;
            db::ensure_schema(&conn).await?;
            let backend = RecordsBackend::new(conn);
            dispatch(&App::new(&backend), &context, command).await
        }
    }
}

async fn dispatch<B: Backend>(
    app: &App<B>,
    context: &Context,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::Today(args) => handle_today(app, context, args).await,
        Command::Notes(args) => handle_notes(app, args).await,
        Command::Open(args) => match routes::resolve(&args.path) {
            Page::Today => handle_today(app, context, TaskFilterArgs::default()).await,
            Page::Notes => handle_notes(app, NoteFilterArgs::default()).await,
            Page::NotFound => Err(AppError::NotFound(format!("page {}", args.path.trim()))),
        },
        Command::Routes => {
            print_routes();
            Ok(())
        }
        Command::Task(command) => handle_task(app, context, command).await,
        Command::Category(command) => handle_category(app, command).await,
        Command::Note(command) => handle_note(app, context, command).await,
    }
}

async fn handle_task<B: Backend>(
    app: &App<B>,
    context: &Context,
    command: TaskCommand,
) -> Result<(), AppError> {
    match command {
        TaskCommand::Add(args) => handle_task_add(app, context, args).await,
        TaskCommand::List(args) => handle_task_list(app, context, args).await,
        TaskCommand::Show(args) => handle_task_show(app, context, args).await,
        TaskCommand::Update(args) => handle_task_update(app, context, args).await,
        TaskCommand::Done(args) => handle_task_set_completed(app, args, true).await,
        TaskCommand::Reopen(args) => handle_task_set_completed(app, args, false).await,
        TaskCommand::Toggle(args) => handle_task_toggle(app, args).await,
        TaskCommand::Remove(args) => handle_task_remove(app, args).await,
        TaskCommand::Stats => handle_task_stats(app, context).await,
    }
}

async fn handle_category<B: Backend>(
    app: &App<B>,
    command: CategoryCommand,
) -> Result<(), AppError> {
    match command {
        CategoryCommand::Add(args) => handle_category_add(app, args).await,
        CategoryCommand::List => handle_category_list(app).await,
        CategoryCommand::Show(args) => handle_category_show(app, args).await,
        CategoryCommand::Update(args) => handle_category_update(app, args).await,
        CategoryCommand::Remove(args) => handle_category_remove(app, args).await,
    }
}

async fn handle_note<B: Backend>(
    app: &App<B>,
    context: &Context,
    command: NoteCommand,
) -> Result<(), AppError> {
    match command {
        NoteCommand::New(args) => handle_note_new(app, args).await,
        NoteCommand::List(args) => handle_note_list(app, args).await,
        NoteCommand::Show(args) => handle_note_show(app, args).await,
        NoteCommand::Edit(args) => handle_note_edit(app, args).await,
        NoteCommand::Write(args) => handle_note_write(app, args).await,
        NoteCommand::Pin(args) => handle_note_pin(app, args).await,
        NoteCommand::Share(args) => handle_note_share(app, args).await,
        NoteCommand::Export(args) => handle_note_export(app, context, args).await,
        NoteCommand::Remove(args) => handle_note_remove(app, args).await,
        NoteCommand::Folders => handle_note_folders(app).await,
        NoteCommand::Tags => handle_note_tags(app).await,
    }
}

async fn handle_today<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: TaskFilterArgs,
) -> Result<(), AppError> {
    let filter = task_filter_from_args(args, DateRange::Today);
    let view = app.load_today(&filter, context.today).await?;

    println!("Today: {}", context.today.format("%A, %B %-d"));
    println!("Progress: {}", progress_bar(&view.progress));
    println!(
        "Open: today {} | upcoming {} | overdue {} | all {}",
        view.counts.today, view.counts.upcoming, view.counts.overdue, view.counts.all
    );
    if !view.categories.is_empty() {
        let names: Vec<&str> = view
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        println!("Categories: {}", names.join(", "));
    }
    println!();

    if view.tasks.is_empty() {
        if view.filter_active {
            println!("No tasks match the current filter.");
        } else {
            println!("No tasks due today.");
        }
        return Ok(());
    }
    print_task_list(&view.tasks, context.today);
    if view.filter_active {
        println!("Showing {} of {} tasks.", view.tasks.len(), view.total);
    }
    Ok(())
}

async fn handle_notes<B: Backend>(app: &App<B>, args: NoteFilterArgs) -> Result<(), AppError> {
    let view = app.load_notes(&note_query_from_args(args)).await?;
    println!("Folders: {}", join_or_none(&view.folders));
    println!("Tags: {}", join_or_none(&view.tags));
    println!();
    if view.notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }
    print_note_list(&view.notes);
    Ok(())
}

async fn handle_task_add<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: TaskAdd,
) -> Result<(), AppError> {
    let mut input = TaskInput::new(args.title);
    input.priority = priority_from_arg(args.priority);
    if let Some(description) = args.description {
        input.description = description;
    }
    if let Some(category) = args.category {
        input.category = category;
    }
    if let Some(due) = args.due.as_deref() {
        input.due_date = Some(parse_due(due, context.today)?);
    }
    if let Some(tags) = args.tags.as_deref() {
        input.tags = split_tags(tags);
    }

    let task = app.tasks.create(input).await?;
    println!("Created task ID: {}: {}", task.id, task.title);
    Ok(())
}

async fn handle_task_list<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: TaskList,
) -> Result<(), AppError> {
    let filter = task_filter_from_args(args.filter, DateRange::All);
    let tasks = filter.apply(&app.tasks.get_all().await?, context.today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }
    print_task_list(&tasks, context.today);
    Ok(())
}

async fn handle_task_show<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: TaskShow,
) -> Result<(), AppError> {
    let task = app.tasks.get_by_id(args.id).await?;
    println!("{}", format_task_detail(&task, context.today));
    Ok(())
}

async fn handle_task_update<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: TaskUpdate,
) -> Result<(), AppError> {
    let due_date = if args.no_due {
        Some(None)
    } else {
        match args.due.as_deref() {
            Some(raw) => Some(Some(parse_due(raw, context.today)?)),
            None => None,
        }
    };
    let changes = TaskChanges {
        title: args.title,
        description: args.description,
        priority: args.priority.map(priority_from_arg),
        category: args.category,
        due_date,
        completed: None,
        tags: args.tags.as_deref().map(split_tags),
    };
    let task = app.tasks.update(args.id, changes).await?;
    println!("Updated task ID: {}: {}", task.id, task.title);
    Ok(())
}

async fn handle_task_set_completed<B: Backend>(
    app: &App<B>,
    args: TaskIds,
    completed: bool,
) -> Result<(), AppError> {
    for id in args.ids {
        let task = app.tasks.set_completed(id, completed).await?;
        println!("Task ID: {} marked {}.", task.id, status_word(task.completed));
    }
    Ok(())
}

async fn handle_task_toggle<B: Backend>(app: &App<B>, args: TaskShow) -> Result<(), AppError> {
    let task = app.tasks.toggle_complete(args.id).await?;
    println!("Task ID: {} marked {}.", task.id, status_word(task.completed));
    Ok(())
}

async fn handle_task_remove<B: Backend>(app: &App<B>, args: TaskIds) -> Result<(), AppError> {
    for id in args.ids {
        app.tasks.delete(id).await?;
        println!("Task ID: {} removed.", id);
    }
    Ok(())
}

async fn handle_task_stats<B: Backend>(app: &App<B>, context: &Context) -> Result<(), AppError> {
    let tasks = app.tasks.get_all().await?;
    let progress = daily_progress(&tasks, context.today);
    let counts = range_counts(&tasks, context.today);
    let done = tasks.iter().filter(|task| task.completed).count();

    println!("Due today: {}", progress_bar(&progress));
    println!("{:<10} {}", "RANGE", "OPEN");
    for range in [
        DateRange::Today,
        DateRange::Upcoming,
        DateRange::Overdue,
        DateRange::All,
    ] {
        println!("{:<10} {}", range.as_str(), counts.get(range));
    }
    println!("Completed: {}/{}", done, tasks.len());
    Ok(())
}

async fn handle_category_add<B: Backend>(
    app: &App<B>,
    args: CategoryAdd,
) -> Result<(), AppError> {
    let category = app
        .categories
        .create(CategoryInput {
            name: args.name,
            color: args
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: args.icon.unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        })
        .await?;
    println!("Created category ID: {}: {}", category.id, category.name);
    Ok(())
}

async fn handle_category_list<B: Backend>(app: &App<B>) -> Result<(), AppError> {
    let categories = app.categories.get_all().await?;
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    print_category_list(&categories);
    Ok(())
}

async fn handle_category_show<B: Backend>(
    app: &App<B>,
    args: CategoryShow,
) -> Result<(), AppError> {
    let category = app.categories.get_by_id(args.id).await?;
    let open_tasks = app.open_tasks_in(&category).await?;
    println!("{}", format_category_detail(&category, open_tasks));
    Ok(())
}

async fn handle_category_update<B: Backend>(
    app: &App<B>,
    args: CategoryUpdate,
) -> Result<(), AppError> {
    if args.name.is_none() && args.color.is_none() && args.icon.is_none() {
        return Err(AppError::InvalidInput(
            "no category changes provided".to_string(),
        ));
    }
    let category = app
        .categories
        .update(
            args.id,
            CategoryChanges {
                name: args.name,
                color: args.color,
                icon: args.icon,
            },
        )
        .await?;
    println!("Updated category ID: {}: {}", category.id, category.name);
    Ok(())
}

async fn handle_category_remove<B: Backend>(
    app: &App<B>,
    args: CategoryShow,
) -> Result<(), AppError> {
    app.categories.delete(args.id).await?;
    println!("Category ID: {} removed.", args.id);
    Ok(())
}

async fn handle_note_new<B: Backend>(app: &App<B>, args: NoteNew) -> Result<(), AppError> {
    let mut input = NoteInput::default();
    if let Some(title) = args.title {
        input.title = title;
    }
    if let Some(folder) = args.folder {
        input.folder = folder;
    }
    if let Some(tags) = args.tags.as_deref() {
        input.tags = split_tags(tags);
    }
    if let Some(content) = args.content {
        input.content = content;
    }
    let note = app.notes.create(input).await?;
    println!("Created note ID: {}: {}", note.id, note.title);
    Ok(())
}

async fn handle_note_list<B: Backend>(
    app: &App<B>,
    args: NoteFilterArgs,
) -> Result<(), AppError> {
    let notes = app.notes.query(&note_query_from_args(args)).await?;
    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }
    print_note_list(&notes);
    Ok(())
}

async fn handle_note_show<B: Backend>(app: &App<B>, args: NoteShow) -> Result<(), AppError> {
    let note = app.notes.get_by_id(args.id).await?;
    println!("{}", format_note_detail(&note));
    Ok(())
}

async fn handle_note_edit<B: Backend>(app: &App<B>, args: NoteEdit) -> Result<(), AppError> {
    let changes = NoteChanges {
        title: args.title,
        content: args.content,
        folder: args.folder,
        tags: args.tags.as_deref().map(split_tags),
        ..Default::default()
    };
    let note = app.notes.update(args.id, changes).await?;
    println!("Updated note ID: {}: {}", note.id, note.title);
    Ok(())
}

async fn handle_note_write<B: Backend>(app: &App<B>, args: NoteWrite) -> Result<(), AppError> {
    let note = app.notes.get_by_id(args.id).await?;
    let saver = AutoSaver::spawn(app.notes.clone(), Duration::from_millis(args.debounce_ms));

    // Blocking reads stay on this thread; the saver runs on the runtime workers.
    let mut paragraphs = Vec::new();
    for line in std::io::stdin().lock().lines() {
        paragraphs.push(paragraph_html(&line?));
        saver.schedule(
            note.id,
            NoteChanges {
                content: Some(paragraphs.concat()),
                ..Default::default()
            },
        )?;
    }

    let report = saver.finish().await?;
    if report.failures > 0 {
        return Err(AppError::Background(format!(
            "{} auto-save(s) of note ID: {} failed",
            report.failures, note.id
        )));
    }
    match report.last_saved {
        Some(saved) => println!(
            "Saved note ID: {} ({} save(s), {} chars).",
            saved.id,
            report.saves,
            saved.content.chars().count()
        ),
        None => println!("No changes to note ID: {}.", note.id),
    }
    Ok(())
}

async fn handle_note_pin<B: Backend>(app: &App<B>, args: NoteShow) -> Result<(), AppError> {
    let note = app.notes.toggle_pin(args.id).await?;
    if note.is_pinned {
        println!("Pinned note ID: {}.", note.id);
    } else {
        println!("Unpinned note ID: {}.", note.id);
    }
    Ok(())
}

async fn handle_note_share<B: Backend>(app: &App<B>, args: NoteShare) -> Result<(), AppError> {
    if args.emails.is_empty() && !args.clear {
        return Err(AppError::InvalidInput(
            "provide at least one email or --clear".to_string(),
        ));
    }
    let note = app.notes.share(args.id, &args.emails).await?;
    if note.shared_with.is_empty() {
        println!("Note ID: {} is no longer shared.", note.id);
    } else {
        println!(
            "Note ID: {} shared with {}.",
            note.id,
            note.shared_with.join(", ")
        );
    }
    Ok(())
}

async fn handle_note_export<B: Backend>(
    app: &App<B>,
    context: &Context,
    args: NoteExport,
) -> Result<(), AppError> {
    let format = export_format_from_arg(args.format);
    let rendered = app.notes.export(args.id, format).await?;
    if args.stdout {
        print!("{rendered}");
        return Ok(());
    }

    let path = match args.output {
        Some(path) => path,
        None => {
            let note = app.notes.get_by_id(args.id).await?;
            db::resolve_export_dir(&context.home).join(export::file_name(&note, format))
        }
    };
    db::ensure_parent_dir(&path)?;
    fs::write(&path, rendered)?;
    println!("Exported note ID: {} to {}", args.id, path.display());
    Ok(())
}

async fn handle_note_remove<B: Backend>(app: &App<B>, args: NoteRemove) -> Result<(), AppError> {
    if !args.yes {
        return Err(AppError::InvalidInput(format!(
            "refusing to delete note ID: {} without --yes",
            args.id
        )));
    }
    app.notes.delete(args.id).await?;
    println!("Note ID: {} removed.", args.id);
    Ok(())
}

async fn handle_note_folders<B: Backend>(app: &App<B>) -> Result<(), AppError> {
    print_lines_or(&app.notes.folders().await?, "No folders.");
    Ok(())
}

async fn handle_note_tags<B: Backend>(app: &App<B>) -> Result<(), AppError> {
    print_lines_or(&app.notes.tags().await?, "No tags.");
    Ok(())
}

fn resolve_today(date: Option<&str>) -> Result<NaiveDate, AppError> {
    match date {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!("invalid date `{raw}`; expected YYYY-MM-DD"))
    })
}

/// Accepts the quick-add shortcuts as well as a calendar date.
fn parse_due(raw: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => days_after(today, 1),
        "week" => days_after(today, 7),
        _ => parse_date(raw),
    }
}

fn days_after(today: NaiveDate, days: u64) -> Result<NaiveDate, AppError> {
    today.checked_add_days(Days::new(days)).ok_or_else(|| {
        AppError::InvalidInput(format!("due date {days} days after {today} is out of range"))
    })
}

fn task_filter_from_args(args: TaskFilterArgs, default_range: DateRange) -> TaskFilter {
    TaskFilter {
        categories: args
            .categories
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>(),
        priorities: args.priorities.into_iter().map(priority_from_arg).collect(),
        date_range: args
            .range
            .map(date_range_from_arg)
            .unwrap_or(default_range),
        search_query: args.search.unwrap_or_default(),
        show_completed: args.show_completed,
    }
}

fn note_query_from_args(args: NoteFilterArgs) -> NoteQuery {
    NoteQuery {
        search: args.search,
        folder: args.folder,
        tags: model::normalize_tags(&args.tags),
    }
}

fn paragraph_html(line: &str) -> String {
    if line.trim().is_empty() {
        "<p><br></p>".to_string()
    } else {
        format!("<p>{}</p>", escape_html(line))
    }
}

fn backend_from_arg(arg: BackendArg) -> BackendKind {
    match arg {
        BackendArg::Memory => BackendKind::Memory,
        BackendArg::Records => BackendKind::Records,
    }
}

fn priority_from_arg(arg: PriorityArg) -> Priority {
    match arg {
        PriorityArg::High => Priority::High,
        PriorityArg::Medium => Priority::Medium,
        PriorityArg::Low => Priority::Low,
    }
}

fn date_range_from_arg(arg: DateRangeArg) -> DateRange {
    match arg {
        DateRangeArg::Today => DateRange::Today,
        DateRangeArg::Upcoming => DateRange::Upcoming,
        DateRangeArg::Overdue => DateRange::Overdue,
        DateRangeArg::All => DateRange::All,
    }
}

fn export_format_from_arg(arg: ExportFormatArg) -> ExportFormat {
    match arg {
        ExportFormatArg::Markdown => ExportFormat::Markdown,
        ExportFormatArg::Html => ExportFormat::Html,
        ExportFormatArg::Pdf => ExportFormat::Pdf,
    }
}

fn status_word(completed: bool) -> &'static str {
    if completed {
        "done"
    } else {
        "open"
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

fn print_lines_or(values: &[String], empty: &str) {
    if values.is_empty() {
        println!("{empty}");
        return;
    }
    for value in values {
        println!("{value}");
    }
}

fn print_routes() {
    println!("{:<8} {:<8} {:<10} {}", "PATH", "LABEL", "ICON", "ID");
    for route in ROUTES {
        println!(
            "{:<8} {:<8} {:<10} {}",
            route.path, route.label, route.icon, route.id
        );
    }
    println!("/ redirects to {HOME_PATH}");
}

fn print_task_list(tasks: &[Task], today: NaiveDate) {
    println!(
        "{:<4} {:<4} {:<7} {:<20} {:<12} {}",
        "ID", "DONE", "PRI", "DUE", "CATEGORY", "TITLE"
    );
    for task in tasks {
        println!(
            "{:<4} {:<4} {:<7} {:<20} {:<12} {}",
            task.id,
            format!("[{}]", checkbox(task.completed)),
            task.priority.as_str(),
            due_label(task, today),
            task.category,
            task.title
        );
    }
}

fn print_category_list(categories: &[Category]) {
    println!("{:<4} {:<8} {:<12} {}", "ID", "COLOR", "ICON", "NAME");
    for category in categories {
        println!(
            "{:<4} {:<8} {:<12} {}",
            category.id, category.color, category.icon, category.name
        );
    }
}

fn print_note_list(notes: &[Note]) {
    println!(
        "{:<4} {:<3} {:<12} {:<16} {:<24} {}",
        "ID", "PIN", "FOLDER", "UPDATED", "TITLE", "PREVIEW"
    );
    for note in notes {
        println!(
            "{:<4} {:<3} {:<12} {:<16} {:<24} {}",
            note.id,
            if note.is_pinned { "*" } else { "" },
            note.folder,
            format_datetime(note.updated_at),
            note.title,
            note_preview(note)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parse_due_understands_shortcuts() {
        let today = day(2024, 6, 11);
        assert_eq!(parse_due("today", today).expect("today"), today);
        assert_eq!(parse_due("Tomorrow", today).expect("tomorrow"), day(2024, 6, 12));
        assert_eq!(parse_due("week", today).expect("week"), day(2024, 6, 18));
        assert_eq!(parse_due("2024-07-01", today).expect("date"), day(2024, 7, 1));
        assert!(parse_due("next tuesday", today).is_err());
    }

    #[test]
    fn parse_due_rejects_dates_past_the_calendar_end() {
        let err = parse_due("tomorrow", NaiveDate::MAX).expect_err("overflow");
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(parse_due("week", NaiveDate::MAX - Days::new(3)).is_err());
        assert_eq!(parse_due("today", NaiveDate::MAX).expect("today"), NaiveDate::MAX);
    }

    #[test]
    fn backend_flag_accepts_env_aliases() {
        for (raw, expected) in [
            ("mock", BackendKind::Memory),
            ("memory", BackendKind::Memory),
            ("remote", BackendKind::Records),
            ("records", BackendKind::Records),
        ] {
            let cli = Cli::try_parse_from(["taskflow", "--backend", raw, "routes"])
                .expect("backend flag parses");
            assert_eq!(cli.backend.map(backend_from_arg), Some(expected));
            assert_eq!(BackendKind::parse(raw).expect("env backend"), expected);
        }
    }

    #[test]
    fn filter_args_fall_back_to_default_range() {
        let filter = task_filter_from_args(
            TaskFilterArgs {
                categories: vec![" Work ".to_string(), String::new()],
                priorities: vec![PriorityArg::High, PriorityArg::High],
                ..Default::default()
            },
            DateRange::All,
        );
        assert_eq!(filter.date_range, DateRange::All);
        assert_eq!(filter.categories.len(), 1);
        assert!(filter.categories.contains("Work"));
        assert_eq!(filter.priorities.len(), 1);
        assert!(!filter.show_completed);
    }

    #[test]
    fn written_lines_become_escaped_paragraphs() {
        assert_eq!(paragraph_html("a < b"), "<p>a &lt; b</p>");
        assert_eq!(paragraph_html("  "), "<p><br></p>");
    }
}
