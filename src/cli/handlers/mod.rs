mod config;
mod project;

pub use config::cmd_config;
pub use project::cmd_project;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::id_counter::IdAllocator;
use crate::io::lock::FileLock;
use crate::io::note_io::WriteOutcome;
use crate::model::config::Config;
use crate::model::task::Task;
use crate::ops::filter::{self, TaskFilter};
use crate::ops::task_ops::{self, NewTask, TaskError};
use crate::ops::{scan, sort};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved configuration and notes directory for one invocation
pub struct Context {
    pub config: Config,
    pub config_path: PathBuf,
    pub dir: PathBuf,
    pub json: bool,
}

impl Context {
    /// Precedence for the notes directory: `-C`, then `notes_directory`
    /// from the config file, then the current directory.
    pub fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = cli
            .config
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(config_io::config_path);
        let config = config_io::read_config_from(&config_path)?;
        let dir = match (&cli.dir, &config.notes_directory) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(dir)) => config_io::expand_home(dir),
            (None, None) => std::env::current_dir()?,
        };
        Ok(Context {
            config,
            config_path,
            dir,
            json: cli.json,
        })
    }

    /// The notes directory, which must exist
    pub fn notes_dir(&self) -> Result<&Path, Box<dyn std::error::Error>> {
        if !self.dir.is_dir() {
            return Err(format!("notes directory not found: {}", self.dir.display()).into());
        }
        Ok(&self.dir)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.config.lock_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::load(&cli)?;
    tracing::debug!(dir = %ctx.dir.display(), config = %ctx.config_path.display(), "resolved context");

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),

        // Write commands
        Commands::New(args) => cmd_new(&ctx, args),
        Commands::Status(args) => cmd_status(&ctx, args),
        Commands::Done(args) => cmd_status(
            &ctx,
            StatusArgs {
                id: args.id,
                status: "done".to_string(),
            },
        ),
        Commands::Set(args) => cmd_set(&ctx, args),
        Commands::Tag(args) => cmd_tag(&ctx, args),

        Commands::Project(cmd) => cmd_project(&ctx, cmd),
        Commands::Config(cmd) => cmd_config(&ctx, cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn find_task(dir: &Path, id: u64) -> Result<Task, TaskError> {
    scan::find_task_by_id(dir, id)?.ok_or(TaskError::NotFound(id))
}

/// A project key given on the command line, as tasks store it
fn resolve_project_key(dir: &Path, key: &str) -> Result<String, TaskError> {
    scan::find_project(dir, key)?
        .map(|p| p.key().to_string())
        .ok_or_else(|| TaskError::ProjectNotFound(key.to_string()))
}

fn report(outcome: WriteOutcome, path: &Path, done: String) {
    match outcome {
        WriteOutcome::Written => println!("{}", done),
        WriteOutcome::Skipped => eprintln!(
            "warning: frontmatter in {} is not properly closed; nothing changed",
            path.display()
        ),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn list_filters(ctx: &Context, args: &ListArgs) -> Result<Vec<TaskFilter>, Box<dyn std::error::Error>> {
    let name = args.filter.as_deref().unwrap_or(&ctx.config.filter);
    let named = TaskFilter::parse(name).ok_or_else(|| {
        format!(
            "unknown filter '{}' (expected: all, active, overdue, today, week, or a status)",
            name
        )
    })?;

    let mut filters = vec![named];
    if let Some(status) = &args.status {
        filters.push(TaskFilter::Status(task_ops::validate_status(status)?));
    }
    if let Some(area) = &args.area {
        filters.push(TaskFilter::Area(area.trim().to_string()));
    }
    if let Some(project) = &args.project {
        filters.push(TaskFilter::Project(resolve_project_key(&ctx.dir, project)?));
    }
    if let Some(priority) = &args.priority
        && let Some(p) = task_ops::validate_priority(priority)?
    {
        filters.push(TaskFilter::Priority(p));
    }
    Ok(filters)
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let dir = ctx.notes_dir()?;
    let filters = list_filters(ctx, &args)?;
    let mut tasks = filter::filter_tasks(scan::scan_tasks(dir)?, &filters, today());
    let key = args.sort.unwrap_or(ctx.config.sort);
    sort::sort_tasks(&mut tasks, key, ctx.config.reverse != args.reverse);

    if ctx.json {
        let items: Vec<TaskJson> = tasks.iter().map(task_to_json).collect();
        return print_json(&items);
    }
    if tasks.is_empty() {
        println!("no tasks");
    }
    for task in &tasks {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    let task = find_task(ctx.notes_dir()?, args.id)?;
    if ctx.json {
        return print_json(&task_to_json(&task));
    }
    for line in format_task_detail(&task) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_new(ctx: &Context, args: NewArgs) -> CmdResult {
    let dir = ctx.notes_dir()?;
    let project = args
        .project
        .as_deref()
        .map(|key| resolve_project_key(dir, key))
        .transpose()?;
    let new = NewTask {
        title: args.title,
        tags: args.tags,
        priority: args.priority,
        due_date: args.due,
        start_date: args.start,
        estimate: args.estimate,
        project,
        area: args.area.or_else(|| ctx.config.default_area.clone()),
        assignee: args.assignee,
    };

    // Cross-process: only one dt allocates in this directory at a time
    let _lock = FileLock::acquire(dir, ctx.lock_timeout())?;
    let alloc = IdAllocator::open(dir)?;
    let task = task_ops::create_task(dir, &alloc, &new)?;

    if ctx.json {
        return print_json(&task_to_json(&task));
    }
    println!("{} {}", task.meta.task_id, task.path.display());
    Ok(())
}

fn cmd_status(ctx: &Context, args: StatusArgs) -> CmdResult {
    let status = task_ops::validate_status(&args.status)?;
    let task = find_task(ctx.notes_dir()?, args.id)?;
    let outcome = task_ops::set_status(&task.path, status.as_str())?;
    report(outcome, &task.path, format!("{} → {}", args.id, status));
    Ok(())
}

fn cmd_set(ctx: &Context, args: SetArgs) -> CmdResult {
    let dir = ctx.notes_dir()?;
    let task = find_task(dir, args.id)?;
    let value = if args.field == "project" && !args.value.trim().is_empty() {
        resolve_project_key(dir, &args.value)?
    } else {
        args.value
    };
    let outcome = task_ops::set_field(&task.path, &args.field, &value)?;
    report(
        outcome,
        &task.path,
        format!("{} {} = {}", args.id, args.field, value),
    );
    Ok(())
}

fn cmd_tag(ctx: &Context, args: TagArgs) -> CmdResult {
    let task = find_task(ctx.notes_dir()?, args.id)?;

    if let Some(list) = &args.set {
        let tags: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        task_ops::set_tags(&task.path, &tags)?;
    }
    for tag in &args.add {
        task_ops::add_tag(&task.path, tag)?;
    }
    for tag in &args.remove {
        task_ops::remove_tag(&task.path, tag)?;
    }

    let tags = task_ops::read_tags(&task.path)?;
    if ctx.json {
        return print_json(&tags);
    }
    println!("{} tags: {}", args.id, tags.join(", "));
    Ok(())
}
