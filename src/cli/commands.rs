use clap::{Args, Parser, Subcommand};

use crate::ops::sort::SortKey;

#[derive(Parser)]
#[command(name = "dt", about = concat!("dt v", env!("CARGO_PKG_VERSION"), " - tasks as denote notes"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Notes directory (overrides the config file)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks
    List(ListArgs),
    /// Show one task
    Show(ShowArgs),
    /// Create a task
    New(NewArgs),
    /// Change task status
    Status(StatusArgs),
    /// Mark a task done (shortcut for status <ID> done)
    Done(DoneArgs),
    /// Set a frontmatter field on a task
    Set(SetArgs),
    /// Add, remove or replace tags
    Tag(TagArgs),
    /// Project management
    Project(ProjectCmd),
    /// Show the effective configuration, or write a default config file
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Sort key (priority, due, status, id, created, modified)
    #[arg(long)]
    pub sort: Option<SortKey>,
    /// Reverse the sort order
    #[arg(long)]
    pub reverse: bool,
    /// Named filter (all, active, overdue, today, week, or a status)
    #[arg(long)]
    pub filter: Option<String>,
    /// Only tasks with this status
    #[arg(long)]
    pub status: Option<String>,
    /// Only tasks in this area
    #[arg(long)]
    pub area: Option<String>,
    /// Only tasks of this project (number or identifier)
    #[arg(long)]
    pub project: Option<String>,
    /// Only tasks with this priority
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task number
    pub id: u64,
}

#[derive(Args)]
pub struct NewArgs {
    /// Task title
    pub title: String,
    /// Extra tag (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Estimate (1, 2, 3, 5, 8, 13)
    #[arg(long)]
    pub estimate: Option<String>,
    /// Project number or identifier
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task number
    pub id: u64,
    /// New status (open, done, paused, delegated, dropped)
    pub status: String,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task number
    pub id: u64,
}

#[derive(Args)]
pub struct SetArgs {
    /// Task number
    pub id: u64,
    /// Field name (status, priority, due, start, estimate, project, area, assignee, title)
    pub field: String,
    /// New value; empty clears the field
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Args)]
pub struct TagArgs {
    /// Task number
    pub id: u64,
    /// Tag to add (repeatable)
    #[arg(long)]
    pub add: Vec<String>,
    /// Tag to remove (repeatable)
    #[arg(long)]
    pub remove: Vec<String>,
    /// Replace the whole list (comma separated, empty clears)
    #[arg(long, conflicts_with_all = ["add", "remove"])]
    pub set: Option<String>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects
    List(ProjectListArgs),
    /// Show a project and its tasks
    Show(ProjectKeyArg),
    /// Create a project
    New(ProjectNewArgs),
    /// Change project status
    Status(ProjectStatusArgs),
}

#[derive(Args)]
pub struct ProjectListArgs {
    /// Sort key (priority, due, status, id, created, modified)
    #[arg(long)]
    pub sort: Option<SortKey>,
    #[arg(long)]
    pub reverse: bool,
    /// Named filter (all, open, overdue, or a status)
    #[arg(long)]
    pub filter: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
}

#[derive(Args)]
pub struct ProjectKeyArg {
    /// Project number or identifier
    pub key: String,
}

#[derive(Args)]
pub struct ProjectNewArgs {
    /// Project title
    pub title: String,
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub area: Option<String>,
}

#[derive(Args)]
pub struct ProjectStatusArgs {
    /// Project number or identifier
    pub key: String,
    /// New status (active, completed, paused, cancelled)
    pub status: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a default config file
    Init,
}
