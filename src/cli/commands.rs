use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "trail", about = concat!("trail v", env!("CARGO_PKG_VERSION"), " - routes through your task lists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read trail.toml from a different directory
    #[arg(short = 'C', long = "config-dir", global = true)]
    pub config_dir: Option<String>,

    /// List tab to operate on (tab1, tab2, tab3; default from config)
    #[arg(long, global = true)]
    pub tab: Option<String>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage routes of the current catalog
    Route(RouteCmd),
    /// Add, remove or complete route placeholders
    Placeholder(PlaceholderCmd),
    /// Change a task's saved state
    Task(TaskCmd),
    /// Render the task list and print its visible rows
    List(ListArgs),
    /// Collapse or expand a section of the active route
    Collapse(CollapseArgs),
    /// Open the interactive list view
    Tui,
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RouteCmd {
    #[command(subcommand)]
    pub action: RouteAction,
}

#[derive(Subcommand)]
pub enum RouteAction {
    /// List routes saved for this tab and catalog
    List,
    /// Show a route's sections and items
    Show(RouteNameArg),
    /// Import a route from a JSON file
    Import(RouteImportArgs),
    /// Print a route as JSON
    Export(RouteNameArg),
    /// Make a route the active route
    Activate(RouteNameArg),
    /// Clear the active route
    Deactivate,
    /// Delete a route
    Remove(RouteNameArg),
}

#[derive(Args)]
pub struct RouteNameArg {
    /// Route name
    pub name: String,
}

#[derive(Args)]
pub struct RouteImportArgs {
    /// Path to the route JSON file
    pub file: String,
    /// Also make the imported route active
    #[arg(long)]
    pub activate: bool,
}

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct PlaceholderCmd {
    #[command(subcommand)]
    pub action: PlaceholderAction,
}

#[derive(Subcommand)]
pub enum PlaceholderAction {
    /// Insert a placeholder next to a task of the active route
    Insert(PlaceholderInsertArgs),
    /// Remove a placeholder from the active route
    Remove(PlaceholderIdArg),
    /// Mark a placeholder done
    Done(PlaceholderIdArg),
    /// Mark a placeholder not done
    Undo(PlaceholderIdArg),
}

#[derive(Args)]
pub struct PlaceholderInsertArgs {
    /// Task the placeholder is placed next to
    pub task_id: i32,
    /// Placeholder kind (bank, home_teleport, fairy_ring, or any other word)
    #[arg(default_value = "bank")]
    pub kind: String,
    /// Insert before the task instead of after it
    #[arg(long)]
    pub before: bool,
}

#[derive(Args)]
pub struct PlaceholderIdArg {
    /// Placeholder id
    pub id: String,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Mark a task completed
    Complete(TaskIdArg),
    /// Mark a task not completed
    Uncomplete(TaskIdArg),
    /// Track a task (or stop tracking with --off)
    Track(TaskToggleArgs),
    /// Ignore a task (or stop ignoring with --off)
    Ignore(TaskToggleArgs),
    /// Add or remove a tag
    Tag(TaskTagArgs),
}

#[derive(Args)]
pub struct TaskIdArg {
    /// Task id
    pub id: i32,
}

#[derive(Args)]
pub struct TaskToggleArgs {
    /// Task id
    pub id: i32,
    /// Clear the flag instead of setting it
    #[arg(long)]
    pub off: bool,
}

#[derive(Args)]
pub struct TaskTagArgs {
    /// Task id
    pub id: i32,
    /// Action: "add" or "rm"
    pub action: String,
    /// Tag name
    pub tag: String,
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Sort by (default, name, tier, points, completion)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// Completion filter (all, complete, incomplete)
    #[arg(long)]
    pub completed: Option<String>,
    /// Case-insensitive text filter on name and description
    #[arg(long)]
    pub text: Option<String>,
    /// Only show tasks carrying one of these tags (saved for the tab)
    #[arg(long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct CollapseArgs {
    /// Section name
    pub section: String,
}
