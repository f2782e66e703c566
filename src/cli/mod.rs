//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};

pub mod commands;

/// Project board and sub-issue management for GitHub Projects v2
#[derive(Parser, Debug)]
#[command(name = "pmu", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List issues on the configured project board
    List(ListArgs),

    /// List projects owned by a user or organization
    Projects(ProjectsArgs),

    /// Manage parent/child issue links
    Sub {
        #[command(subcommand)]
        command: SubCommands,
    },

    /// Split an issue into sub-issues, one per checklist task
    Split(SplitArgs),

    /// Move issues to new field values on the board
    Move(MoveArgs),

    /// Show version information
    Version,
}

/// Arguments for the list command.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only show items from this repository (owner/repo)
    #[arg(long, short = 'r')]
    pub repo: Option<String>,

    /// Only show items whose Status field matches this value
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Only show items whose Priority field matches this value
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Maximum number of items to show (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

/// Arguments for the projects command.
#[derive(Args, Debug, Default)]
pub struct ProjectsArgs {
    /// Owner login (defaults to the configured project owner)
    pub owner: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Link an existing issue as a child of a parent
    Add(SubAddArgs),
    /// Remove a parent/child link
    Remove(SubRemoveArgs),
    /// Create a new issue and link it under a parent
    Create(SubCreateArgs),
    /// List an issue's children, parent, or siblings
    List(SubListArgs),
    /// Show the sub-issue tree rooted at an issue
    Tree(SubTreeArgs),
}

#[derive(Args, Debug)]
pub struct SubAddArgs {
    /// Parent issue (123, #123, or owner/repo#123)
    pub parent: String,

    /// Child issue
    pub child: String,
}

#[derive(Args, Debug)]
pub struct SubRemoveArgs {
    /// Parent issue
    pub parent: String,

    /// Child issue
    pub child: String,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct SubCreateArgs {
    /// Parent issue
    pub parent: String,

    /// Title for the new issue
    #[arg(long, short = 't')]
    pub title: String,

    /// Body for the new issue
    #[arg(long, short = 'b', default_value = "")]
    pub body: String,

    /// Create the issue in this repository instead of the parent's
    #[arg(long, short = 'r')]
    pub repo: Option<String>,

    /// Do not copy the parent's labels
    #[arg(long)]
    pub no_inherit_labels: bool,

    /// Copy the parent's assignees
    #[arg(long)]
    pub inherit_assignees: bool,

    /// Do not copy the parent's milestone
    #[arg(long)]
    pub no_inherit_milestone: bool,
}

#[derive(Args, Debug)]
pub struct SubListArgs {
    /// Anchor issue
    pub issue: String,

    /// Which relatives to list (children, parent, siblings)
    #[arg(long, default_value = "children")]
    pub relation: String,

    /// Filter by state (open, closed, all)
    #[arg(long, short = 's', default_value = "all")]
    pub state: String,

    /// Maximum number of entries (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct SubTreeArgs {
    /// Root issue
    pub issue: String,

    /// Maximum depth (default: 10)
    #[arg(long, default_value_t = 10)]
    pub max_depth: usize,
}

/// Arguments for the split command.
#[derive(Args, Debug, Default)]
pub struct SplitArgs {
    /// Parent issue to split
    pub parent: String,

    /// Title for one new sub-issue (repeatable)
    #[arg(long = "task", short = 't')]
    pub tasks: Vec<String>,

    /// Take task titles from unchecked checklist items in the parent body
    #[arg(long)]
    pub from_body: bool,

    /// Preview without creating anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the move command.
#[derive(Args, Debug, Default)]
pub struct MoveArgs {
    /// Issues to move (123, #123, or owner/repo#123; repeatable)
    pub issues: Vec<String>,

    /// New status (aliases from .pmu.yml accepted)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// New priority (aliases from .pmu.yml accepted)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Additional field change as key=value (repeatable)
    #[arg(long, short = 'f', value_name = "KEY=VALUE")]
    pub field: Vec<String>,

    /// Also move every descendant sub-issue
    #[arg(long, short = 'R')]
    pub recursive: bool,

    /// Preview without updating anything
    #[arg(long)]
    pub dry_run: bool,
}
