use clap::{value_parser, Args, Parser, Subcommand};

use crate::capture::{CaptureInput, EditInput};
use crate::model::{TaskFilter, TaskStatus};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tacktrack",
    version,
    about = "Track, schedule and complete tasks kept by a TackTrack server.",
    after_help = "Examples:\n  tacktrack                      Show the dashboard (same as `tacktrack dashboard`)\n  tacktrack add Buy milk --at tomorrow\n  tacktrack list --status pending --date today\n  tacktrack calendar --month 2024-06\n  tacktrack --demo today"
)]
pub struct Cli {
    /// Base URL of the task API (defaults to $TACKTRACK_API_URL or http://localhost:5000)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (defaults to $TACKTRACK_TIMEOUT_SECS or 30)
    #[arg(long = "timeout", value_name = "SECONDS", global = true, value_parser = value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Tracing filter written to stderr (e.g. "debug"); RUST_LOG takes precedence
    #[arg(long = "log", value_name = "DIRECTIVE", global = true, default_value = "warn")]
    pub log_filter: String,

    /// Work against a seeded in-memory backend instead of the API
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// List tasks, optionally for one scheduled date
    List(ListArgs),
    /// Show every field of a single task
    Show(IdArgs),
    /// Create a task
    Add(AddArgs),
    /// Change fields of an existing task
    Edit(EditArgs),
    /// Flip a task between pending and completed
    Toggle(IdArgs),
    /// Delete one or more tasks by id
    Delete(DeleteArgs),
    /// Tasks scheduled for today
    Today,
    /// Month grid marking days that have scheduled tasks
    Calendar(CalendarArgs),
    /// Status counts and the most recent tasks (default command)
    Dashboard,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only tasks scheduled on this day (ISO date, today, tomorrow, +3d, mon)
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,

    /// Restrict to one status
    #[arg(long, value_enum, default_value_t = TaskFilter::All)]
    pub status: TaskFilter,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Task title
    #[arg(value_name = "TEXT", required = true)]
    pub text: Vec<String>,

    /// Optional longer description
    #[arg(long)]
    pub description: Option<String>,

    /// Schedule (ISO date or date-time, today, tomorrow, +Nd/+Nw/+Nm, weekday, HH:MM)
    #[arg(long = "at", value_name = "WHEN")]
    pub scheduled: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<TaskStatus>,

    /// New schedule, same forms as `add --at`
    #[arg(long = "at", value_name = "WHEN")]
    pub scheduled: Option<String>,

    /// Remove the task's schedule
    #[arg(long, conflicts_with = "scheduled")]
    pub unschedule: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// One or more task ids to delete
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CalendarArgs {
    /// Month to show as YYYY-MM (defaults to the current month)
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<String>,
}

impl From<AddArgs> for CaptureInput {
    fn from(args: AddArgs) -> Self {
        CaptureInput {
            text: args.text,
            description: args.description,
            scheduled: args.scheduled,
        }
    }
}

impl From<EditArgs> for EditInput {
    fn from(args: EditArgs) -> Self {
        EditInput {
            title: args.title,
            description: args.description,
            status: args.status,
            scheduled: args.scheduled,
            unschedule: args.unschedule,
        }
    }
}
