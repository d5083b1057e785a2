use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nx", about = concat!("[>] nextup v", env!("CARGO_PKG_VERSION"), " - dump it in, see what's next"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quick-add a task from free text (time, today/tomorrow, ASAP/!!, ~, @client)
    Add(AddArgs),
    /// List open tasks
    List(ListArgs),
    /// Show the single next action, globally or for one client
    Next(NextArgs),
    /// Show every task grouped by bucket, done tasks last
    All,
    /// Show tasks that slipped from earlier days
    Missed,
    /// Search task titles
    Search(SearchArgs),
    /// Toggle a task done/open
    Done(IdArg),
    /// Permanently delete a task
    Delete(IdArg),
    /// Bring a task back onto today's plate
    Today(IdArg),
    /// Park a task in the backlog
    Backlog(IdArg),
    /// Arm a one-shot reminder on a task
    Remind(RemindArgs),
    /// Push a task's reminder forward
    Snooze(SnoozeArgs),
    /// Move stale today-tasks to carryover
    Sweep,
    /// Poll for due reminders and print them as they fire
    Watch(WatchArgs),
    /// Client management
    #[command(subcommand)]
    Client(ClientCmd),
}

#[derive(Args)]
pub struct AddArgs {
    /// The raw quick-add text
    #[arg(required = true)]
    pub text: Vec<String>,
    /// File the task under this client (name or slug)
    #[arg(long)]
    pub client: Option<String>,
    /// Create clients for unmatched @mentions instead of failing
    #[arg(long)]
    pub create_clients: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by bucket (today, backlog, carryover)
    #[arg(long)]
    pub bucket: Option<String>,
    /// Filter by client (name or slug)
    #[arg(long)]
    pub client: Option<String>,
    /// Show done tasks instead of open ones
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct NextArgs {
    /// Resolve within one client's tasks only
    #[arg(long)]
    pub client: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Case-insensitive substring to look for in titles
    pub query: String,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID like T-0042
    pub id: String,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Task ID like T-0042
    pub id: String,
    /// Minutes from now
    #[arg(long = "in", value_name = "MINUTES")]
    pub minutes: i64,
}

#[derive(Args)]
pub struct SnoozeArgs {
    /// Task ID like T-0042
    pub id: String,
    /// Minutes to push the reminder forward (default from config)
    #[arg(long)]
    pub minutes: Option<i64>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Run a single poll pass and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Subcommand)]
pub enum ClientCmd {
    /// Add a client
    Add(ClientAddArgs),
    /// List clients with open-task counts
    List,
    /// Delete a client and all of its tasks
    Delete(IdArg),
}

#[derive(Args)]
pub struct ClientAddArgs {
    /// Client name, e.g. "Acme Corp"
    #[arg(required = true, trailing_var_arg = true)]
    pub name: Vec<String>,
}
