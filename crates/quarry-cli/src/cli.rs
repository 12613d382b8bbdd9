use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity (-v shows executed statements, -vv builder state)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as json
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Disable colors in log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    /// Database file, overriding the configured path
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub db: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Filter flags shared by select, update and delete.
#[derive(ClapArgs, Default)]
pub struct FilterArgs {
    /// Column filter as column=value; repeated flags are ANDed in one group
    #[arg(short, long = "where", value_name = "COLUMN=VALUE")]
    pub where_: Vec<String>,

    /// Column filter as column=value; repeated flags form one group joined with OR
    #[arg(long, value_name = "COLUMN=VALUE")]
    pub or_where: Vec<String>,

    /// Raw predicate, ANDed as its own group
    #[arg(long, value_name = "SQL")]
    pub where_raw: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select rows from a table
    #[command(arg_required_else_help = true)]
    #[clap(name = "select", visible_alias = "s")]
    Select {
        /// Table to select from
        #[arg(required = true)]
        table: String,

        /// Columns to select, comma separated (default: *)
        #[arg(short = 'C', long, value_delimiter = ',')]
        columns: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Table to join
        #[arg(long)]
        join: Option<String>,

        /// Join method: inner, left, right or full
        #[arg(long, default_value = "inner")]
        join_type: String,

        /// Join condition
        #[arg(long)]
        on: Option<String>,

        /// Ordering as column or column:asc|desc, comma separated
        #[arg(short, long, value_delimiter = ',')]
        order_by: Vec<String>,

        /// Page to fetch; enables pagination
        #[arg(short, long)]
        page: Option<u32>,

        /// Request query string to read the page from, such as "page=3&sort=name"
        #[arg(long, conflicts_with = "page")]
        request: Option<String>,

        /// Rows per page; enables pagination
        #[arg(long)]
        per_page: Option<u32>,

        /// Only return the first row
        #[arg(long, conflicts_with_all = ["count", "page", "per_page", "request"])]
        first: bool,

        /// Print the number of matching rows instead of the rows
        #[arg(long)]
        count: bool,

        /// Print the compiled statement without running it
        #[arg(long)]
        explain: bool,
    },

    /// Insert one row
    #[command(arg_required_else_help = true)]
    Insert {
        /// Table to insert into
        #[arg(required = true)]
        table: String,

        /// Column value as column=value
        #[arg(short, long, required = true, value_name = "COLUMN=VALUE")]
        set: Vec<String>,
    },

    /// Update filtered rows
    #[command(arg_required_else_help = true)]
    Update {
        /// Table to update
        #[arg(required = true)]
        table: String,

        /// Column value as column=value
        #[arg(short, long, required = true, value_name = "COLUMN=VALUE")]
        set: Vec<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Update every row when no filter is given
        #[arg(long)]
        all: bool,
    },

    /// Delete filtered rows
    #[command(arg_required_else_help = true)]
    Delete {
        /// Table to delete from
        #[arg(required = true)]
        table: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Delete every row when no filter is given
        #[arg(long)]
        all: bool,
    },

    /// Run a raw statement
    #[command(arg_required_else_help = true)]
    Exec {
        /// Statement with ? placeholders
        #[arg(required = true)]
        sql: String,

        /// Placeholder value, in order
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Print the rows returned by the statement
        #[arg(short, long)]
        fetch: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write an annotated default configuration file
    Init,

    /// Print the configuration file path
    Path,
}
