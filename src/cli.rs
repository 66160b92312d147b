mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
pub use terminal::TerminalHost;

/// Tag log lines with regex filters, highlight them and print focus views
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Projects file (JSON)
    #[arg(short, long, global = true, env = "LOG_FOCUS_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "LOG_FOCUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// When to use colors in output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Manage filter groups of the selected project
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
    /// Manage filters of the selected project
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Turn highlighting on or off for a filter or a whole group
    Highlight { state: Toggle, id: String },
    /// Turn focus inclusion on or off for a filter or a whole group
    Show { state: Toggle, id: String },
    /// Print a file with highlighted lines and per-filter counts
    View { file: PathBuf },
    /// Print the focus projection of a file
    Focus { file: PathBuf },
    /// Print the filter tree, with counts for FILE when given
    Tree { file: Option<PathBuf> },
    /// Export the selected project's groups to a JSON file
    Export { path: PathBuf },
    /// Import groups from a JSON or JSON5 file into the selected project
    Import { path: PathBuf },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    Add { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
    Select { id: String },
    /// Rename the selected project (keeps its name when omitted) and save
    Save { name: Option<String> },
    List,
}

#[derive(Subcommand)]
pub enum GroupAction {
    Add { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum FilterAction {
    Add { group: String, regex: String },
    Edit { id: String, regex: String },
    Delete { id: String },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
