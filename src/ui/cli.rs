// src/ui/cli.rs

use crate::engine::config::OutputFormat;
use crate::engine::model::AnalysisType;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

// ~~~ CLI Arguments ~~~
#[derive(Parser, Debug, Clone)]
#[clap(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION")
)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding history, login flag and business profile
    #[clap(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Read settings from this TOML file instead of the default location
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable all interactive prompts and the full-screen dashboard
    #[clap(long, global = true)]
    pub no_interactive: bool,

    /// Output format: text or json
    #[clap(short = 'F', long = "output-format", global = true, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Model identifier passed to the API
    #[clap(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Optional path to a custom Handlebars prompt template
    #[clap(short = 'T', long, global = true)]
    pub template: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Collect figures, ask the model and show the dashboard
    Analyze(AnalyzeArgs),

    /// Manage the business profile used to enrich company analyses
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Browse previous analyses
    #[command(subcommand)]
    History(HistoryCommand),

    /// Sign in (no credentials are checked)
    Login {
        /// E-mail shown in the greeting
        #[clap(long)]
        email: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show where prompt templates are looked up
    ListTemplates,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// business (CNPJ) or personal (CPF)
    #[clap(value_enum)]
    pub kind: AnalysisType,

    /// Load the figures from a JSON file instead of asking for them
    #[clap(long, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Use the response text in FILE instead of calling the API
    #[clap(long, value_name = "FILE")]
    pub dry_run: Option<PathBuf>,

    /// Also write the raw response text to FILE
    #[clap(short = 'O', long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Fill in or update the profile
    Edit,
    /// Print the stored profile
    Show,
    /// Delete the stored profile
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List saved analyses, newest first
    List,
    /// Show one saved analysis
    Show {
        /// Record id (a unique prefix is enough)
        id: String,
    },
    /// Delete one saved analysis
    Delete {
        /// Record id (a unique prefix is enough)
        id: String,
    },
    /// Delete every saved analysis
    Clear,
}
