//! Command-line interface definitions for the `aierror` tool.

use clap::Parser;
use clap_complete::Shell;

/// Explain an error with a hosted or local LLM
#[derive(Parser, Debug)]
#[command(
    name = "aierror",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("AIERROR_GIT_SHA"), ")"),
    about,
    long_about = None
)]
#[command(
    after_help = "EXAMPLES:\n    aierror \"panic: assignment to entry in nil map\"\n    cargo build 2>&1 | aierror\n    aierror --no-local \"segmentation fault\""
)]
pub struct Cli {
    /// Error message to explain
    #[arg(trailing_var_arg = true)]
    pub error: Vec<String>,

    /// Dump raw provider responses on stderr when they can't be used
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Don't fall back to the local Ollama server
    #[arg(long)]
    pub no_local: bool,

    /// List providers and whether they are configured, then exit
    #[arg(long)]
    pub list_providers: bool,

    /// Print the default config file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
