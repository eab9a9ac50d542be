use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "diff-review",
    version,
    about = "Review uncommitted changes and leave line comments"
)]
pub struct Cli {
    /// Repository to review (defaults to the current directory).
    #[arg(short = 'C', long = "repo", value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory where saved review reports are written.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Disable syntax highlighting (diff coloring is kept).
    #[arg(long)]
    pub no_highlight: bool,

    /// Write a debug log to debug.log in the working directory.
    #[arg(long)]
    pub debug: bool,
}

/// Parse CLI arguments.
pub fn parse_args() -> Cli {
    Cli::parse()
}
