use anyhow::{Context, Result};
use log::info;
use std::process::ExitCode;
use std::time::Duration;

use diff_review::cache::DiffCache;
use diff_review::cli;
use diff_review::config::Config;
use diff_review::export::FileSink;
use diff_review::git::{DiffSource, GitSource};
use diff_review::highlight::SyntaxDecorator;
use diff_review::logging;
use diff_review::review::ReviewState;
use diff_review::tui::{App, run_tui};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();

    if args.debug {
        let log_file = logging::init(&std::env::current_dir()?)?;
        info!("logging to {}", log_file.display());
    }

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_cli(&args);

    let repo_dir = match &args.repo {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    // Everything that can fail fatally happens before the terminal is touched.
    let source = GitSource::open(&repo_dir)?;
    let files = source.list_changed_files()?;
    info!(
        "reviewing {} changed files in {}",
        files.len(),
        source.repo_root().display()
    );

    let decorator = if config.display.syntax_highlighting {
        SyntaxDecorator::new()
    } else {
        SyntaxDecorator::plain()
    };
    let cache = DiffCache::new(Box::new(source), Box::new(decorator));
    let state = ReviewState::new(files, cache)
        .with_comment_char_limit(config.display.comment_char_limit);

    let app = App::new(
        state,
        FileSink::new(config.export.directory.clone()),
        Duration::from_secs(config.display.status_timeout_secs),
    );
    run_tui(app)
}
