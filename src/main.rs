use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use skill_learner::cli;
use skill_learner::config::LearnerConfig;
use skill_learner::store::CounterStore;

#[derive(Parser)]
#[command(name = "skill-learner", version)]
#[command(
    about = "Learn from skill usage and improve documentation",
    long_about = None
)]
struct Cli {
    /// Path to usage/feedback log file
    #[arg(long)]
    feedback_file: Option<PathBuf>,

    /// Path to error log file
    #[arg(long)]
    analyze_errors: Option<PathBuf>,

    /// Generate improvement suggestions
    #[arg(long)]
    suggest_improvements: bool,

    /// Path to skill directory (defaults to the parent of the binary's directory)
    #[arg(long)]
    skill_dir: Option<PathBuf>,

    /// Path to config file (defaults to <skill-dir>/learner.toml or ~/.config/skill-learner/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn has_work(&self) -> bool {
        self.feedback_file.is_some() || self.analyze_errors.is_some() || self.suggest_improvements
    }
}

/// `<dir of binary>/..`, matching a binary installed under `<skill>/scripts/`.
fn default_skill_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.has_work() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let skill_dir = cli.skill_dir.clone().unwrap_or_else(default_skill_dir);
    debug!("Skill directory: {}", skill_dir.display());

    let config = LearnerConfig::load_with_path(cli.config.as_deref(), &skill_dir)?;
    let mut store = CounterStore::load(skill_dir.join(&config.counters_file))?
        .with_feedback_limit(config.feedback_limit);

    if let Some(path) = &cli.feedback_file {
        cli::feedback::run(path, &mut store, &config)?;
    }

    if let Some(path) = &cli.analyze_errors {
        cli::errors::run(path, &mut store, &config)?;
    }

    if cli.suggest_improvements {
        cli::suggest::run(&skill_dir, &store, &config)?;
    }

    Ok(())
}
