use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{catalog::CatalogArg, high_score::HighScoreArg, simulate::SimulateArg};

mod catalog;
mod high_score;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Auto-play sessions and report their results
    Simulate(#[clap(flatten)] SimulateArg),
    /// Show or reset the stored high score
    HighScore(#[clap(flatten)] HighScoreArg),
    /// Print the shape catalog
    Catalog(#[clap(flatten)] CatalogArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::HighScore(arg) => high_score::run(&arg)?,
        Mode::Catalog(arg) => catalog::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
