use std::path::PathBuf;

use crate::high_score::JsonHighScoreFile;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HighScoreArg {
    /// High score file
    #[arg(long, default_value = "./data/high_score.json")]
    high_score_file: PathBuf,
    /// Reset the stored high score to 0
    #[arg(long)]
    reset: bool,
}

pub(crate) fn run(arg: &HighScoreArg) -> anyhow::Result<()> {
    let HighScoreArg {
        high_score_file,
        reset,
    } = arg;

    let mut store = JsonHighScoreFile::open(high_score_file)?;
    if *reset {
        store.reset()?;
        eprintln!("High score reset");
        eprintln!("  Path: {}", store.path().display());
        return Ok(());
    }

    let record = store.record();
    println!("{}", record.high_score);
    eprintln!("  Path: {}", store.path().display());
    match record.updated_at {
        Some(updated_at) => eprintln!("  Updated at: {updated_at}"),
        None => eprintln!("  Never updated"),
    }
    Ok(())
}
