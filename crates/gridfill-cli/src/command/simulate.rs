use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use gridfill_engine::{GameSession, HighScoreStore, ScoringRules, SupplySeed};
use gridfill_evaluator::{
    placement_evaluator::{
        GreedyEvaluator, GreedyWeights, PlacementEvaluator, RandomPlacementEvaluator,
    },
    turn_evaluator::TurnEvaluator,
};

use crate::{
    high_score::JsonHighScoreFile,
    schema::simulation::{SessionRecord, SimulationReport},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum EvaluatorKind {
    #[default]
    Greedy,
    Random,
}

impl EvaluatorKind {
    fn name(self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Random => "random",
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of sessions to play
    #[arg(long, default_value_t = 10)]
    sessions: usize,
    /// Supply seed of the first session (32 hex digits); later sessions count up from it
    #[arg(long)]
    seed: Option<SupplySeed>,
    /// Placement evaluator driving the sessions
    #[arg(long, default_value = "greedy")]
    evaluator: EvaluatorKind,
    /// JSON file with greedy evaluator weights
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Placements after which a session is ended
    #[arg(long, default_value_t = 1000)]
    max_turns: usize,
    /// Simulated frame rate of the session clock
    #[arg(long, default_value_t = 60)]
    fps: u64,
    /// Frames that elapse before each placement
    #[arg(long, default_value_t = 30)]
    frames_per_turn: u64,
    /// JSON file with scoring rule overrides
    #[arg(long)]
    rules: Option<PathBuf>,
    /// High score file
    #[arg(long, default_value = "./data/high_score.json")]
    high_score_file: PathBuf,
    /// Do not read or update the high score file
    #[arg(long)]
    no_high_score: bool,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        sessions,
        seed,
        evaluator,
        weights,
        max_turns,
        fps,
        frames_per_turn,
        rules,
        high_score_file,
        no_high_score,
        output,
    } = arg;

    let rules = util::read_rules_file(rules.as_deref())?;
    let weights = util::read_weights_file(weights.as_deref())?;
    let mut store = if *no_high_score {
        None
    } else {
        Some(JsonHighScoreFile::open(high_score_file)?)
    };
    let base_seed = seed.unwrap_or_else(rand::random::<SupplySeed>);
    let previous_high_score = store.as_ref().map_or(0, HighScoreStore::load);

    eprintln!(
        "Simulating {sessions} sessions with {} evaluator (base seed {base_seed})",
        evaluator.name()
    );

    let mut records = Vec::with_capacity(*sessions);
    for i in 0..*sessions {
        let session_seed = SupplySeed::from_u128(base_seed.to_u128().wrapping_add(i as u128));
        let turn_evaluator =
            TurnEvaluator::new(placement_evaluator(*evaluator, &weights, session_seed));
        let config = SessionConfig {
            fps: *fps,
            frames_per_turn: *frames_per_turn,
            max_turns: *max_turns,
            rules: &rules,
        };
        let record = play_session(&turn_evaluator, session_seed, &config, store.as_mut())
            .with_context(|| format!("Session #{i} (seed {session_seed}) failed"))?;

        eprintln!(
            "  #{i:3}: score {:6}, turns {:4}, lines {:4}, best combo {:2}{}",
            record.final_stats.score(),
            record.turns,
            record.final_stats.total_cleared_lines(),
            record.final_stats.best_combo(),
            if record.game_over { "" } else { " (turn limit)" },
        );
        records.push(record);
    }

    print_summary(&records, previous_high_score);
    if let Some(store) = &store {
        eprintln!("  High score: {} ({})", store.load(), store.path().display());
    }

    let report = SimulationReport {
        generated_at: Utc::now(),
        evaluator: evaluator.name().to_owned(),
        rules,
        sessions: records,
    };
    Output::save_json(&report, output.clone())?;
    if let Some(path) = output {
        eprintln!("Report saved to {}", path.display());
    }

    Ok(())
}

fn placement_evaluator(
    kind: EvaluatorKind,
    weights: &GreedyWeights,
    seed: SupplySeed,
) -> Box<dyn PlacementEvaluator> {
    match kind {
        EvaluatorKind::Greedy => Box::new(GreedyEvaluator::new(weights.clone())),
        EvaluatorKind::Random => {
            #[expect(clippy::cast_possible_truncation)]
            let seed = seed.to_u128() as u64;
            Box::new(RandomPlacementEvaluator::new(seed))
        }
    }
}

struct SessionConfig<'a> {
    fps: u64,
    frames_per_turn: u64,
    max_turns: usize,
    rules: &'a ScoringRules,
}

fn play_session(
    turn_evaluator: &TurnEvaluator<'_>,
    seed: SupplySeed,
    config: &SessionConfig<'_>,
    mut store: Option<&mut JsonHighScoreFile>,
) -> anyhow::Result<SessionRecord> {
    let mut session = GameSession::with_seed(config.fps, seed).with_rules(config.rules.clone());
    if let Some(store) = &store {
        session.load_high_score(&**store);
    }
    session.start()?;

    let mut turns = 0;
    while turns < config.max_turns && session.session_state().is_playing() {
        let Some((plan, _analysis)) = turn_evaluator.select_best_turn(&session) else {
            break;
        };
        for _ in 0..config.frames_per_turn {
            session.increment_frame();
        }
        plan.apply(&mut session).with_context(|| {
            format!(
                "Failed to place {} from slot {} at {}",
                plan.shape(),
                plan.slot(),
                plan.anchor()
            )
        })?;
        turns += 1;
    }

    let game_over = session.is_game_over();
    if !game_over {
        session.end()?;
    }
    if let Some(store) = &mut store {
        let saved = session
            .save_high_score(&mut **store)
            .with_context(|| format!("Failed to update high score {}", session.high_score()))?;
        if saved {
            tracing::info!(score = session.score(), "new high score");
        }
    }

    Ok(SessionRecord {
        seed,
        turns,
        game_over,
        play_time: session.duration().as_secs_f64(),
        final_stats: session.stats().clone(),
    })
}

#[expect(clippy::cast_precision_loss)]
fn print_summary(records: &[SessionRecord], previous_high_score: usize) {
    if records.is_empty() {
        eprintln!("No sessions played");
        return;
    }
    let count = records.len() as f64;
    let scores = records.iter().map(|r| r.final_stats.score());
    let max_score = scores.clone().max().unwrap_or(0);
    let min_score = scores.clone().min().unwrap_or(0);
    let mean_score = scores.sum::<usize>() as f64 / count;
    let mean_turns = records.iter().map(|r| r.turns).sum::<usize>() as f64 / count;
    let game_overs = records.iter().filter(|r| r.game_over).count();

    eprintln!();
    eprintln!("Summary:");
    eprintln!("  Sessions:   {} ({game_overs} ended by game over)", records.len());
    eprintln!("  Score:      min {min_score}, max {max_score}, mean {mean_score:.1}");
    eprintln!("  Turns:      mean {mean_turns:.1}");
    if max_score > previous_high_score {
        eprintln!("  Beat previous high score {previous_high_score}");
    }
}
