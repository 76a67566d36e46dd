use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use td_2048::gameplay::play;
use td_2048::model;
use td_2048::ntuple::NTupleError;

#[derive(Debug, Parser)]
#[command(name = "evaluate", about = "Evaluate a trained checkpoint over many greedy games")]
struct Args {
    /// Checkpoint to evaluate
    model: PathBuf,

    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: u64,

    /// Base RNG seed; game i plays with seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

struct GameResult {
    reward: u64,
    max_tile: u32,
    moves: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.games > 0, "need at least one game");

    let checkpoint = model::read_postcard_from_path(&args.model)?;
    println!(
        "evaluating {} ({} games trained)",
        args.model.display(),
        checkpoint.games_played
    );
    let agent = checkpoint.agent;

    // games are independent: one board and one seeded RNG each, value tables
    // shared read-only
    let results: Vec<GameResult> = (0..args.games)
        .into_par_iter()
        .map(|i| -> Result<GameResult, NTupleError> {
            let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(i));
            let gameplay = play(&agent, None, true, &mut rng)?;
            Ok(GameResult {
                reward: gameplay.total_reward,
                max_tile: gameplay.max_tile,
                moves: gameplay.transitions.len().saturating_sub(1),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let games = results.len() as f64;
    let mean_reward = results.iter().map(|r| r.reward as f64).sum::<f64>() / games;
    let best_reward = results.iter().map(|r| r.reward).max().unwrap_or(0);
    let mean_moves = results.iter().map(|r| r.moves as f64).sum::<f64>() / games;
    let reached_2048 = results.iter().filter(|r| r.max_tile >= 2048).count();

    println!(
        "games {} | mean reward {:.0} | best reward {} | mean moves {:.0} | 2048 rate {:.1}%",
        results.len(),
        mean_reward,
        best_reward,
        mean_moves,
        100.0 * reached_2048 as f64 / games,
    );

    let mut histogram: BTreeMap<u32, usize> = BTreeMap::new();
    for result in &results {
        *histogram.entry(result.max_tile).or_insert(0) += 1;
    }
    for (tile, count) in histogram.iter().rev() {
        println!(
            "tile {:>6}: {:>5} games ({:.1}%)",
            tile,
            count,
            100.0 * *count as f64 / games,
        );
    }
    Ok(())
}
