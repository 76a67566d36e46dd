use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use walkdir::WalkDir;

use td_2048::agent::Agent;
use td_2048::gameplay::{learn_from_gameplay, play};
use td_2048::model::{self, Checkpoint};

const CHECKPOINT_EXT: &str = "ntnet";

#[derive(Debug, Parser)]
#[command(name = "train", about = "Train the n-tuple 2048 agent with TD(0) self-play")]
struct Args {
    /// Number of training sessions
    #[arg(long, default_value_t = 50)]
    sessions: u32,

    /// Episodes per session
    #[arg(long, default_value_t = 100)]
    episodes: u32,

    /// Learning rate
    #[arg(long, default_value_t = 0.1)]
    alpha: f64,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Load this checkpoint before training
    #[arg(long)]
    load: Option<PathBuf>,

    /// Checkpoint directory: resume from the newest .ntnet inside (unless
    /// --load is given) and save the trained agent there
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Write the trained checkpoint to this exact path (overrides --dir
    /// naming)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Suppress the spinner status line
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (mut games_played, mut agent) = load_agent(&args)?;
    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pb = if !args.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} | {msg}")?
                .tick_chars("⠁⠃⠇⠧⠷⠿⠻⠟⠯⠷⠧⠇⠃"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut episodes_done = 0u64;
    for session in 1..=args.sessions {
        let mut rewards = Vec::with_capacity(args.episodes as usize);
        let mut max_tiles = Vec::with_capacity(args.episodes as usize);
        for _ in 0..args.episodes {
            let gameplay = play(&agent, None, true, &mut rng)?;
            learn_from_gameplay(&mut agent, &gameplay, args.alpha)?;
            games_played += 1;
            episodes_done += 1;
            rewards.push(gameplay.total_reward as f64);
            max_tiles.push(gameplay.max_tile);
            if let Some(pb) = &pb {
                let rate = episodes_done as f64 / start.elapsed().as_secs_f64().max(1e-6);
                pb.set_message(format!(
                    "games: {} | episodes/sec: {:.1}",
                    games_played, rate
                ));
            }
        }

        let mean_reward = rewards.iter().sum::<f64>() / rewards.len() as f64;
        let mean_max_tile =
            max_tiles.iter().map(|&t| t as f64).sum::<f64>() / max_tiles.len() as f64;
        let reached_2048 = max_tiles.iter().filter(|&&t| t >= 2048).count();
        let best_tile = max_tiles.iter().copied().max().unwrap_or(0);
        let line = format!(
            "session {:>4} | games {:>8} | mean reward {:>8.0} | mean max tile {:>6.0} | 2048 rate {:>5.1}% | best tile {}",
            session,
            games_played,
            mean_reward,
            mean_max_tile,
            100.0 * reached_2048 as f64 / max_tiles.len() as f64,
            best_tile,
        );
        match &pb {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if let Some(path) = save_path(&args, games_played) {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let checkpoint = Checkpoint {
            games_played,
            agent,
        };
        model::write_postcard_to_path(&path, &checkpoint)?;
        println!("agent saved to {}", path.display());
    }
    Ok(())
}

fn load_agent(args: &Args) -> anyhow::Result<(u64, Agent)> {
    let path = match (&args.load, &args.dir) {
        (Some(path), _) => {
            anyhow::ensure!(path.is_file(), "checkpoint '{}' not found", path.display());
            Some(path.clone())
        }
        (None, Some(dir)) => newest_checkpoint(dir),
        (None, None) => None,
    };
    match path {
        Some(path) => {
            let checkpoint = model::read_postcard_from_path(&path)?;
            println!(
                "loaded {}, {} games played",
                path.display(),
                checkpoint.games_played
            );
            Ok((checkpoint.games_played, checkpoint.agent))
        }
        None => {
            println!("initialized a fresh agent");
            Ok((0, Agent::default()))
        }
    }
}

fn newest_checkpoint(dir: &Path) -> Option<PathBuf> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != CHECKPOINT_EXT) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        if best.as_ref().map_or(true, |(at, _)| modified > *at) {
            best = Some((modified, path.to_path_buf()));
        }
    }
    best.map(|(_, path)| path)
}

fn save_path(args: &Args, games_played: u64) -> Option<PathBuf> {
    if let Some(path) = &args.save {
        return Some(path.clone());
    }
    args.dir
        .as_ref()
        .map(|dir| dir.join(format!("agent-{}games.{}", games_played, CHECKPOINT_EXT)))
}
