//! kidspuzzles CLI
//!
//! Command-line interface for running and inspecting the puzzle environments.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use kidspuzzles::env::{EpisodeStats, PuzzleEnv};
use kidspuzzles::log::{CompositeLogger, ConsoleLogger, JsonLinesLogger, MetricLogger};
use kidspuzzles_envs::registry;
use kidspuzzles_envs::{
    DigitAction, DigitsConfig, DigitsPuzzle, RenderContext, DEFAULT_ENV_ID, RENDER_FPS,
};

#[derive(Parser)]
#[command(name = "kidspuzzles")]
#[command(version, about = "kidspuzzles - digits grid puzzle environments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that builds a puzzle
#[derive(clap::Args)]
struct PuzzleArgs {
    /// Number of digits (overrides the config file)
    #[arg(long)]
    digits: Option<usize>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,
}

impl PuzzleArgs {
    fn load(&self) -> Result<DigitsConfig> {
        let mut config = match &self.config {
            Some(path) => DigitsConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DigitsConfig::default(),
        };
        if let Some(n) = self.digits {
            config.n_digits = n;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List registered environments
    List,

    /// Evaluate a uniform random policy
    Eval {
        /// Environment id
        #[arg(default_value = DEFAULT_ENV_ID)]
        env: String,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: u64,

        /// Write per-episode metrics as JSON lines
        #[arg(long)]
        metrics_out: Option<PathBuf>,

        #[command(flatten)]
        puzzle: PuzzleArgs,
    },

    /// Demo: render a random policy in the terminal
    Demo {
        /// Environment id
        #[arg(default_value = DEFAULT_ENV_ID)]
        env: String,

        /// Number of steps
        #[arg(long, default_value = "100")]
        steps: usize,

        /// Frames per second (0 renders as fast as possible)
        #[arg(long, default_value_t = RENDER_FPS)]
        fps: u32,

        #[command(flatten)]
        puzzle: PuzzleArgs,
    },

    /// Apply named actions (e.g. RIGHT0 UP3) and print each state
    Play {
        /// Actions to apply in order
        #[arg(required = true)]
        actions: Vec<String>,

        #[command(flatten)]
        puzzle: PuzzleArgs,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            list_envs();
        }
        Commands::Eval {
            env,
            episodes,
            metrics_out,
            puzzle,
        } => {
            eval(&env, episodes, metrics_out.as_deref(), &puzzle)?;
        }
        Commands::Demo {
            env,
            steps,
            fps,
            puzzle,
        } => {
            demo(&env, steps, fps, &puzzle)?;
        }
        Commands::Play { actions, puzzle } => {
            play(&actions, &puzzle)?;
        }
    }

    Ok(())
}

fn list_envs() {
    println!("Available environments:");
    println!();
    for spec in registry::specs() {
        println!("  {:<32} {}", spec.id, spec.description);
        println!(
            "  {:<32} max {} steps, {:?} reward",
            "", spec.max_episode_steps, spec.reward_scheme
        );
        println!();
    }
    println!("Digits: 1-10 (grid is 7x4 above five digits, (n+2)x3 otherwise).");
}

fn build_logger(metrics_out: Option<&Path>) -> Result<CompositeLogger> {
    let mut logger = CompositeLogger::new(vec![Box::new(ConsoleLogger::new())]);
    if let Some(path) = metrics_out {
        let file = JsonLinesLogger::create(path)
            .with_context(|| format!("creating metrics file {}", path.display()))?;
        logger.add(Box::new(file));
    }
    Ok(logger)
}

fn eval(env_id: &str, episodes: u64, metrics_out: Option<&Path>, args: &PuzzleArgs) -> Result<()> {
    tracing::info!(env = env_id, episodes, "Starting evaluation (random policy)");

    let config = args.load()?;
    let mut env = EpisodeStats::new(registry::make(env_id, config)?);
    let action_space = env.action_space();
    let logger = build_logger(metrics_out)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let mut total_return = 0.0f64;
    let mut solved = 0u64;

    for ep in 0..episodes {
        env.reset(Some(args.seed.wrapping_add(ep)));

        loop {
            let action = action_space.sample(&mut rng);
            let result = env.step(&action)?;
            if !result.done() {
                continue;
            }

            let episode_return = result.info.episode_return.unwrap_or_default() as f64;
            total_return += episode_return;
            solved += u64::from(result.terminated);

            let mut metrics = BTreeMap::new();
            metrics.insert("episode_return".to_string(), episode_return);
            metrics.insert(
                "episode_length".to_string(),
                result.info.episode_length.unwrap_or_default() as f64,
            );
            metrics.insert("solved".to_string(), f64::from(u8::from(result.terminated)));
            metrics.insert(
                "distance".to_string(),
                result.info.get("distance").unwrap_or_default() as f64,
            );
            logger.log_metrics(&metrics, ep);
            break;
        }
    }
    logger.close();

    let denom = episodes.max(1) as f64;
    tracing::info!(
        avg_return = total_return / denom,
        success_rate = solved as f64 / denom,
        "Evaluation complete"
    );
    Ok(())
}

fn demo(env_id: &str, steps: usize, fps: u32, args: &PuzzleArgs) -> Result<()> {
    tracing::info!(env = env_id, steps, "Running demo");

    let mut env = registry::make(env_id, args.load()?)?;
    let action_space = env.action_space();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut ctx = RenderContext::stdout(fps);

    env.reset(Some(args.seed));
    for step in 0..steps {
        let action = action_space.sample(&mut rng);
        let code = action.iter().next().copied().unwrap_or_default() as usize;
        let name = DigitAction::decode(code, env.inner().n_digits())?;
        let result = env.step(&action)?;

        let frame = format!(
            "{}\n\nstep {:>3}  {:<7} reward {:>8.4}  distance {}",
            env.render().unwrap_or_default(),
            step,
            name.to_string(),
            result.reward,
            result.info.get("distance").unwrap_or_default()
        );
        ctx.present(&frame)?;

        if result.done() {
            tracing::info!(step, solved = result.terminated, "Episode ended, resetting");
            env.reset(None);
        }
    }

    ctx.close()?;
    Ok(())
}

fn play(actions: &[String], args: &PuzzleArgs) -> Result<()> {
    let mut env = DigitsPuzzle::new(args.load()?)?;
    let (_, info) = env.reset_seeded(Some(args.seed));
    println!("{}", env.render().unwrap_or_default());
    println!("distance {}", info.distance);

    for (i, name) in actions.iter().enumerate() {
        let step = match name.parse::<DigitAction>().and_then(|a| env.apply(a).map(|s| (a, s))) {
            Ok(step) => step,
            Err(e) => {
                tracing::warn!(action = %name, error = %e, "Rejected action");
                return Err(e.into());
            }
        };
        let (action, step) = step;

        println!();
        println!(
            "{}: reward={:.4} terminated={} clipped={}",
            action, step.reward, step.terminated, step.clipped
        );
        println!("{}", env.render().unwrap_or_default());

        if step.terminated {
            if i + 1 < actions.len() {
                let ignored = actions.len() - i - 1;
                tracing::warn!(ignored, "Puzzle solved, ignoring remaining actions");
            }
            println!("solved");
            break;
        }
    }

    Ok(())
}
