use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;

use snake_evo::viewer::{self, Pilot};
use snake_evo::{Board, DecisionModel, EvolutionLoop, GameSimulator, Manual, TrainingConfig, ViewerConfig, evaluate};

#[derive(Parser)]
#[command(name = "snake-evo", version, about = "Evolve and watch a neural-network snake")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hill-climb the network weights
    Train(TrainArgs),
    /// Watch a saved model play
    Watch(WatchArgs),
    /// Play with the keyboard
    Play {
        #[arg(long, default_value_t = ViewerConfig::PLAY_TICK_MS)]
        tick_ms: u64,
        #[command(flatten)]
        board: BoardArgs,
    },
    /// Score a saved model over many games
    Evaluate {
        #[arg(long)]
        weights: PathBuf,
        #[arg(long, default_value_t = 100)]
        games: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        board: BoardArgs,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// JSON file with training settings
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    generations: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Weight file written on every improvement [default: config value, then alpha.csv]
    #[arg(long)]
    weights: Option<PathBuf>,
    /// Start from the weights file instead of random weights
    #[arg(long)]
    resume: bool,
    /// Write the final summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Args)]
struct WatchArgs {
    #[arg(long)]
    weights: PathBuf,
    #[arg(long, default_value_t = ViewerConfig::WATCH_TICK_MS)]
    tick_ms: u64,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the board after every step instead of opening a window
    #[arg(long)]
    ascii: bool,
    #[command(flatten)]
    board: BoardArgs,
}

#[derive(Args, Clone, Copy)]
struct BoardArgs {
    #[arg(long, default_value_t = 20)]
    width: i32,
    #[arg(long, default_value_t = 20)]
    height: i32,
}

impl BoardArgs {
    fn board(self) -> Result<Board> {
        let board = Board::new(self.width, self.height);
        if !board.fits_start() {
            bail!("board {}x{} is too small, need at least {}x{}", self.width, self.height, Board::MIN_WIDTH, Board::MIN_HEIGHT);
        }
        Ok(board)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(args),
        Command::Watch(args) => watch(args),
        Command::Play { tick_ms, board } => {
            let config = ViewerConfig { board: board.board()?, tick_ms, ..ViewerConfig::default() };
            viewer::run(config, Pilot::Keys(Manual::default()), None)
        }
        Command::Evaluate { weights, games, seed, json, board } => {
            let model = load_model(&weights)?;
            let summary = evaluate::evaluate(&model, board.board()?, games, seed);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                info!(
                    games = summary.games,
                    mean = summary.mean_score,
                    min = summary.min_score,
                    max = summary.max_score,
                    mean_length = summary.mean_length,
                    deaths = summary.deaths,
                    "evaluation finished"
                );
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn load_model(path: &Path) -> Result<DecisionModel> {
    DecisionModel::load(path).with_context(|| format!("loading weights from {}", path.display()))
}

fn train(args: TrainArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let weights = config.resolve_weights_path(args.weights.clone()).to_path_buf();

    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let alpha = if args.resume {
        load_model(&weights)?
    } else {
        DecisionModel::random(&mut rng, config.init_epsilon)
    };

    info!(
        generations = config.generations,
        board = %format!("{}x{}", config.board.width, config.board.height),
        weights = %weights.display(),
        resume = args.resume,
        "starting training"
    );
    let started = Instant::now();
    let mut evo = EvolutionLoop::new(alpha, config, rng)?;
    let summary = evo.run().context("training aborted")?;
    info!(
        improvements = summary.improvements,
        best_fitness = summary.best_fitness,
        best_score = summary.best_score,
        elapsed_s = started.elapsed().as_secs_f64(),
        "training finished"
    );

    if let Some(path) = &args.summary {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }
    Ok(())
}

fn watch(args: WatchArgs) -> Result<()> {
    let model = load_model(&args.weights)?;
    let board = args.board.board()?;

    if args.ascii {
        let mut rng = match args.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut game = GameSimulator::new(board, &model, &mut rng);
        let score = game.play_observed(&mut rng, |g| {
            println!("step {} score {}\n{g}", g.steps(), g.score());
        });
        info!(score, length = game.body().len(), steps = game.steps(), "game over");
        return Ok(());
    }

    let config = ViewerConfig { board, tick_ms: args.tick_ms, ..ViewerConfig::default() };
    viewer::run(config, Pilot::Model(model), args.seed)
}
