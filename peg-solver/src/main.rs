//! Peg Solitaire Solver
//!
//! Finds a line of play on a cross-shaped board using depth-first
//! backtracking with leg-loss pruning.

mod config;
mod prune;
mod render;
mod solver;
mod stats;
mod trace;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use peg_core::{Board, BoardConfig};

use crate::config::SolverConfig;
use crate::solver::{SearchEngine, SearchOutcome};
use crate::stats::format_clock;
use crate::trace::Trace;

#[derive(Parser, Debug)]
#[command(name = "pegsol", author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file ([board] and [search] tables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a line of play down to the target pin count
    Solve(SolveArgs),
    /// Replay a saved trace file
    Replay {
        /// Trace written by `solve --trace-out`
        file: PathBuf,
    },
    /// Print the slot indices of a board shape
    Layout(BoardArgs),
}

/// Board shape overrides.
#[derive(Args, Debug)]
struct BoardArgs {
    /// Board side length (odd)
    #[arg(long)]
    side: Option<usize>,

    /// Width of each arm of the cross
    #[arg(long)]
    short_edge: Option<usize>,
}

impl BoardArgs {
    fn apply(&self, board: &mut BoardConfig) {
        if let Some(side) = self.side {
            board.side = side;
        }
        if let Some(short_edge) = self.short_edge {
            board.short_edge = short_edge;
        }
    }
}

#[derive(Args, Debug)]
struct SolveArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Stop once this many pins remain
    #[arg(short, long)]
    target: Option<usize>,

    /// Disable the leg-loss check
    #[arg(long)]
    no_prune: bool,

    /// Only check for lost legs below this many pins
    #[arg(long)]
    prune_below: Option<usize>,

    /// Give up after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// Save the solution as a binary trace file
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Save the solution as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Skip the move-by-move replay
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match &cli.config {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SolverConfig::default(),
    };

    match cli.command {
        Command::Solve(args) => run_solve(config, &args),
        Command::Replay { file } => run_replay(&file),
        Command::Layout(args) => run_layout(config, &args),
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .target(env_logger::Target::Stderr)
    .init();
}

fn run_solve(mut config: SolverConfig, args: &SolveArgs) -> Result<ExitCode> {
    args.board.apply(&mut config.board);
    if let Some(target) = args.target {
        config.search.target_pins = target;
    }
    if args.no_prune {
        config.search.prune = false;
    }
    if let Some(prune_below) = args.prune_below {
        config.search.prune_below_pins = prune_below;
    }
    config.validate()?;

    print!("{}", render::banner());
    if config.search.prune {
        log::info!(
            "Pruning: lost legs below {} pins ({} legs, {} pins per leg)",
            config.search.prune_below_pins,
            config.search.min_lost_legs,
            config.search.pins_per_leg
        );
    } else {
        log::info!("Pruning: off");
    }

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        log::warn!("Interrupt received, stopping search...");
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    if let Some(secs) = args.time_limit {
        spawn_timer(running.clone(), Duration::from_secs(secs));
    }

    let mut engine = SearchEngine::new(config.board, &config.search)?;
    log::info!(
        "Start position: {} pins, {} to remove",
        engine.board().num_pins(),
        engine
            .board()
            .num_pins()
            .saturating_sub(config.search.target_pins)
    );

    let outcome = engine.solve_until(config.search.target_pins, &running);
    engine.stats.log_summary();

    match outcome {
        SearchOutcome::Solved(solution) => {
            if !args.quiet {
                print!("{}", render::render_replay(&solution));
            }
            if let Some(path) = &args.trace_out {
                let count = Trace::from_steps(solution.board, &solution.steps)
                    .save(path)
                    .with_context(|| format!("saving trace {}", path.display()))?;
                log::info!("Saved {} moves to {}", count, path.display());
            }
            if let Some(path) = &args.json_out {
                trace::write_json(path, &solution)
                    .with_context(|| format!("saving JSON {}", path.display()))?;
                log::info!("Saved solution to {}", path.display());
            }
            println!(
                "\nSolved: {} pins left after {} moves",
                solution.final_pins,
                solution.steps.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::Exhausted(report) => {
            println!(
                "\nNo line of play reaches {} pins (best {}, {} dead ends, {})",
                report.target_pins,
                report.best_pins,
                report.dead_ends,
                format_clock(report.elapsed)
            );
            Ok(ExitCode::FAILURE)
        }
        SearchOutcome::Interrupted(report) => {
            println!(
                "\nInterrupted at depth {} with {} pins (target {}, best {} so far, {} dead ends, {})",
                report.depth,
                report.num_pins,
                report.target_pins,
                report.best_pins,
                report.dead_ends,
                format_clock(report.elapsed)
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Clear `running` once `limit` has passed.
fn spawn_timer(running: Arc<AtomicBool>, limit: Duration) {
    std::thread::spawn(move || {
        std::thread::sleep(limit);
        if running.swap(false, Ordering::SeqCst) {
            log::warn!("Time limit of {}s reached", limit.as_secs());
        }
    });
}

fn run_replay(path: &Path) -> Result<ExitCode> {
    let trace =
        Trace::load(path).with_context(|| format!("loading trace {}", path.display()))?;
    let steps = trace.replay()?;
    log::info!(
        "Replaying {} moves on side {}, short edge {}",
        steps.len(),
        trace.board.side,
        trace.board.short_edge
    );

    let board = Board::new(trace.board)?;
    println!("Start position:");
    print!("{}", render::render_board(&trace.board, &board.occupancy()));
    for (i, step) in steps.iter().enumerate() {
        println!("\n[{}/{}]", i + 1, steps.len());
        print!("{}", render::render_step(&trace.board, step));
    }

    let final_pins = steps.last().map_or(board.num_pins(), |s| s.pins());
    println!("\nPins left: {}", final_pins);
    Ok(ExitCode::SUCCESS)
}

fn run_layout(mut config: SolverConfig, args: &BoardArgs) -> Result<ExitCode> {
    args.apply(&mut config.board);
    let board = Board::new(config.board)?;
    println!(
        "side {}, short edge {}: {} slots, {} pins",
        config.board.side,
        config.board.short_edge,
        board.num_slots(),
        board.num_pins()
    );
    print!("{}", render::render_layout(&board));
    Ok(ExitCode::SUCCESS)
}
