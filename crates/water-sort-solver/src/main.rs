//! CLI entry point for the water-sort solver.
//!
//! Usage:
//!   water-sort-solver solve <puzzle.json> [options]
//!   water-sort-solver solve --stdin [options]
//!   water-sort-solver verify <puzzle.json> --solution <moves.json>
//!   water-sort-solver sample
//!
//! Options for `solve`:
//!   --strategy <iddfs|bfs>   Search engine (default: iddfs)
//!   --max-depth <n>          Deepest IDDFS limit (default: 120)
//!   --max-iterations <n>     BFS expansion cap (default: 1000000)
//!   --every-count            Emit every transferable count, not just the full block
//!
//! Set `RUST_LOG=debug` to see search progress on stderr.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use water_sort_solver::{
    replay, solve, Configuration, Move, MoveGeneration, PuzzleError, PuzzleFile, ReplayMetrics,
    SearchStatus, SolverConfig, Strategy,
};

#[derive(Parser)]
#[command(name = "water-sort-solver")]
#[command(about = "Bounded IDDFS/BFS solver for water-sort puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a sequence of moves that solves a puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Search engine to run
        #[arg(long, value_enum, default_value = "iddfs")]
        strategy: StrategyArg,

        /// Deepest depth limit tried by iterative deepening
        #[arg(long, default_value = "120")]
        max_depth: usize,

        /// Maximum states expanded by breadth-first search
        #[arg(long, default_value = "1000000")]
        max_iterations: usize,

        /// Emit every transferable count per column pair
        #[arg(long)]
        every_count: bool,
    },
    /// Replay a move list against a puzzle and check that it solves it
    Verify {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// JSON array of moves, e.g. [{"from":0,"to":3,"count":1}]
        #[arg(long, value_name = "FILE")]
        solution: PathBuf,
    },
    /// Print a sample puzzle as JSON
    Sample,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Iddfs,
    Bfs,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Iddfs => Strategy::Iddfs,
            StrategyArg::Bfs => Strategy::Bfs,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
enum CliError {
    #[display("must provide either a file path or --stdin")]
    MissingInput,
    #[display("failed to read input: {_0}")]
    Io(#[from] io::Error),
    #[display("invalid JSON: {_0}")]
    Json(#[from] serde_json::Error),
    #[display("invalid puzzle: {_0}")]
    Puzzle(#[from] PuzzleError),
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    status: SearchStatus,
    strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<Move>>,
    nodes_expanded: usize,
    depth_reached: usize,
    time_elapsed_ms: u64,
}

/// Output format for a verify run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<ReplayMetrics>,
    /// Board left behind by a legal but incomplete move list
    #[serde(skip_serializing_if = "Option::is_none")]
    final_state: Option<PuzzleFile>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Solve {
            file,
            stdin,
            strategy,
            max_depth,
            max_iterations,
            every_count,
        } => {
            let configuration = read_puzzle(file.as_deref(), stdin)?;

            let config = SolverConfig {
                strategy: strategy.into(),
                max_depth,
                max_iterations,
                move_generation: if every_count {
                    MoveGeneration::EveryCount
                } else {
                    MoveGeneration::MaximalBlock
                },
            };

            log::info!(
                "solving {} columns of capacity {} with {:?}",
                configuration.num_columns(),
                configuration.capacity(),
                config.strategy
            );
            log::debug!("initial configuration:\n{configuration}");

            let result = solve(&configuration, &config);
            let output = SolveOutput {
                solved: result.status.is_solved(),
                status: result.status,
                strategy: config.strategy,
                move_count: result.solution.as_ref().map(Vec::len),
                moves: result.solution,
                nodes_expanded: result.nodes_expanded,
                depth_reached: result.depth_reached,
                time_elapsed_ms: result.time_elapsed_ms,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            Ok(exit_code(output.solved))
        }
        Commands::Verify {
            file,
            stdin,
            solution,
        } => {
            let configuration = read_puzzle(file.as_deref(), stdin)?;
            let moves: Vec<Move> = serde_json::from_str(&fs::read_to_string(&solution)?)?;

            let output = match replay(&configuration, &moves) {
                Ok(result) if result.solved => VerifyOutput {
                    valid: true,
                    reason: None,
                    metrics: Some(result.metrics),
                    final_state: None,
                },
                Ok(result) => {
                    log::debug!("final configuration:\n{}", result.final_state);
                    VerifyOutput {
                        valid: false,
                        reason: Some("moves do not leave the puzzle solved".to_string()),
                        metrics: Some(result.metrics),
                        final_state: Some(PuzzleFile::from_configuration(&result.final_state)),
                    }
                }
                Err(e) => VerifyOutput {
                    valid: false,
                    reason: Some(e.to_string()),
                    metrics: None,
                    final_state: None,
                },
            };
            println!("{}", serde_json::to_string_pretty(&output)?);

            Ok(exit_code(output.valid))
        }
        Commands::Sample => {
            println!("{}", serde_json::to_string_pretty(&PuzzleFile::sample())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_puzzle(file: Option<&Path>, stdin: bool) -> Result<Configuration, CliError> {
    let json_content = if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(path) = file {
        fs::read_to_string(path)?
    } else {
        return Err(CliError::MissingInput);
    };

    let puzzle: PuzzleFile = serde_json::from_str(&json_content)?;
    if let Some(title) = &puzzle.title {
        log::info!("loaded puzzle {title:?}");
    }
    Ok(puzzle.into_configuration()?)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
