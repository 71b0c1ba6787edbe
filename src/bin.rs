//! The `xwcore` CLI driver: wires a puzzle reader, a [`xwcore::lexicon::Lexicon`],
//! a [`xwcore::historical_index::HistoricalIndex`], a solver pipeline, and the
//! ranker together. Owns argument parsing and process exit codes only — see
//! `SPEC_FULL.md` §6/§10 for the surface this implements.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};
use rand::SeedableRng;

use xwcore::historical_index::HistoricalIndex;
use xwcore::lexicon::Lexicon;
use xwcore::puzzle::Puzzle;
use xwcore::ranking::top_n;
use xwcore::reader::read_puz;
use xwcore::solver::annealer::{assign_random_slot, erase_random_slot, exponential_schedule, MonteCarloAnnealer};
use xwcore::solver::clique::{CliqueSolver, HistoricalAnswerSource, LexiconAnswerSource};
use xwcore::solver::config::{benchmark_score, SolverConfig};
use xwcore::solver::multistage::MultiStageSolver;
use xwcore::solver::Solver;

/// Fuzzy-match threshold for the historical-index stage of the default
/// pipeline: clues within this Dice similarity of a past clue are
/// considered a candidate source, same as the original database-cutoff
/// solver variant.
const CLUE_MATCH_THRESHOLD: f64 = 0.9;
const ANNEAL_T0: f64 = 10.0;
const ANNEAL_ALPHA: f64 = 0.01;
const ANNEAL_STEPS: usize = 2000;

#[derive(Parser, Debug)]
#[command(name = "xwcore", about = "Solve American-style crossword puzzles")]
struct Cli {
    /// Puzzle file(s) to solve, in `.puz` format.
    #[arg(required = true)]
    puzzle: Vec<PathBuf>,

    /// Dictionary of words to use as candidate answers.
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Historical clue database (binary, see `HistoricalIndex::deserialize`).
    #[arg(long)]
    cluedb: Option<PathBuf>,

    /// Number of solutions to show per puzzle.
    #[arg(long, default_value_t = 1)]
    nsolutions: usize,

    /// Penalty per empty cell when benchmark-scoring against a known solution.
    #[arg(long, default_value_t = 1)]
    empty_penalty: i64,

    /// Penalty per incorrect cell when benchmark-scoring against a known solution.
    #[arg(long, default_value_t = 1)]
    incorrect_penalty: i64,

    /// Logging verbosity.
    #[arg(long, default_value = "info")]
    logging: String,

    /// Number of puzzle files to process concurrently.
    #[arg(long, default_value_t = 1)]
    nthreads: usize,
}

fn level_filter(name: &str) -> log::LevelFilter {
    match name {
        "debug" => log::LevelFilter::Debug,
        "warning" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "critical" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

fn pretty_print(puzzle: &Puzzle) -> String {
    use xwcore::types::CellState;

    let mut out = String::with_capacity(puzzle.width * (puzzle.height + 1));
    for row in 0..puzzle.height {
        for col in 0..puzzle.width {
            let ch = match puzzle.cell(row * puzzle.width + col) {
                CellState::Black => '*',
                CellState::Empty => '~',
                CellState::Letter(c) => c,
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

fn solve_one(path: &PathBuf, lexicon: &Lexicon, cluedb: &HistoricalIndex, config: &SolverConfig) -> Result<(), String> {
    info!("loading crossword puzzle {}", path.display());
    let bytes = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let (width, height, slots, solution_letters) = read_puz(&bytes, true).map_err(|e| e.to_string())?;

    // The golden (solution-filled) puzzle is kept only for benchmark
    // scoring; the puzzle actually handed to the solvers starts blank.
    let golden = solution_letters
        .clone()
        .map(|sol| Puzzle::new(width, height, slots.clone(), Some(sol)))
        .transpose()
        .map_err(|e| e.to_string())?;
    let puzzle = Puzzle::new(width, height, slots, None).map_err(|e| e.to_string())?;

    info!("solving puzzle");
    let stage1 = CliqueSolver::new(HistoricalAnswerSource {
        index: cluedb,
        threshold: CLUE_MATCH_THRESHOLD,
    });
    let schedule = exponential_schedule(ANNEAL_T0, ANNEAL_ALPHA, ANNEAL_STEPS);
    let stage2 = MonteCarloAnnealer::new(
        LexiconAnswerSource { lexicon },
        vec![assign_random_slot, erase_random_slot],
        schedule,
        rand::rngs::SmallRng::from_entropy(),
    );
    let solvers: Vec<Box<dyn Solver + '_>> = vec![Box::new(stage1), Box::new(stage2)];
    let pipeline = MultiStageSolver::new(solvers).map_err(|e| e.to_string())?;

    let solutions = top_n(pipeline.solve(puzzle), config.nsolutions, config.max_examined);
    info!("{} solution(s) found", solutions.len());

    for (i, solved) in solutions.iter().enumerate() {
        if let Some(golden) = &golden {
            let score = benchmark_score(solved, golden, config);
            info!("solution #{} (benchmark score = {score})", i + 1);
        } else {
            info!("solution #{}", i + 1);
        }
        println!("{}", pretty_print(solved));
    }

    Ok(())
}

fn run(cli: &Cli) -> bool {
    let dictionary_text = cli.dictionary.as_ref().and_then(|p| match fs::read_to_string(p) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("could not read dictionary {}: {e}", p.display());
            None
        }
    });
    let lexicon = dictionary_text.map(|t| Lexicon::load_from_str(&t)).unwrap_or_default();
    info!("loaded {} dictionary words", lexicon.size());

    let cluedb = cli
        .cluedb
        .as_ref()
        .and_then(|p| match fs::read(p) {
            Ok(bytes) => HistoricalIndex::deserialize(&bytes[..]).ok(),
            Err(e) => {
                warn!("could not read clue database {}: {e}", p.display());
                None
            }
        })
        .unwrap_or_default();
    info!("loaded {} historical clues", cluedb.len());

    let config = SolverConfig {
        nsolutions: cli.nsolutions,
        empty_penalty: cli.empty_penalty,
        incorrect_penalty: cli.incorrect_penalty,
        nthreads: cli.nthreads.max(1),
        max_examined: None,
    };

    let mut all_ok = true;
    let chunk_size = config.nthreads.max(1);
    for chunk in cli.puzzle.chunks(chunk_size) {
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|path| scope.spawn(|| solve_one(path, &lexicon, &cluedb, &config)))
                .collect();
            for (path, handle) in chunk.iter().zip(handles) {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(message)) => {
                        error!("{message}");
                        all_ok = false;
                    }
                    Err(_) => {
                        error!("worker thread for {} panicked", path.display());
                        all_ok = false;
                    }
                }
            }
        });
    }
    all_ok
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(level_filter(&cli.logging)).init();

    if run(&cli) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
