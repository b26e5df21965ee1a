mod board;
mod game;
mod level;
mod levels;
mod moves;
mod session;

use anyhow::{Context, Result};
use board::Cell;
use clap::Parser;
use level::{Level, LevelError};
use levels::LevelSet;
use session::Session;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sokoban")]
#[command(about = "Check Sokoban levels and replay move lists against them", long_about = None)]
struct Args {
    /// Level number to play (0-indexed)
    #[arg(value_name = "LEVEL", default_value = "0", allow_negative_numbers = true)]
    level: isize,

    /// Level-set file to load instead of the built-in levels
    #[arg(short, long, value_name = "FILE")]
    levels: Option<PathBuf>,

    /// Move list to replay, one token per line (e.g. `8`, `65`)
    #[arg(short, long, value_name = "FILE")]
    moves: Option<PathBuf>,

    /// Save the moves that were applied to this file
    #[arg(short, long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// List every level and whether it is playable, then exit
    #[arg(long, default_value = "false")]
    list: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn list_levels(levels: &LevelSet) {
    if levels.is_empty() {
        println!("no levels");
        return;
    }
    for (index, level) in levels.iter().enumerate() {
        let status = match level.validate() {
            Ok(()) => "ok".to_string(),
            Err(err) => err.to_string(),
        };
        println!(
            "level: {:<3}  size: {:>2}x{:<2}  goals: {:<3}  status: {}",
            index,
            level.width(),
            level.height(),
            level.goals().len(),
            status
        );
    }
}

fn print_invalid_level(index: isize, level: Option<&Level>, err: &LevelError) {
    eprintln!("Error loading level {}: {} (code {})", index, err, err.code());
    if let Some(level) = level {
        eprintln!("Maze:\n{}", level.to_text());
        let goals: Vec<String> = level.goals().iter().map(ToString::to_string).collect();
        eprintln!("Goals: {}", goals.join(" "));
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut levels = LevelSet::default();
    if let Some(path) = &args.levels {
        levels
            .load_file(path)
            .with_context(|| format!("Error while reading level file {}", path.display()))?;
    }
    info!(levels = levels.len(), "level table ready");

    if args.list {
        list_levels(&levels);
        return Ok(ExitCode::SUCCESS);
    }

    let level = match levels.validate(args.level) {
        Ok(level) => level,
        Err(err) => {
            let level = usize::try_from(args.level).ok().and_then(|i| levels.get(i));
            print_invalid_level(args.level, level, &err);
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut session = Session::new(level)?;

    if let Some(path) = &args.moves {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Error loading move file {}", path.display()))?;
        let replay = session.replay(&contents);
        info!(
            applied = replay.applied,
            rejected = replay.rejected,
            ignored = replay.ignored,
            "replayed move file"
        );
        if replay.rejected > 0 {
            println!("{} move(s) could not be made in full", replay.rejected);
        }
    }

    println!("Sokoban level {}:\n{}", args.level, session.board());
    let board = session.board();
    println!(
        "moves: {}  pushes: {}  worker: {}  boxes on goals: {}/{}",
        session.move_count(),
        session.push_count(),
        session.worker(),
        board.count(|cell| cell == Cell::BoxOnGoal),
        board.count(Cell::is_box)
    );

    if let Some(path) = &args.save {
        fs::write(path, moves::format_history(session.history()))
            .with_context(|| format!("Error saving move file {}", path.display()))?;
        info!(path = %path.display(), moves = session.history().len(), "saved move file");
    }

    if session.is_complete() {
        println!("Congratulations! You won in {} moves!", session.move_count());
        Ok(ExitCode::SUCCESS)
    } else if args.moves.is_some() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "aborted");
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
