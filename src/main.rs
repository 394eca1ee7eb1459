//! Twisty Cube
//!
//! Scrambles, solves and displays N-layer twisty cubes. Without a command the
//! interactive 3D viewer opens on a solved cube and demos scramble and solve
//! while left alone.

mod visualization;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use twisty::moves::{format_sequence, Move};
use twisty::pieces::Palette;
use twisty::{persistence, CubeConfig, CubeError, CubeState};

/// Scrambles, solves and visualizes N-layer twisty cubes.
#[derive(Parser)]
#[command(name = "twisty")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Layers per edge; values below 2 fall back to 2.
    #[arg(long, default_value_t = 3)]
    layers: usize,
    /// Edge length of the rendered cube.
    #[arg(long, default_value_t = 12.0)]
    width: f32,
    /// Seed for scrambles; the clock is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Comma-separated `#rrggbb` colors for U, D, F, B, R, L.
    #[arg(long, value_delimiter = ',')]
    palette: Vec<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scramble a solved cube and print the moves and the net.
    Scramble,
    /// Scramble, solve, and print the solution.
    Solve,
    /// Apply turn notation to a solved cube and print the net.
    Apply { notation: String },
    /// Scramble and write the state to a save file.
    Save { path: PathBuf },
    /// Read a save file and print its state.
    Load { path: PathBuf },
    /// Open the interactive 3D viewer.
    Display,
}

impl Cli {
    fn config(&self) -> CubeConfig {
        let palette: Vec<&str> = self.palette.iter().map(String::as_str).collect();
        CubeConfig {
            width: self.width,
            layers: self.layers,
            palette: Palette::from_hex_list(&palette),
            ..CubeConfig::default()
        }
    }

    fn scrambled(&self) -> (CubeState, Vec<Move>) {
        let mut state = CubeState::new(self.config());
        let moves = match self.seed {
            Some(seed) => state.scramble_with_seed(seed),
            None => state.scramble(),
        };
        (state, moves)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Some(Command::Scramble) => {
            run_scramble(&cli);
            Ok(())
        }
        Some(Command::Solve) => run_solve(&cli),
        Some(Command::Apply { notation }) => {
            run_apply(&cli, notation);
            Ok(())
        }
        Some(Command::Save { path }) => run_save(&cli, path),
        Some(Command::Load { path }) => run_load(path),
        Some(Command::Display) | None => {
            println!("Controls: Left/Right step, Up scramble, Down solve, R reset, S save, A load");
            visualization::display(CubeState::new(cli.config()));
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run_scramble(cli: &Cli) {
    let (state, moves) = cli.scrambled();
    println!("Scramble ({} moves): {}", moves.len(), format_sequence(&moves));
    print!("{}", state.grid());
}

fn run_solve(cli: &Cli) -> Result<(), CubeError> {
    let (mut state, scramble) = cli.scrambled();
    println!("Scramble: {}", format_sequence(&scramble));
    let solution = state.solve()?;
    println!("Solution ({} moves): {}", solution.len(), format_sequence(&solution));
    print!("{}", state.grid());
    Ok(())
}

fn run_apply(cli: &Cli, notation: &str) {
    let mut state = CubeState::new(cli.config());
    let moves = state.evaluate(notation);
    print!("{}", apply_report(&state, &moves));
}

/// Summary line for applied moves followed by the net.
fn apply_report(state: &CubeState, moves: &[Move]) -> String {
    format!(
        "{} on {} layers, solved: {}\n{}",
        format_sequence(moves),
        state.layers(),
        state.is_solved(),
        state.grid()
    )
}

fn run_save(cli: &Cli, path: &Path) -> Result<(), CubeError> {
    let (state, _) = cli.scrambled();
    persistence::save(path, &state, &persistence::IDENTITY)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_load(path: &Path) -> Result<(), CubeError> {
    let (state, _) = persistence::load(path)?;
    let history = state.history();
    println!("Scramble: {}", format_sequence(&history.scramble_moves()));
    println!("Solve: {}", format_sequence(&history.solve_moves()));
    println!("Solved: {}", state.is_solved());
    print!("{}", state.grid());
    Ok(())
}
