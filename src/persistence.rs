//! Text save format for a cube session.
//!
//! One line of five `:`-separated fields:
//! - cube width
//! - layer count
//! - the viewer's global rotation, 9 comma-separated floats, row-major
//! - scramble moves, comma-separated
//! - solve moves, comma-separated
//!
//! Each move is written as face letter, turn count, then the depth when it
//! is not zero, e.g. `R1,U3,F21`. Loading replays the moves on a fresh cube.

use std::fs;
use std::path::Path;

use crate::animation::Matrix3;
use crate::config::CubeConfig;
use crate::error::CubeError;
use crate::history::Phase;
use crate::moves::Move;
use crate::state::CubeState;

/// Save file written and read by the viewer's S and A keys.
pub const DEFAULT_SAVE_FILE: &str = "cube_state.txt";

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::save_token)
        .collect::<Vec<_>>()
        .join(",")
}

/// Encodes the cube's size, the view rotation and the applied moves.
pub fn serialize(state: &CubeState, rotation: &Matrix3) -> String {
    let rotation = rotation
        .iter()
        .flatten()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}:{}:{}:{}:{}",
        state.width(),
        state.layers(),
        rotation,
        join_moves(&state.history().scramble_moves()),
        join_moves(&state.history().solve_moves()),
    )
}

fn parse_moves(field: &str) -> Result<Vec<Move>, CubeError> {
    field
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Move::from_save_token)
        .collect()
}

/// Rebuilds a cube by replaying the saved moves on a fresh one.
pub fn deserialize(text: &str) -> Result<(CubeState, Matrix3), CubeError> {
    let fields: Vec<&str> = text.trim().split(':').collect();
    let [width, layers, rotation, scramble, solve] = fields[..] else {
        return Err(CubeError::MalformedState(format!(
            "expected 5 fields, found {}",
            fields.len()
        )));
    };

    let width: f32 = width
        .trim()
        .parse()
        .map_err(|_| CubeError::InvalidWidth(width.to_string()))?;
    let layers: usize = layers
        .trim()
        .parse()
        .map_err(|_| CubeError::MalformedState(format!("bad layer count {layers:?}")))?;
    let config = CubeConfig {
        width,
        layers,
        ..CubeConfig::default()
    };
    config.validate()?;

    let values = rotation
        .split(',')
        .map(|value| value.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CubeError::MalformedState(format!("bad rotation: {err}")))?;
    let [r00, r01, r02, r10, r11, r12, r20, r21, r22] = values[..] else {
        return Err(CubeError::MalformedState(format!(
            "rotation needs 9 values, found {}",
            values.len()
        )));
    };

    let scramble = parse_moves(scramble)?;
    let solve = parse_moves(solve)?;

    let mut state = CubeState::new(config);
    state.replay(Phase::Scramble, &scramble);
    state.replay(Phase::Solve, &solve);
    log::debug!(
        "restored {} layer cube from {} scramble and {} solve moves",
        layers,
        scramble.len(),
        solve.len()
    );
    Ok((state, [[r00, r01, r02], [r10, r11, r12], [r20, r21, r22]]))
}

pub fn save(
    path: impl AsRef<Path>,
    state: &CubeState,
    rotation: &Matrix3,
) -> Result<(), CubeError> {
    fs::write(path, serialize(state, rotation) + "\n")?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<(CubeState, Matrix3), CubeError> {
    deserialize(&fs::read_to_string(path)?)
}
