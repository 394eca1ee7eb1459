//! Twisty Cube Library
//!
//! An N-layer twisty cube: piece-level state with orientation codes, turn
//! notation, random scrambles, a layer-by-layer solver for 2 and 3 layers,
//! move history scrubbing, a text save format and a background queue that
//! turns applied moves into animation frames.

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod history;
pub mod moves;
pub mod persistence;
pub mod pieces;
pub mod scramble;
pub mod solver;
pub mod state;

pub use config::CubeConfig;
pub use error::CubeError;
pub use geometry::Face;
pub use grid::CubeGrid;
pub use moves::Move;
pub use state::CubeState;
