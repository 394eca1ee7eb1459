//! Error type shared by the strict entry points of the crate.
//!
//! The interactive paths (`CubeState::evaluate`, `CubeConfig::validated`,
//! `Palette::from_hex_list`) degrade to defaults instead and only log.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubeError {
    #[error("a cube needs at least 2 layers, got {0}")]
    InvalidLayers(usize),
    #[error("invalid cube width {0:?}")]
    InvalidWidth(String),
    #[error("invalid color {0:?}")]
    InvalidColor(String),
    #[error("unrecognized move {0:?}")]
    InvalidMove(String),
    #[error("no solver for cubes with {0} layers")]
    UnsupportedSize(usize),
    #[error("cube state cannot be solved: {0}")]
    UnsolvableState(String),
    #[error("malformed saved state: {0}")]
    MalformedState(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
