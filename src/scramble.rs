//! Random scramble generation.
//!
//! A scramble is a convenience shuffle of `10 * layers` uniformly drawn
//! turns. It makes no attempt at uniform sampling of cube states.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::geometry::Face;
use crate::moves::Move;

/// Scramble moves per layer.
pub const MOVES_PER_LAYER: usize = 10;

/// Draws a scramble for a cube of `layers` layers.
pub fn scramble_moves(layers: usize, rng: &mut fastrand::Rng) -> Vec<Move> {
    (0..MOVES_PER_LAYER * layers)
        .map(|_| {
            let face = Face::ALL[rng.usize(0..Face::ALL.len())];
            Move::new(face, rng.u32(1..=3), rng.usize(0..layers))
        })
        .collect()
}

/// A generator seeded from the wall clock.
pub fn clock_rng() -> fastrand::Rng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    fastrand::Rng::with_seed(seed)
}
