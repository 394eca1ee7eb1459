//! The owned cube value a UI drives.

use crate::animation::{AnimationHandle, AnimationJob};
use crate::config::CubeConfig;
use crate::error::CubeError;
use crate::geometry::Face;
use crate::grid::{CubeGrid, TurnResult};
use crate::history::{History, Phase};
use crate::moves::{parse_notation, Move};
use crate::scramble::{clock_rng, scramble_moves};
use crate::solver;

/// A cube with its move history, optionally feeding an animation queue.
///
/// Every turn goes through here so that the grid, the history and the
/// animation always see the same moves in the same order.
#[derive(Clone, Debug)]
pub struct CubeState {
    config: CubeConfig,
    grid: CubeGrid,
    history: History,
    animation: Option<AnimationHandle>,
}

impl CubeState {
    /// A solved cube. Unusable sizes fall back to the 2 layer default.
    pub fn new(config: CubeConfig) -> CubeState {
        let config = config.validated();
        CubeState {
            grid: CubeGrid::new(config.layers),
            config,
            history: History::new(),
            animation: None,
        }
    }

    pub fn with_layers(layers: usize) -> CubeState {
        CubeState::new(CubeConfig::with_layers(layers))
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn grid(&self) -> &CubeGrid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn layers(&self) -> usize {
        self.grid.layers()
    }

    pub fn width(&self) -> f32 {
        self.config.width
    }

    pub fn is_solved(&self) -> bool {
        self.grid.is_solved()
    }

    /// Sends every later turn to `handle` for playback.
    pub fn attach_animation(&mut self, handle: AnimationHandle) {
        self.animation = Some(handle);
    }

    fn perform(&mut self, mv: Move, phase: Option<Phase>) -> TurnResult {
        let result = self.grid.apply(mv);
        if let Some(phase) = phase {
            self.history.record(phase, mv);
        }
        if let Some(animation) = &self.animation {
            animation.enqueue(AnimationJob::new(&result, &self.grid));
        }
        result
    }

    /// Applies a single move as a manual turn.
    pub fn rotate(&mut self, mv: Move) -> TurnResult {
        self.perform(mv, Some(Phase::Solve))
    }

    pub fn apply_turn(&mut self, face: Face, depth: usize, turns: u32) -> TurnResult {
        self.rotate(Move::new(face, turns, depth))
    }

    /// Applies notation left to right, skipping unparseable tokens.
    pub fn evaluate(&mut self, notation: &str) -> Vec<Move> {
        let moves = parse_notation(notation);
        for &mv in &moves {
            self.rotate(mv);
        }
        moves
    }

    /// Scrambles from a clock-seeded generator.
    pub fn scramble(&mut self) -> Vec<Move> {
        self.scramble_with(&mut clock_rng())
    }

    pub fn scramble_with_seed(&mut self, seed: u64) -> Vec<Move> {
        self.scramble_with(&mut fastrand::Rng::with_seed(seed))
    }

    pub fn scramble_with(&mut self, rng: &mut fastrand::Rng) -> Vec<Move> {
        let moves = scramble_moves(self.layers(), rng);
        for &mv in &moves {
            self.perform(mv, Some(Phase::Scramble));
        }
        log::info!("scrambled with {} moves", moves.len());
        moves
    }

    /// Solves the cube and applies the solution.
    ///
    /// On error the cube is left untouched.
    pub fn solve(&mut self) -> Result<Vec<Move>, CubeError> {
        let moves = solver::solve(&self.grid)?;
        for &mv in &moves {
            self.perform(mv, Some(Phase::Solve));
        }
        log::info!("solved in {} moves", moves.len());
        Ok(moves)
    }

    /// Undoes the move before the history cursor.
    pub fn step_back(&mut self) -> Option<TurnResult> {
        let mv = self.history.step_back()?;
        Some(self.perform(mv, None))
    }

    /// Redoes the move after the history cursor.
    pub fn step_forward(&mut self) -> Option<TurnResult> {
        let mv = self.history.step_forward()?;
        Some(self.perform(mv, None))
    }

    /// Back to a solved cube with an empty history.
    ///
    /// Detaches the animation handle: its queue still shows the old cube,
    /// so callers start a new queue and attach that one instead.
    pub fn reset(&mut self) {
        self.grid = CubeGrid::new(self.config.layers);
        self.history = History::new();
        self.animation = None;
    }

    /// Replays saved moves onto this cube, recording them under `phase`.
    pub(crate) fn replay(&mut self, phase: Phase, moves: &[Move]) {
        for &mv in moves {
            self.perform(mv, Some(phase));
        }
    }
}
