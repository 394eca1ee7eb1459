//! Record of applied moves with a replay cursor.

use crate::moves::Move;

/// Which part of a session a move belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scramble,
    /// Solver output and manual turns.
    Solve,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    phase: Phase,
    mv: Move,
}

/// Moves in the order they were applied.
///
/// The cursor counts how many entries are currently applied to the grid;
/// it only trails the end while the user scrubs backwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<Entry>,
    cursor: usize,
}

impl History {
    pub fn new() -> History {
        History::default()
    }

    /// Appends a move that was just applied.
    ///
    /// Entries the cursor has stepped back over are dropped first, so the
    /// applied prefix always replays to the live grid.
    pub fn record(&mut self, phase: Phase, mv: Move) {
        if self.cursor < self.entries.len() {
            log::debug!(
                "dropping {} undone moves",
                self.entries.len() - self.cursor
            );
            self.entries.truncate(self.cursor);
        }
        self.entries.push(Entry { phase, mv });
        self.cursor = self.entries.len();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index splitting the applied moves into the scramble part (up to and
    /// including the last scramble entry) and the solve part after it.
    fn phase_split(&self) -> usize {
        self.entries[..self.cursor]
            .iter()
            .rposition(|entry| entry.phase == Phase::Scramble)
            .map_or(0, |last| last + 1)
    }

    /// Applied moves up to the end of the most recent scramble.
    ///
    /// Manual turns made before a scramble are kept here too, so that
    /// replaying scramble then solve moves reproduces the grid.
    pub fn scramble_moves(&self) -> Vec<Move> {
        self.entries[..self.phase_split()]
            .iter()
            .map(|entry| entry.mv)
            .collect()
    }

    /// Applied moves after the most recent scramble.
    pub fn solve_moves(&self) -> Vec<Move> {
        self.entries[self.phase_split()..self.cursor]
            .iter()
            .map(|entry| entry.mv)
            .collect()
    }

    /// Moves the cursor back one entry and returns the move that undoes it.
    pub fn step_back(&mut self) -> Option<Move> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.entries[self.cursor].mv.inverse())
    }

    /// Moves the cursor forward one entry and returns the move to reapply.
    pub fn step_forward(&mut self) -> Option<Move> {
        let entry = self.entries.get(self.cursor)?;
        self.cursor += 1;
        Some(entry.mv)
    }
}
