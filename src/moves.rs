//! Turn descriptors and the move notation they are written in.
//!
//! Notation tokens are `<FACE>`, `<FACE>'` or `<FACE>2`, optionally followed
//! by `.<depth>` for inner slices (`R.1` turns the slice behind R).

use std::fmt;
use std::str::FromStr;

use crate::error::CubeError;
use crate::geometry::Face;

/// A normalized turn: `turns` clockwise quarter turns of the slice `depth`
/// layers in from `face`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    face: Face,
    turns: u8,
    depth: usize,
}

impl Move {
    /// Creates a move, folding `turns` into `1..=3`.
    ///
    /// Multiples of four fold to a single quarter turn rather than a no-op,
    /// so a turn request is never dropped.
    pub fn new(face: Face, turns: u32, depth: usize) -> Move {
        let turns = match turns % 4 {
            0 => 1,
            t => t as u8,
        };
        Move { face, turns, depth }
    }

    /// A single clockwise quarter turn of the outer layer.
    pub fn quarter(face: Face) -> Move {
        Move::new(face, 1, 0)
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn turns(&self) -> u8 {
        self.turns
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The move that undoes this one.
    pub fn inverse(&self) -> Move {
        Move {
            turns: 4 - self.turns,
            ..*self
        }
    }

    /// The same move with its face relabelled into `front`'s frame.
    pub fn in_frame(&self, front: Face) -> Move {
        Move {
            face: self.face.in_frame(front),
            ..*self
        }
    }

    /// Resolves this move against a cube with `layers` layers.
    ///
    /// Depths past the last layer clamp to the outer layer. The last slice
    /// of a face is the outer layer of the opposite face turning the other
    /// way.
    pub fn canonical(&self, layers: usize) -> Move {
        let mut depth = self.depth;
        if depth >= layers {
            log::debug!("depth {depth} out of range for {layers} layers, clamping to 0");
            depth = 0;
        }
        if layers > 1 && depth == layers - 1 {
            return Move {
                face: self.face.opposite(),
                turns: 4 - self.turns,
                depth: 0,
            };
        }
        Move { depth, ..*self }
    }

    /// Compact token used by save files: face letter, turn digit, then the
    /// depth when it is not zero (`R2`, `F31`).
    pub fn save_token(&self) -> String {
        if self.depth == 0 {
            format!("{}{}", self.face.letter(), self.turns)
        } else {
            format!("{}{}{}", self.face.letter(), self.turns, self.depth)
        }
    }

    /// Parses a token written by [`Move::save_token`].
    pub fn from_save_token(token: &str) -> Result<Move, CubeError> {
        let invalid = || CubeError::InvalidMove(token.to_string());
        let mut chars = token.trim().chars();
        let face = chars.next().and_then(Face::from_letter).ok_or_else(invalid)?;
        let turns = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .filter(|t| (1..=3).contains(t))
            .ok_or_else(invalid)?;
        let rest = chars.as_str();
        let depth = if rest.is_empty() {
            0
        } else {
            rest.parse().map_err(|_| invalid())?
        };
        Ok(Move::new(face, turns, depth))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.face.letter())?;
        match self.turns {
            2 => write!(f, "2")?,
            3 => write!(f, "'")?,
            _ => {}
        }
        if self.depth > 0 {
            write!(f, ".{}", self.depth)?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = CubeError;

    /// Parses one notation token, case-insensitively.
    fn from_str(token: &str) -> Result<Move, CubeError> {
        let invalid = || CubeError::InvalidMove(token.to_string());
        let upper = token.trim().to_ascii_uppercase();
        let (body, depth) = match upper.split_once('.') {
            Some((body, depth)) => (body, depth.parse::<usize>().map_err(|_| invalid())?),
            None => (upper.as_str(), 0),
        };
        let mut chars = body.chars();
        let face = chars.next().and_then(Face::from_letter).ok_or_else(invalid)?;
        let turns = match chars.as_str() {
            "" => 1,
            "'" => 3,
            "2" => 2,
            _ => return Err(invalid()),
        };
        Ok(Move::new(face, turns, depth))
    }
}

/// Parses whitespace separated notation, dropping tokens that don't parse.
pub fn parse_notation(notation: &str) -> Vec<Move> {
    notation
        .split_whitespace()
        .filter_map(|token| match token.parse::<Move>() {
            Ok(mv) => Some(mv),
            Err(err) => {
                log::debug!("discarding {err}");
                None
            }
        })
        .collect()
}

/// The sequence that undoes `moves`.
pub fn invert_sequence(moves: &[Move]) -> Vec<Move> {
    moves.iter().rev().map(Move::inverse).collect()
}

/// Writes moves back out as space separated notation.
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_are_folded() {
        assert_eq!(Move::new(Face::Up, 0, 0).turns(), 1);
        assert_eq!(Move::new(Face::Up, 4, 0).turns(), 1);
        assert_eq!(Move::new(Face::Up, 5, 0).turns(), 1);
        assert_eq!(Move::new(Face::Up, 6, 0).turns(), 2);
        assert_eq!(Move::new(Face::Up, 7, 0).turns(), 3);
    }

    #[test]
    fn test_notation_tokens() {
        assert_eq!("R".parse::<Move>().unwrap(), Move::new(Face::Right, 1, 0));
        assert_eq!("u'".parse::<Move>().unwrap(), Move::new(Face::Up, 3, 0));
        assert_eq!("F2".parse::<Move>().unwrap(), Move::new(Face::Front, 2, 0));
        assert_eq!("L'.1".parse::<Move>().unwrap(), Move::new(Face::Left, 3, 1));
        assert!("X".parse::<Move>().is_err());
        assert!("R3".parse::<Move>().is_err());
        assert!("R.x".parse::<Move>().is_err());
        assert!("".parse::<Move>().is_err());
    }

    #[test_log::test]
    fn test_parse_notation_skips_garbage() {
        let moves = parse_notation("R u' Q F2 R'' B.2 ?");
        assert_eq!(format_sequence(&moves), "R U' F2 B.2");
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for text in ["R", "U'", "F2", "B.1", "D'.2", "L2.3"] {
            let mv: Move = text.parse().unwrap();
            assert_eq!(mv.to_string(), text);
        }
    }

    #[test]
    fn test_save_tokens() {
        let mv = Move::new(Face::Front, 3, 1);
        assert_eq!(mv.save_token(), "F31");
        assert_eq!(Move::from_save_token("F31").unwrap(), mv);
        assert_eq!(Move::from_save_token("U2").unwrap(), Move::new(Face::Up, 2, 0));
        assert!(Move::from_save_token("F0").is_err());
        assert!(Move::from_save_token("Z1").is_err());
        assert!(Move::from_save_token("R").is_err());
    }

    #[test]
    fn test_canonical_last_slice_turns_opposite_face() {
        let mv = Move::new(Face::Right, 1, 2).canonical(3);
        assert_eq!(mv, Move::new(Face::Left, 3, 0));
        // out of range depths clamp to the outer layer
        assert_eq!(Move::new(Face::Up, 2, 9).canonical(3), Move::new(Face::Up, 2, 0));
        // inner slices stay put
        assert_eq!(Move::new(Face::Up, 2, 1).canonical(4), Move::new(Face::Up, 2, 1));
    }

    #[test]
    fn test_inverse_sequence() {
        let moves = parse_notation("R U2 F'");
        assert_eq!(format_sequence(&invert_sequence(&moves)), "F U2 R'");
    }
}
