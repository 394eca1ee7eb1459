//! Layer-by-layer solver for 2 and 3 layer cubes.
//!
//! The method is the beginner's one: the White layer is built on Up, the
//! middle edges are inserted, and the Yellow layer is finished on Down.
//! Every corrective step is a canned algorithm written for a solver facing
//! Front and relabelled into the frame of the side it works on, so one
//! table entry covers all four sides.
//!
//! Pieces are found by scanning the grid for their colors; nothing is
//! cached between steps.

use crate::error::CubeError;
use crate::geometry::Face;
use crate::grid::CubeGrid;
use crate::moves::{invert_sequence, parse_notation, Move};
use crate::pieces::Color;

/// Slice turns bringing the White center to Up, keyed by where it is.
const WHITE_CENTER_UP: [(Face, &str); 5] = [
    (Face::Front, "R.1"),
    (Face::Back, "L.1"),
    (Face::Left, "F.1"),
    (Face::Right, "B.1"),
    (Face::Down, "F2.1"),
];

/// Slice turns bringing the Red center to Front once White is up.
const RED_CENTER_FRONT: [(Face, &str); 3] = [
    (Face::Right, "U.1"),
    (Face::Left, "D.1"),
    (Face::Back, "U2.1"),
];

/// Front-right middle edge down to the bottom layer.
const EDGE_OUT_OF_SLICE: &str = "R' D R";
/// Bottom-front edge straight up into the top layer.
const CROSS_INSERT: &str = "F2";
/// Bottom-front edge into the top layer with its colors swapped.
const CROSS_FLIP: &str = "D R F' R'";

/// Top-front-right corner down to the bottom layer.
const CORNER_OUT: &str = "R' D' R";
/// Bottom-front-right corner into the top layer, by where White faces.
const CORNER_IN_DOWN: &str = "R' D2 R D R' D' R";
const CORNER_IN_FRONT: &str = "F D F'";
const CORNER_IN_RIGHT: &str = "R' D' R";

/// Bottom-front edge into the front-right slot.
const MIDDLE_RIGHT: &str = "D' R' D R D F D' F'";
/// Bottom-front edge into the front-left slot.
const MIDDLE_LEFT: &str = "D L D' L' D' F' D F";

/// Bottom edge orientation, keyed by which of the F, R, B, L bottom edges
/// already show Yellow on Down.
const EDGE_ORIENT_CASES: [([bool; 4], &str); 7] = [
    ([false, false, false, false], "R F D F' D' R'"),
    ([false, false, true, true], "R D F D' F' R'"),
    ([false, true, false, true], "F L D L' D' F'"),
    ([false, true, true, false], "F D L D' L' F'"),
    ([true, false, false, true], "B D R D' R' B'"),
    ([true, false, true, false], "R F D F' D' R'"),
    ([true, true, false, false], "L D B D' B' L'"),
];

/// Bottom edge permutation, keyed by which bottom edges already match
/// their side centers.
const EDGE_PERMUTE_CASES: [([bool; 4], &str); 6] = [
    ([false, false, true, true], "L D L' D L D2 L' D"),
    ([false, true, false, true], "F D F' D F D2 F'"),
    ([false, true, true, false], "B D B' D B D2 B' D"),
    ([true, false, false, true], "F D F' D F D2 F' D"),
    ([true, false, true, false], "R D R' D R D2 R'"),
    ([true, true, false, false], "R D R' D R D2 R' D"),
];

/// Cycles the bottom corners DFR -> DBR -> DBL -> DFR, fixing DFL.
const CORNER_CYCLE: &str = "R' D L D' R D L' D'";

/// Twists the DFL corner by one or two thirds while scrambling only the top
/// layer, which the mirrored half of the commutator puts back.
const CORNER_TWISTS: [&str; 2] = ["L' U' L U L' U' L", "L' U L U' L' U L"];

/// Solves the cube, returning the moves without applying them to `grid`.
pub fn solve(grid: &CubeGrid) -> Result<Vec<Move>, CubeError> {
    let mut solver = LayerByLayer {
        grid: grid.clone(),
        moves: Vec::new(),
    };
    match grid.layers() {
        2 => {
            solver.top_corners()?;
            solver.bottom_corner_permutation()?;
            solver.bottom_corner_orientation()?;
        }
        3 => {
            solver.centers()?;
            solver.top_cross()?;
            solver.top_corners()?;
            solver.middle_edges()?;
            solver.bottom_edge_orientation()?;
            solver.bottom_edge_permutation()?;
            solver.bottom_corner_permutation()?;
            solver.bottom_corner_orientation()?;
        }
        layers => return Err(CubeError::UnsupportedSize(layers)),
    }
    if !solver.grid.is_solved() {
        return Err(CubeError::UnsolvableState(
            "pieces remain out of place after the last layer".to_string(),
        ));
    }
    Ok(solver.moves)
}

/// Position of a side in [`Face::SIDES`].
fn side_index(side: Face) -> usize {
    Face::SIDES.iter().position(|&s| s == side).unwrap_or(0)
}

/// Quarter turns of Down that carry side `from` to side `to`.
fn down_turns_between(from: Face, to: Face) -> usize {
    (side_index(to) + 4 - side_index(from)) % 4
}

/// The side naming a piece's frame: its only side face, or for a piece
/// between two sides the one whose right neighbour is the other.
fn leading_side(faces: &[Face]) -> Option<Face> {
    let sides: Vec<Face> = faces
        .iter()
        .copied()
        .filter(|face| Face::SIDES.contains(face))
        .collect();
    match sides[..] {
        [only] => Some(only),
        _ => sides
            .iter()
            .copied()
            .find(|side| sides.contains(&side.right_of())),
    }
}

/// Parity of a permutation given as `perm[i] = destination of i`.
fn is_even(perm: &[usize; 4]) -> bool {
    let mut seen = [false; 4];
    let mut transpositions = 0;
    for start in 0..4 {
        let mut at = start;
        let mut length = 0;
        while !seen[at] {
            seen[at] = true;
            at = perm[at];
            length += 1;
        }
        transpositions += length.max(1) - 1;
    }
    transpositions % 2 == 0
}

struct LayerByLayer {
    grid: CubeGrid,
    moves: Vec<Move>,
}

impl LayerByLayer {
    fn push(&mut self, mv: Move) {
        self.grid.apply_all(&[mv]);
        self.moves.push(mv);
    }

    /// Applies a canned algorithm with `front` playing the role of Front.
    fn run(&mut self, algorithm: &str, front: Face) {
        for mv in parse_notation(algorithm) {
            self.push(mv.in_frame(front));
        }
    }

    fn run_inverse(&mut self, algorithm: &str, front: Face) {
        for mv in invert_sequence(&parse_notation(algorithm)) {
            self.push(mv.in_frame(front));
        }
    }

    /// Turns the Down layer `quarter_turns` times clockwise.
    fn spin_down(&mut self, quarter_turns: usize) {
        if quarter_turns % 4 != 0 {
            self.push(Move::new(Face::Down, quarter_turns as u32, 0));
        }
    }

    fn locate(&self, colors: &[Color]) -> Result<usize, CubeError> {
        self.grid.find(colors).ok_or_else(|| {
            CubeError::UnsolvableState(format!("no piece with colors {colors:?}"))
        })
    }

    fn side_of(&self, slot: usize) -> Result<Face, CubeError> {
        leading_side(&self.grid.faces_of(slot)).ok_or_else(|| {
            CubeError::UnsolvableState(format!("slot {slot} is not on a side"))
        })
    }

    fn center_color(&self, face: Face) -> Option<Color> {
        self.grid.facelet(self.grid.slot_at(&[face]), face)
    }

    fn down_edge(&self, side: Face) -> usize {
        self.grid.slot_at(&[Face::Down, side])
    }

    fn down_corner(&self, side: Face) -> usize {
        self.grid.slot_at(&[Face::Down, side, side.right_of()])
    }

    fn twist(&self, slot: usize) -> u8 {
        self.grid.piece(slot).map_or(0, |piece| piece.orientation())
    }

    /// Turns the middle slices until White is up and Red is in front.
    fn centers(&mut self) -> Result<(), CubeError> {
        if self.center_color(Face::Up) != Some(Color::White) {
            if let Some(&(_, algorithm)) = WHITE_CENTER_UP
                .iter()
                .find(|(face, _)| self.center_color(*face) == Some(Color::White))
            {
                self.run(algorithm, Face::Front);
            }
        }
        if self.center_color(Face::Front) != Some(Color::Red) {
            if let Some(&(_, algorithm)) = RED_CENTER_FRONT
                .iter()
                .find(|(face, _)| self.center_color(*face) == Some(Color::Red))
            {
                self.run(algorithm, Face::Front);
            }
        }
        log::debug!("centers aligned after {} moves", self.moves.len());
        Ok(())
    }

    /// Places and orients the four White edges on Up.
    fn top_cross(&mut self) -> Result<(), CubeError> {
        for side in Face::SIDES {
            let colors = [Color::White, Color::of_face(side)];
            let slot = self.locate(&colors)?;
            let faces = self.grid.faces_of(slot);
            if faces.contains(&Face::Up) {
                let at = self.side_of(slot)?;
                if at == side && self.grid.facelet(slot, Face::Up) == Some(Color::White) {
                    continue;
                }
                self.run(CROSS_INSERT, at);
            } else if !faces.contains(&Face::Down) {
                let at = self.side_of(slot)?;
                self.run(EDGE_OUT_OF_SLICE, at);
            }

            let at = self.side_of(self.locate(&colors)?)?;
            self.spin_down(down_turns_between(at, side));
            if self.grid.facelet(self.down_edge(side), Face::Down) == Some(Color::White) {
                self.run(CROSS_INSERT, side);
            } else {
                self.run(CROSS_FLIP, side);
            }
        }
        log::debug!("top cross done after {} moves", self.moves.len());
        Ok(())
    }

    /// Places and orients the four White corners on Up.
    fn top_corners(&mut self) -> Result<(), CubeError> {
        for side in Face::SIDES {
            let colors = [
                Color::White,
                Color::of_face(side),
                Color::of_face(side.right_of()),
            ];
            let slot = self.locate(&colors)?;
            if self.grid.faces_of(slot).contains(&Face::Up) {
                let at = self.side_of(slot)?;
                if at == side && self.grid.facelet(slot, Face::Up) == Some(Color::White) {
                    continue;
                }
                self.run(CORNER_OUT, at);
            }

            let at = self.side_of(self.locate(&colors)?)?;
            self.spin_down(down_turns_between(at, side));
            let corner = self.down_corner(side);
            let white = self
                .grid
                .piece(corner)
                .and_then(|piece| piece.facing_of(Color::White));
            let algorithm = match white {
                Some(Face::Down) => CORNER_IN_DOWN,
                Some(face) if face == side => CORNER_IN_FRONT,
                _ => CORNER_IN_RIGHT,
            };
            self.run(algorithm, side);
        }
        log::debug!("top corners done after {} moves", self.moves.len());
        Ok(())
    }

    /// Inserts the four edges between the side centers.
    fn middle_edges(&mut self) -> Result<(), CubeError> {
        for side in Face::SIDES {
            let colors = [Color::of_face(side), Color::of_face(side.right_of())];
            let slot = self.locate(&colors)?;
            if !self.grid.faces_of(slot).contains(&Face::Down) {
                let at = self.side_of(slot)?;
                if at == side && self.grid.facelet(slot, side) == Some(colors[0]) {
                    continue;
                }
                self.run(MIDDLE_RIGHT, at);
            }

            let slot = self.locate(&colors)?;
            let at = self.side_of(slot)?;
            let (Some(side_color), Some(down_color)) = (
                self.grid.facelet(slot, at),
                self.grid.facelet(slot, Face::Down),
            ) else {
                return Err(CubeError::UnsolvableState(format!(
                    "middle edge {colors:?} has no visible stickers"
                )));
            };
            let target = side_color.home_face();
            self.spin_down(down_turns_between(at, target));
            if down_color.home_face() == target.right_of() {
                self.run(MIDDLE_RIGHT, target);
            } else {
                self.run(MIDDLE_LEFT, target);
            }
        }
        log::debug!("middle layer done after {} moves", self.moves.len());
        Ok(())
    }

    /// Which bottom edges are oriented, read from their flip bit.
    fn bottom_edges_oriented(&self) -> [bool; 4] {
        Face::SIDES.map(|side| {
            self.grid
                .piece(self.down_edge(side))
                .is_some_and(|piece| piece.orientation() & 0b01 == 0)
        })
    }

    fn bottom_edges_matching(grid: &CubeGrid) -> [bool; 4] {
        Face::SIDES.map(|side| {
            grid.facelet(grid.slot_at(&[Face::Down, side]), side) == Some(Color::of_face(side))
        })
    }

    /// Applies whichever table entry matches `pattern` until `pattern`
    /// reports every position done.
    fn run_cases(
        &mut self,
        cases: &[([bool; 4], &str)],
        pattern: impl Fn(&Self) -> [bool; 4],
        step: &str,
    ) -> Result<(), CubeError> {
        for _ in 0..=3 {
            let current = pattern(&*self);
            if current.iter().all(|&done| done) {
                log::debug!("{step} done after {} moves", self.moves.len());
                return Ok(());
            }
            let Some(&(_, algorithm)) = cases.iter().find(|(case, _)| *case == current) else {
                return Err(CubeError::UnsolvableState(format!(
                    "unrecognized {step} pattern {current:?}"
                )));
            };
            self.run(algorithm, Face::Front);
        }
        Err(CubeError::UnsolvableState(format!("{step} did not converge")))
    }

    fn bottom_edge_orientation(&mut self) -> Result<(), CubeError> {
        self.run_cases(
            &EDGE_ORIENT_CASES,
            Self::bottom_edges_oriented,
            "bottom edge orientation",
        )
    }

    fn bottom_edge_permutation(&mut self) -> Result<(), CubeError> {
        // start from the Down rotation that already matches the most edges
        let best = (0..4)
            .max_by_key(|&turns| {
                let mut preview = self.grid.clone();
                if turns > 0 {
                    preview.apply_all(&[Move::new(Face::Down, turns as u32, 0)]);
                }
                let matching = Self::bottom_edges_matching(&preview);
                (matching.iter().filter(|&&m| m).count(), 4 - turns)
            })
            .unwrap_or(0);
        self.spin_down(best);
        self.run_cases(
            &EDGE_PERMUTE_CASES,
            |solver| Self::bottom_edges_matching(&solver.grid),
            "bottom edge permutation",
        )
    }

    /// For each bottom corner slot (by side), the side whose slot its piece
    /// belongs in.
    fn bottom_corner_homes(&self, grid: &CubeGrid) -> Result<[usize; 4], CubeError> {
        let mut homes = [0; 4];
        for (position, side) in Face::SIDES.into_iter().enumerate() {
            let piece = grid.piece(self.down_corner(side));
            homes[position] = Face::SIDES
                .iter()
                .position(|&home| {
                    piece.is_some_and(|piece| {
                        piece.has_colors(&[
                            Color::Yellow,
                            Color::of_face(home),
                            Color::of_face(home.right_of()),
                        ])
                    })
                })
                .ok_or_else(|| {
                    CubeError::UnsolvableState(format!("no bottom corner belongs at {side}"))
                })?;
        }
        Ok(homes)
    }

    fn bottom_corner_permutation(&mut self) -> Result<(), CubeError> {
        if self.grid.layers() == 2 {
            // without centers any Down rotation is a candidate; pick one
            // leaving an even permutation a 3-cycle can finish
            let mut best: Option<(usize, usize)> = None;
            for turns in 0..4 {
                let mut preview = self.grid.clone();
                if turns > 0 {
                    preview.apply_all(&[Move::new(Face::Down, turns as u32, 0)]);
                }
                let homes = self.bottom_corner_homes(&preview)?;
                let fixed = (0..4).filter(|&i| homes[i] == i).count();
                if is_even(&homes) && best.map_or(true, |(most, _)| fixed > most) {
                    best = Some((fixed, turns));
                }
            }
            let (_, turns) = best.ok_or_else(|| {
                CubeError::UnsolvableState("bottom corners have odd parity".to_string())
            })?;
            self.spin_down(turns);
        }

        let fixed_sides = |solver: &Self| -> Result<Vec<Face>, CubeError> {
            let homes = solver.bottom_corner_homes(&solver.grid)?;
            Ok(Face::SIDES
                .into_iter()
                .enumerate()
                .filter(|&(i, _)| homes[i] == i)
                .map(|(_, side)| side)
                .collect())
        };
        let mut fixed = fixed_sides(&*self)?;
        if fixed.len() == 4 {
            return Ok(());
        }
        if fixed.is_empty() {
            self.run(CORNER_CYCLE, Face::Front);
            fixed = fixed_sides(&*self)?;
        }
        let Some(&anchor) = fixed.first() else {
            return Err(CubeError::UnsolvableState(
                "no bottom corner can anchor the 3-cycle".to_string(),
            ));
        };

        // the cycle fixes the corner left of its front, so face right of
        // the anchor and pick the direction that sends the front corner home
        let front = anchor.right_of();
        let homes = self.bottom_corner_homes(&self.grid)?;
        if homes[side_index(front)] == side_index(front.right_of()) {
            self.run(CORNER_CYCLE, front);
        } else {
            self.run_inverse(CORNER_CYCLE, front);
        }
        log::debug!("bottom corners permuted after {} moves", self.moves.len());
        Ok(())
    }

    /// Twists bottom corners in pairs through DFL, then undoes the Down
    /// turns spent visiting them.
    fn bottom_corner_orientation(&mut self) -> Result<(), CubeError> {
        let oriented = |solver: &Self| {
            Face::SIDES
                .iter()
                .all(|&side| solver.twist(solver.down_corner(side)) == 0)
        };

        let mut spins = 0;
        while !oriented(&*self) {
            if spins == 4 {
                return Err(CubeError::UnsolvableState(
                    "bottom corner twists do not cancel".to_string(),
                ));
            }
            let twist = self.twist(self.down_corner(Face::Left));
            if twist != 0 {
                // partner positions in Down quarter turns from DFL
                let others: Vec<(usize, u8)> = [Face::Front, Face::Right, Face::Back]
                    .into_iter()
                    .enumerate()
                    .map(|(i, side)| (i + 1, self.twist(self.down_corner(side))))
                    .collect();
                let partner = others
                    .iter()
                    .find(|&&(_, t)| t == (3 - twist) % 3)
                    .or_else(|| others.iter().find(|&&(_, t)| t != 0))
                    .map(|&(distance, _)| distance)
                    .ok_or_else(|| {
                        CubeError::UnsolvableState("a lone bottom corner is twisted".to_string())
                    })?;
                let algorithm = CORNER_TWISTS[twist as usize - 1];
                self.run(algorithm, Face::Front);
                self.spin_down(4 - partner);
                self.run_inverse(algorithm, Face::Front);
                self.spin_down(partner);
            }
            self.spin_down(1);
            spins += 1;
        }
        self.spin_down(4 - spins % 4);
        log::debug!("bottom corners oriented after {} moves", self.moves.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scramble::scramble_moves;

    fn unsettled_slots(grid: &CubeGrid) -> Vec<usize> {
        (0..grid.slots().len())
            .filter(|&idx| grid.piece(idx).is_some() && !grid.is_home(idx))
            .collect()
    }

    fn solve_seeds(layers: usize, seeds: std::ops::Range<u64>) -> usize {
        let mut longest = 0;
        for seed in seeds {
            let mut grid = CubeGrid::new(layers);
            grid.apply_all(&scramble_moves(layers, &mut fastrand::Rng::with_seed(seed)));
            let solution = solve(&grid).unwrap_or_else(|err| panic!("seed {seed}: {err}"));
            grid.apply_all(&solution);
            assert!(grid.is_solved(), "seed {seed} on {layers} layers");
            longest = longest.max(solution.len());
        }
        longest
    }

    #[test_log::test]
    fn test_solves_random_two_layer_cubes() {
        let longest = solve_seeds(2, 0..150);
        assert!(longest > 0);
    }

    #[test_log::test]
    fn test_solves_random_three_layer_cubes() {
        let longest = solve_seeds(3, 0..150);
        assert!(longest < 400, "longest solution {longest}");
    }

    #[test]
    fn test_solved_cube_needs_no_moves() {
        for layers in [2, 3] {
            assert!(solve(&CubeGrid::new(layers)).unwrap().is_empty());
        }
    }

    #[test]
    fn test_rejects_other_sizes() {
        assert!(matches!(
            solve(&CubeGrid::new(4)),
            Err(CubeError::UnsupportedSize(4))
        ));
    }

    #[test]
    fn test_solve_does_not_touch_input() {
        let mut grid = CubeGrid::new(3);
        grid.apply_all(&parse_notation("R U F' D2 L.1"));
        let snapshot = grid.clone();
        solve(&grid).unwrap();
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn test_bottom_layer_algorithms_keep_upper_layers() {
        let mut algorithms: Vec<&str> = EDGE_ORIENT_CASES
            .iter()
            .chain(EDGE_PERMUTE_CASES.iter())
            .map(|&(_, algorithm)| algorithm)
            .collect();
        algorithms.push(CORNER_CYCLE);
        for algorithm in algorithms {
            let mut grid = CubeGrid::new(3);
            grid.apply_all(&parse_notation(algorithm));
            for idx in unsettled_slots(&grid) {
                assert_eq!(grid.position(idx)[1], 0, "{algorithm} disturbs slot {idx}");
            }
        }
    }

    #[test]
    fn test_corner_cycle_moves_three_corners() {
        let mut grid = CubeGrid::new(3);
        grid.apply_all(&parse_notation(CORNER_CYCLE));
        let expected: Vec<usize> = [
            [Face::Down, Face::Front, Face::Right],
            [Face::Down, Face::Back, Face::Right],
            [Face::Down, Face::Back, Face::Left],
        ]
        .iter()
        .map(|faces| grid.slot_at(faces))
        .collect();
        let mut unsettled = unsettled_slots(&grid);
        let mut expected = expected;
        unsettled.sort();
        expected.sort();
        assert_eq!(unsettled, expected);
        // DFR's piece went to DBR
        let dbr = grid.slot_at(&[Face::Down, Face::Back, Face::Right]);
        let dfr = grid.slot_at(&[Face::Down, Face::Front, Face::Right]);
        assert_eq!(grid.piece(dbr).unwrap().home(), dfr);
    }

    #[test]
    fn test_twist_commutator_twists_two_corners() {
        for algorithm in CORNER_TWISTS {
            for partner in 1..4 {
                let mut grid = CubeGrid::new(3);
                let twist = parse_notation(algorithm);
                grid.apply_all(&twist);
                grid.apply_all(&[Move::new(Face::Down, 4 - partner as u32, 0)]);
                grid.apply_all(&invert_sequence(&twist));
                grid.apply_all(&[Move::new(Face::Down, partner as u32, 0)]);
                let unsettled = unsettled_slots(&grid);
                assert_eq!(unsettled.len(), 2, "{algorithm} with partner {partner}");
                for idx in unsettled {
                    let piece = grid.piece(idx).unwrap();
                    assert_eq!(piece.home(), idx, "twisted corners stay in place");
                    assert_ne!(piece.orientation(), 0);
                }
            }
        }
    }

    #[test]
    fn test_middle_algorithms_only_borrow_the_bottom_layer() {
        for (algorithm, slot_side) in [(MIDDLE_RIGHT, Face::Right), (MIDDLE_LEFT, Face::Left)] {
            let mut grid = CubeGrid::new(3);
            grid.apply_all(&invert_sequence(&parse_notation(algorithm)));
            let target = grid.slot_at(&[Face::Front, slot_side]);
            for idx in unsettled_slots(&grid) {
                assert!(
                    idx == target || grid.position(idx)[1] == 0,
                    "{algorithm} disturbs slot {idx}"
                );
            }
        }
    }

    #[test]
    fn test_helpers() {
        assert_eq!(down_turns_between(Face::Front, Face::Right), 1);
        assert_eq!(down_turns_between(Face::Left, Face::Front), 1);
        assert_eq!(down_turns_between(Face::Back, Face::Front), 2);
        assert_eq!(leading_side(&[Face::Up, Face::Back]), Some(Face::Back));
        assert_eq!(leading_side(&[Face::Back, Face::Left]), Some(Face::Back));
        assert_eq!(leading_side(&[Face::Front, Face::Left]), Some(Face::Left));
        assert_eq!(
            leading_side(&[Face::Down, Face::Front, Face::Right]),
            Some(Face::Front)
        );
        assert!(is_even(&[0, 1, 2, 3]));
        assert!(is_even(&[1, 2, 0, 3]));
        assert!(!is_even(&[1, 0, 2, 3]));
    }
}
