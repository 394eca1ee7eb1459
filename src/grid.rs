//! The slot grid and the turn engine.
//!
//! Slots are stored flat in (z, y, x) order: `idx = (z * L + y) * L + x`,
//! where `z = 0` is the Front layer, `y = L - 1` the Up layer and
//! `x = L - 1` the Right layer. Interior slots hold no piece.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::CubeError;
use crate::geometry::{Axis, Coord, Face, Rotation};
use crate::moves::Move;
use crate::pieces::{Color, Piece, PieceClass};

/// Largest supported layer count.
pub const MAX_LAYERS: usize = 64;

/// Grid coordinates of a slot indexed by [`Axis`]: `[x, y, z]`.
pub type Position = [usize; 3];

/// Twist added to a corner by a clockwise outer-layer quarter turn, indexed
/// by turning face (F, B, R, L, U, D) and the corner's position before the
/// turn, `z_back * 4 + y_up * 2 + x_right`.
const CORNER_TWIST: [[u8; 8]; 6] = [
    [2, 1, 1, 2, 0, 0, 0, 0],
    [0, 0, 0, 0, 1, 2, 2, 1],
    [0, 2, 0, 1, 0, 1, 0, 2],
    [1, 0, 2, 0, 2, 0, 1, 0],
    [0; 8],
    [0; 8],
];

/// Edge orientation bits toggled by an outer-layer quarter turn, per face.
const EDGE_TOGGLE: [u8; 6] = [0b01, 0b01, 0b10, 0b10, 0b00, 0b00];

/// Inner slice turns toggle both edge bits.
const SLICE_EDGE_TOGGLE: u8 = 0b11;

/// Result of [`CubeGrid::apply_turn`], enough to animate the turn.
#[derive(Clone, Debug)]
pub struct TurnResult {
    /// The move as it was asked for.
    pub requested: Move,
    /// The move actually performed after clamping and canonicalization.
    pub applied: Move,
    /// Indices of every slot in the turned layer.
    pub slots: Vec<usize>,
    /// Grid contents before the turn.
    pub before: CubeGrid,
}

/// An N-layer cube: every slot and the piece in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubeGrid {
    layers: usize,
    slots: Vec<Option<Piece>>,
}

impl CubeGrid {
    /// Builds a solved cube, falling back to 2 layers for unusable sizes.
    pub fn new(layers: usize) -> CubeGrid {
        CubeGrid::try_new(layers).unwrap_or_else(|err| {
            log::warn!("{err}, building a 2 layer cube instead");
            CubeGrid::solved(2)
        })
    }

    /// Builds a solved cube, rejecting sizes outside `2..=MAX_LAYERS`.
    pub fn try_new(layers: usize) -> Result<CubeGrid, CubeError> {
        if !(2..=MAX_LAYERS).contains(&layers) {
            return Err(CubeError::InvalidLayers(layers));
        }
        Ok(CubeGrid::solved(layers))
    }

    fn solved(layers: usize) -> CubeGrid {
        let mut grid = CubeGrid {
            layers,
            slots: vec![None; layers * layers * layers],
        };
        for idx in 0..grid.slots.len() {
            let faces = grid.faces_of(idx);
            if !faces.is_empty() {
                grid.slots[idx] = Some(Piece::new(idx, &faces));
            }
        }
        grid
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn slots(&self) -> &[Option<Piece>] {
        &self.slots
    }

    pub fn piece(&self, idx: usize) -> Option<&Piece> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Flat index of a grid position.
    #[inline]
    pub fn index(&self, [x, y, z]: Position) -> usize {
        (z * self.layers + y) * self.layers + x
    }

    /// Grid position of a flat index.
    #[inline]
    pub fn position(&self, idx: usize) -> Position {
        let l = self.layers;
        [idx % l, (idx / l) % l, idx / (l * l)]
    }

    /// Slot center in doubled world coordinates, centered on the origin.
    ///
    /// Doubling keeps even-sized cubes on integer coordinates.
    pub fn centered(&self, idx: usize) -> Coord {
        let [x, y, z] = self.position(idx);
        let span = self.layers as i32 - 1;
        (2 * x as i32 - span, 2 * y as i32 - span, span - 2 * z as i32)
    }

    /// Faces a slot lies on, in U/D, F/B, R/L order. Empty for interior slots.
    pub fn faces_of(&self, idx: usize) -> Vec<Face> {
        let [x, y, z] = self.position(idx);
        let last = self.layers - 1;
        let mut faces = Vec::with_capacity(3);
        if y == last {
            faces.push(Face::Up);
        } else if y == 0 {
            faces.push(Face::Down);
        }
        if z == 0 {
            faces.push(Face::Front);
        } else if z == last {
            faces.push(Face::Back);
        }
        if x == last {
            faces.push(Face::Right);
        } else if x == 0 {
            faces.push(Face::Left);
        }
        faces
    }

    /// The slot touching exactly `faces`, centered along the other axes.
    ///
    /// On odd cubes `slot_at(&[Face::Up])` is the Up center and
    /// `slot_at(&[Face::Up, Face::Front])` the middle UF edge.
    pub fn slot_at(&self, faces: &[Face]) -> usize {
        let last = self.layers - 1;
        let mut position = [self.layers / 2; 3];
        for &face in faces {
            let (axis, value) = match face {
                Face::Right => (Axis::X, last),
                Face::Left => (Axis::X, 0),
                Face::Up => (Axis::Y, last),
                Face::Down => (Axis::Y, 0),
                Face::Front => (Axis::Z, 0),
                Face::Back => (Axis::Z, last),
            };
            position[axis as usize] = value;
        }
        self.index(position)
    }

    /// Color shown toward `face` by the piece in slot `idx`.
    pub fn facelet(&self, idx: usize, face: Face) -> Option<Color> {
        self.piece(idx)?.color_facing(face)
    }

    /// Linear scan for the piece carrying exactly `colors`.
    pub fn find(&self, colors: &[Color]) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|piece| piece.has_colors(colors)))
    }

    /// Whether slot `idx` holds its own piece, correctly oriented.
    pub fn is_home(&self, idx: usize) -> bool {
        self.piece(idx).is_some_and(|piece| {
            piece.home() == idx
                && (piece.class() == PieceClass::Center || piece.rotation().is_identity())
        })
    }

    /// Every piece home and, centers aside, unrotated.
    pub fn is_solved(&self) -> bool {
        (0..self.slots.len()).all(|idx| self.slots[idx].is_none() || self.is_home(idx))
    }

    /// Interior slots that hold no piece.
    pub fn empty_slots(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&idx| self.slots[idx].is_none())
            .collect()
    }

    /// Count of pieces per (class, sorted colors).
    pub fn census(&self) -> FxHashMap<(PieceClass, Vec<Color>), usize> {
        let mut census = FxHashMap::default();
        for piece in self.slots.iter().flatten() {
            *census
                .entry((piece.class(), piece.sorted_colors()))
                .or_insert(0) += 1;
        }
        census
    }

    /// The grid axis a face's layers are stacked along and the coordinate
    /// of the layer `depth` slices in from that face.
    fn layer_coordinate(&self, face: Face, depth: usize) -> (Axis, usize) {
        let far = self.layers - 1 - depth;
        match face {
            Face::Front => (Axis::Z, depth),
            Face::Back => (Axis::Z, far),
            Face::Right => (Axis::X, far),
            Face::Left => (Axis::X, depth),
            Face::Up => (Axis::Y, far),
            Face::Down => (Axis::Y, depth),
        }
    }

    /// Indices of every slot in the layer `depth` slices in from `face`.
    pub fn layer_slots(&self, face: Face, depth: usize) -> Vec<usize> {
        let (axis, layer) = self.layer_coordinate(face, depth);
        (0..self.slots.len())
            .filter(|&idx| self.position(idx)[axis as usize] == layer)
            .collect()
    }

    /// Turns `quarter_turns` clockwise quarters of the slice `depth` in
    /// from `face`. Never fails: bad depths clamp and turn counts fold.
    pub fn apply_turn(&mut self, face: Face, depth: usize, quarter_turns: u32) -> TurnResult {
        self.apply(Move::new(face, quarter_turns, depth))
    }

    /// Applies a move, returning the pre-turn snapshot for animation.
    pub fn apply(&mut self, requested: Move) -> TurnResult {
        let applied = requested.canonical(self.layers);
        let before = self.clone();
        for _ in 0..applied.turns() {
            self.quarter_turn(applied.face(), applied.depth());
        }
        TurnResult {
            requested,
            applied,
            slots: self.layer_slots(applied.face(), applied.depth()),
            before,
        }
    }

    /// Applies moves without keeping snapshots.
    pub fn apply_all(&mut self, moves: &[Move]) {
        for &mv in moves {
            let applied = mv.canonical(self.layers);
            for _ in 0..applied.turns() {
                self.quarter_turn(applied.face(), applied.depth());
            }
        }
    }

    /// One clockwise quarter turn of a canonical layer.
    fn quarter_turn(&mut self, face: Face, depth: usize) {
        let rotation = Rotation::quarter_turn(face);
        let outer = depth == 0;
        let last = self.layers - 1;

        for idx in self.layer_slots(face, depth) {
            let [x, y, z] = self.position(idx);
            let Some(piece) = self.slots[idx].as_mut() else {
                continue;
            };
            let delta = match piece.class() {
                PieceClass::Corner => {
                    let corner = (z == last) as usize * 4
                        + (y == last) as usize * 2
                        + (x == last) as usize;
                    CORNER_TWIST[face.index()][corner]
                }
                PieceClass::Edge if outer => EDGE_TOGGLE[face.index()],
                PieceClass::Edge => SLICE_EDGE_TOGGLE,
                PieceClass::Center => 0,
            };
            piece.turn(&rotation, delta);
        }

        self.rotate_rings(face, depth);
    }

    /// Moves slot contents one quarter around every concentric ring of the
    /// layer.
    ///
    /// Each face picks the in-plane axes `(a, b)` so that a clockwise turn
    /// carries the piece at `(a, b)` to `(b, L - 1 - a)`.
    fn rotate_rings(&mut self, face: Face, depth: usize) {
        let (fixed, layer) = self.layer_coordinate(face, depth);
        let (axis_a, axis_b) = match face {
            Face::Front => (Axis::X, Axis::Y),
            Face::Back => (Axis::Y, Axis::X),
            Face::Right => (Axis::Z, Axis::Y),
            Face::Left => (Axis::Y, Axis::Z),
            Face::Up => (Axis::X, Axis::Z),
            Face::Down => (Axis::Z, Axis::X),
        };
        let at = |a: usize, b: usize| {
            let mut position = [0; 3];
            position[fixed as usize] = layer;
            position[axis_a as usize] = a;
            position[axis_b as usize] = b;
            self.index(position)
        };

        let last = self.layers - 1;
        let mut cycles = Vec::new();
        for ring in 0..self.layers / 2 {
            for offset in ring..last - ring {
                cycles.push([
                    at(ring, offset),
                    at(offset, last - ring),
                    at(last - ring, last - offset),
                    at(last - offset, ring),
                ]);
            }
        }

        for [p0, p1, p2, p3] in cycles {
            let carried = self.slots[p3].take();
            self.slots[p3] = self.slots[p2].take();
            self.slots[p2] = self.slots[p1].take();
            self.slots[p1] = self.slots[p0].take();
            self.slots[p0] = carried;
        }
    }

    /// Slot shown at row `row`, column `column` of `face` in the net,
    /// reading each face as seen from outside with Up at the top (Front at
    /// the bottom for the Up face, at the top for the Down face).
    fn net_slot(&self, face: Face, row: usize, column: usize) -> usize {
        let last = self.layers - 1;
        let position = match face {
            Face::Front => [column, last - row, 0],
            Face::Back => [last - column, last - row, last],
            Face::Right => [last, last - row, column],
            Face::Left => [0, last - row, last - column],
            Face::Up => [column, last, last - row],
            Face::Down => [column, 0, row],
        };
        self.index(position)
    }

    fn net_row(&self, face: Face, row: usize) -> String {
        (0..self.layers)
            .map(|column| {
                self.facelet(self.net_slot(face, row, column), face)
                    .map_or('.', Color::letter)
            })
            .collect()
    }
}

/// Unfolded net: Up on top, then Left, Front, Right, Back, then Down.
impl fmt::Display for CubeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = " ".repeat(self.layers + 1);
        for row in 0..self.layers {
            writeln!(f, "{indent}{}", self.net_row(Face::Up, row))?;
        }
        for row in 0..self.layers {
            let band: Vec<String> = [Face::Left, Face::Front, Face::Right, Face::Back]
                .into_iter()
                .map(|face| self.net_row(face, row))
                .collect();
            writeln!(f, "{}", band.join(" "))?;
        }
        for row in 0..self.layers {
            writeln!(f, "{indent}{}", self.net_row(Face::Down, row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cross, dot};
    use crate::moves::parse_notation;

    fn scrambled(layers: usize, seed: u64, count: usize) -> CubeGrid {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut grid = CubeGrid::new(layers);
        for _ in 0..count {
            let face = Face::ALL[rng.usize(0..6)];
            grid.apply_turn(face, rng.usize(0..layers), rng.u32(1..=3));
        }
        grid
    }

    /// Twist recomputed from the piece's rotation: 0 when its U/D sticker
    /// faces U/D, else the clockwise facet index starting at the U/D facet.
    fn derived_corner_twist(grid: &CubeGrid, idx: usize) -> u8 {
        let piece = grid.piece(idx).unwrap();
        let (x, y, z) = grid.centered(idx);
        let vertical = (0, y.signum(), 0);
        let lateral = (x.signum(), 0, 0);
        let depth = (0, 0, z.signum());
        let clockwise = if dot(vertical, cross(lateral, depth)) < 0 {
            [vertical, lateral, depth]
        } else {
            [vertical, depth, lateral]
        };
        let shown = piece.rotation().apply(piece.stickers()[0].home_face.normal());
        clockwise.iter().position(|&facet| facet == shown).unwrap() as u8
    }

    /// Edge bits recomputed from the rotation against the two references.
    fn derived_edge_bits(grid: &CubeGrid, idx: usize) -> u8 {
        let piece = grid.piece(idx).unwrap();
        let facets = grid.faces_of(idx);
        let misoriented = |primary: Axis, fallback: Axis| -> u8 {
            let homes: Vec<Coord> = piece
                .stickers()
                .iter()
                .map(|s| s.home_face.normal())
                .collect();
            let reference = homes
                .iter()
                .find(|&&h| primary.component(h) != 0)
                .or_else(|| homes.iter().find(|&&h| fallback.component(h) != 0))
                .copied()
                .unwrap();
            let shown = piece.rotation().apply(reference);
            let axis = if facets.iter().any(|f| f.axis() == primary) {
                primary
            } else {
                fallback
            };
            (axis.component(shown) == 0) as u8
        };
        misoriented(Axis::Y, Axis::Z) | misoriented(Axis::Y, Axis::X) << 1
    }

    #[test]
    fn test_new_grid_is_solved() {
        for layers in 2..=5 {
            assert!(CubeGrid::new(layers).is_solved(), "{layers} layers");
        }
    }

    #[test]
    fn test_too_few_layers() {
        assert!(matches!(CubeGrid::try_new(1), Err(CubeError::InvalidLayers(1))));
        assert_eq!(CubeGrid::new(0).layers(), 2);
    }

    #[test_log::test]
    fn test_too_many_layers() {
        assert!(matches!(
            CubeGrid::try_new(3_000_000),
            Err(CubeError::InvalidLayers(3_000_000))
        ));
        assert!(CubeGrid::try_new(MAX_LAYERS).is_ok());
        assert_eq!(CubeGrid::new(usize::MAX).layers(), 2);
    }

    #[test]
    fn test_piece_counts() {
        let count = |grid: &CubeGrid, class: PieceClass| {
            grid.slots()
                .iter()
                .flatten()
                .filter(|piece| piece.class() == class)
                .count()
        };
        let two = CubeGrid::new(2);
        assert_eq!(count(&two, PieceClass::Corner), 8);
        assert_eq!(count(&two, PieceClass::Edge), 0);
        let three = CubeGrid::new(3);
        assert_eq!(count(&three, PieceClass::Edge), 12);
        assert_eq!(count(&three, PieceClass::Center), 6);
        assert_eq!(three.empty_slots(), vec![13]);
        let four = CubeGrid::new(4);
        assert_eq!(count(&four, PieceClass::Edge), 24);
        assert_eq!(count(&four, PieceClass::Center), 24);
        assert_eq!(four.empty_slots().len(), 8);
    }

    #[test]
    fn test_position_roundtrip() {
        let grid = CubeGrid::new(4);
        for idx in 0..64 {
            assert_eq!(grid.index(grid.position(idx)), idx, "index {idx}");
        }
    }

    #[test]
    fn test_quarter_turn_has_order_four() {
        for layers in 2..=4 {
            let start = scrambled(layers, 7, 20);
            for face in Face::ALL {
                for depth in 0..layers {
                    let mut grid = start.clone();
                    for _ in 0..4 {
                        grid.apply_turn(face, depth, 1);
                    }
                    assert_eq!(grid, start, "{face} depth {depth} on {layers} layers");
                }
            }
        }
    }

    #[test]
    fn test_turn_then_complement_restores() {
        for layers in 2..=4 {
            let start = scrambled(layers, 11, 25);
            for face in Face::ALL {
                for depth in 0..layers {
                    for turns in 1..=3 {
                        let mut grid = start.clone();
                        grid.apply_turn(face, depth, turns);
                        grid.apply_turn(face, depth, 4 - turns);
                        assert_eq!(grid, start, "{face}{turns} depth {depth}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_turn_unsolves() {
        for layers in 2..=4 {
            for face in Face::ALL {
                for depth in 0..layers {
                    for turns in 1..=3 {
                        let mut grid = CubeGrid::new(layers);
                        grid.apply_turn(face, depth, turns);
                        assert!(!grid.is_solved(), "{face}{turns}.{depth} on {layers}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_turns_preserve_census_and_interior() {
        for layers in 2..=5 {
            let fresh = CubeGrid::new(layers);
            for seed in 0..10 {
                let grid = scrambled(layers, seed, 40);
                assert_eq!(grid.census(), fresh.census(), "{layers} layers seed {seed}");
                assert_eq!(grid.empty_slots(), fresh.empty_slots());
            }
        }
    }

    #[test]
    fn test_slots_follow_rotation() {
        for layers in 2..=5 {
            for face in Face::ALL {
                for depth in 0..layers {
                    let mut grid = CubeGrid::new(layers);
                    let result = grid.apply_turn(face, depth, 1);
                    // a last-slice turn runs as three quarters of the opposite face
                    let quarter = Rotation::quarter_turn(result.applied.face());
                    let rotation = (0..result.applied.turns())
                        .fold(Rotation::IDENTITY, |rotation, _| rotation.then(&quarter));
                    for &idx in &result.slots {
                        if let Some(piece) = grid.piece(idx) {
                            assert_eq!(
                                grid.centered(idx),
                                rotation.apply(grid.centered(piece.home())),
                                "{face} depth {depth}, slot {idx} on {layers} layers"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_orientation_codes_match_rotation() {
        for layers in 2..=5 {
            for seed in 0..30 {
                let grid = scrambled(layers, seed, 30);
                for (idx, slot) in grid.slots().iter().enumerate() {
                    let Some(piece) = slot else { continue };
                    let expected = match piece.class() {
                        PieceClass::Corner => derived_corner_twist(&grid, idx),
                        PieceClass::Edge => derived_edge_bits(&grid, idx),
                        PieceClass::Center => 0,
                    };
                    assert_eq!(
                        piece.orientation(),
                        expected,
                        "slot {idx}, {layers} layers, seed {seed}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_last_slice_is_opposite_face() {
        let mut by_slice = CubeGrid::new(3);
        let result = by_slice.apply_turn(Face::Right, 2, 1);
        assert_eq!(result.applied, Move::new(Face::Left, 3, 0));
        let mut by_face = CubeGrid::new(3);
        by_face.apply_turn(Face::Left, 0, 3);
        assert_eq!(by_slice, by_face);
    }

    #[test_log::test]
    fn test_out_of_range_depth_turns_outer_layer() {
        let mut clamped = CubeGrid::new(3);
        let result = clamped.apply_turn(Face::Up, 17, 1);
        assert_eq!(result.applied.depth(), 0);
        assert_eq!(result.before, CubeGrid::new(3));
        let mut outer = CubeGrid::new(3);
        outer.apply_turn(Face::Up, 0, 1);
        assert_eq!(clamped, outer);
    }

    #[test]
    fn test_sexy_move_has_order_six() {
        for layers in [2, 3] {
            let mut grid = CubeGrid::new(layers);
            let sequence = parse_notation("R U R' U'");
            for round in 1..=6 {
                grid.apply_all(&sequence);
                assert_eq!(grid.is_solved(), round == 6, "round {round} on {layers} layers");
            }
        }
    }

    #[test]
    fn test_two_layer_commutator_cubed_is_not_identity() {
        let mut grid = CubeGrid::new(2);
        grid.apply_all(&parse_notation("R U R' U' R U R' U' R U R' U'"));
        assert!(!grid.is_solved());
        grid.apply_all(&parse_notation("R U R' U' R U R' U' R U R' U'"));
        assert!(grid.is_solved());
    }

    #[test]
    fn test_net_of_solved_cube() {
        let grid = CubeGrid::new(3);
        let expected = "    WWW\n    WWW\n    WWW\nGGG RRR BBB OOO\nGGG RRR BBB OOO\nGGG RRR BBB OOO\n    YYY\n    YYY\n    YYY\n";
        assert_eq!(grid.to_string(), expected);
    }

    #[test]
    fn test_net_after_front_turn() {
        let mut grid = CubeGrid::new(3);
        grid.apply_turn(Face::Front, 0, 1);
        assert_eq!(grid.net_row(Face::Up, 2), "GGG");
        assert_eq!(grid.net_row(Face::Right, 0), "WBB");
        assert_eq!(grid.net_row(Face::Down, 0), "BBB");
        assert_eq!(grid.net_row(Face::Left, 1), "GGY");
    }

    #[test]
    fn test_net_after_sexy_move() {
        let mut grid = CubeGrid::new(3);
        grid.apply_all(&parse_notation("R U R' U'"));
        insta::assert_snapshot!(format!("R U R' U' on 3 layers\n{grid}"));
    }

    #[test]
    fn test_net_two_layers() {
        let mut grid = CubeGrid::new(2);
        grid.apply_all(&parse_notation("R U"));
        insta::assert_snapshot!(format!("R U on 2 layers\n{grid}"));
    }

    #[test]
    fn test_facelet_and_find() {
        let mut grid = CubeGrid::new(3);
        let ufr = grid.slot_at(&[Face::Up, Face::Front, Face::Right]);
        assert_eq!(grid.find(&[Color::White, Color::Red, Color::Blue]), Some(ufr));
        grid.apply_turn(Face::Right, 0, 1);
        // R carries the UFR corner to UBR, white now facing back
        let ubr = grid.slot_at(&[Face::Up, Face::Back, Face::Right]);
        assert_eq!(grid.find(&[Color::White, Color::Red, Color::Blue]), Some(ubr));
        assert_eq!(grid.facelet(ubr, Face::Back), Some(Color::White));
        assert_eq!(grid.facelet(ubr, Face::Up), Some(Color::Red));
        assert_eq!(grid.facelet(ubr, Face::Right), Some(Color::Blue));
        assert_eq!(grid.facelet(ubr, Face::Front), None);
    }
}
