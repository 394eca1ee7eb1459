//! Faces, axes and the integer rotations a cube turn is built from.
//!
//! World space is right-handed with +X pointing Right, +Y Up and +Z toward
//! the Front face. Slot centers are expressed in doubled coordinates so that
//! every slot of an N-layer cube lands on an integer lattice point centered
//! on the origin (see `grid::centered`).

use std::fmt;

/// A 3D integer vector in doubled world coordinates, ordered (x, y, z).
pub type Coord = (i32, i32, i32);

/// One of the three world axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Picks this axis' component out of a world vector.
    #[inline]
    pub fn component(self, (x, y, z): Coord) -> i32 {
        match self {
            Axis::X => x,
            Axis::Y => y,
            Axis::Z => z,
        }
    }
}

/// A face of the cube, named after the side it sits on.
///
/// The declaration order (F, B, R, L, U, D) is also the row order of the
/// per-face lookup tables in `grid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    Front,
    Back,
    Right,
    Left,
    Up,
    Down,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Right,
        Face::Left,
        Face::Up,
        Face::Down,
    ];

    /// The four side faces in clockwise order seen from above.
    pub const SIDES: [Face; 4] = [Face::Front, Face::Right, Face::Back, Face::Left];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Notation letter for this face.
    pub fn letter(self) -> char {
        match self {
            Face::Front => 'F',
            Face::Back => 'B',
            Face::Right => 'R',
            Face::Left => 'L',
            Face::Up => 'U',
            Face::Down => 'D',
        }
    }

    /// Parses a notation letter, accepting either case.
    pub fn from_letter(letter: char) -> Option<Face> {
        match letter.to_ascii_uppercase() {
            'F' => Some(Face::Front),
            'B' => Some(Face::Back),
            'R' => Some(Face::Right),
            'L' => Some(Face::Left),
            'U' => Some(Face::Up),
            'D' => Some(Face::Down),
            _ => None,
        }
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
            Face::Right => Face::Left,
            Face::Left => Face::Right,
            Face::Up => Face::Down,
            Face::Down => Face::Up,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Face::Right | Face::Left => Axis::X,
            Face::Up | Face::Down => Axis::Y,
            Face::Front | Face::Back => Axis::Z,
        }
    }

    /// Outward unit normal.
    pub fn normal(self) -> Coord {
        match self {
            Face::Right => (1, 0, 0),
            Face::Left => (-1, 0, 0),
            Face::Up => (0, 1, 0),
            Face::Down => (0, -1, 0),
            Face::Front => (0, 0, 1),
            Face::Back => (0, 0, -1),
        }
    }

    /// Inverse of [`Face::normal`].
    pub fn from_normal(normal: Coord) -> Option<Face> {
        Face::ALL.into_iter().find(|face| face.normal() == normal)
    }

    /// The side face clockwise of this one seen from above.
    ///
    /// Up and Down map to themselves.
    pub fn right_of(self) -> Face {
        match self {
            Face::Front => Face::Right,
            Face::Right => Face::Back,
            Face::Back => Face::Left,
            Face::Left => Face::Front,
            vertical => vertical,
        }
    }

    pub fn left_of(self) -> Face {
        match self {
            Face::Front => Face::Left,
            Face::Left => Face::Back,
            Face::Back => Face::Right,
            Face::Right => Face::Front,
            vertical => vertical,
        }
    }

    /// Relabels a face written for a Front-facing observer into the frame
    /// where `front` plays the role of Front.
    ///
    /// Up and Down are shared by every frame.
    pub fn in_frame(self, front: Face) -> Face {
        let (Some(offset), Some(position)) = (side_position(front), side_position(self)) else {
            return self;
        };
        Face::SIDES[(position + offset) % 4]
    }
}

fn side_position(face: Face) -> Option<usize> {
    Face::SIDES.iter().position(|&side| side == face)
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[inline]
pub fn dot(a: Coord, b: Coord) -> i32 {
    a.0 * b.0 + a.1 * b.1 + a.2 * b.2
}

#[inline]
pub fn cross(a: Coord, b: Coord) -> Coord {
    (
        a.1 * b.2 - a.2 * b.1,
        a.2 * b.0 - a.0 * b.2,
        a.0 * b.1 - a.1 * b.0,
    )
}

/// A proper rotation of the cube lattice stored as a row-major integer matrix.
///
/// Every entry is -1, 0 or 1, so composition never leaves the 24-element
/// rotation group of the cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rotation([[i8; 3]; 3]);

impl Rotation {
    pub const IDENTITY: Rotation = Rotation([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// A clockwise quarter turn looking at `face` from outside the cube.
    ///
    /// Clockwise seen from outside is a -90 degree turn about the outward
    /// normal `a`, which maps `v` to `a (a . v) - a x v`.
    pub fn quarter_turn(face: Face) -> Rotation {
        let axis = face.normal();
        let basis = [(1, 0, 0), (0, 1, 0), (0, 0, 1)];
        let mut rows = [[0i8; 3]; 3];
        for (column, unit) in basis.into_iter().enumerate() {
            let along = dot(axis, unit);
            let (cx, cy, cz) = cross(axis, unit);
            let image = (
                axis.0 * along - cx,
                axis.1 * along - cy,
                axis.2 * along - cz,
            );
            rows[0][column] = image.0 as i8;
            rows[1][column] = image.1 as i8;
            rows[2][column] = image.2 as i8;
        }
        Rotation(rows)
    }

    /// Applies the rotation to a vector.
    #[inline]
    pub fn apply(&self, (x, y, z): Coord) -> Coord {
        let m = &self.0;
        let row = |r: usize| m[r][0] as i32 * x + m[r][1] as i32 * y + m[r][2] as i32 * z;
        (row(0), row(1), row(2))
    }

    /// Composition that applies `self` first and `next` second.
    pub fn then(&self, next: &Rotation) -> Rotation {
        let mut out = [[0i8; 3]; 3];
        for (r, out_row) in out.iter_mut().enumerate() {
            for (c, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| next.0[r][k] * self.0[k][c]).sum();
            }
        }
        Rotation(out)
    }

    /// The inverse rotation, which for an orthogonal matrix is its transpose.
    pub fn inverse(&self) -> Rotation {
        let m = &self.0;
        Rotation([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }

    pub fn is_identity(&self) -> bool {
        *self == Rotation::IDENTITY
    }

    /// Row-major float copy, for rendering.
    pub fn to_f32(&self) -> [[f32; 3]; 3] {
        self.0.map(|row| row.map(f32::from))
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::IDENTITY
    }
}
