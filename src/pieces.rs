//! Cube pieces, sticker colors and the display palette.
//!
//! A piece never changes identity: it remembers the slot it was built in
//! and the face each of its stickers looked at when it was home. Turns only
//! accumulate a rotation and update the small orientation code.

use std::fmt;

use crate::error::CubeError;
use crate::geometry::{Face, Rotation};

/// A sticker color, named after the face it belongs to on a solved cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Yellow,
    Red,
    Orange,
    Blue,
    Green,
}

impl Color {
    pub const ALL: [Color; 6] = [
        Color::White,
        Color::Yellow,
        Color::Red,
        Color::Orange,
        Color::Blue,
        Color::Green,
    ];

    /// The color of `face` on a solved cube.
    pub fn of_face(face: Face) -> Color {
        match face {
            Face::Up => Color::White,
            Face::Down => Color::Yellow,
            Face::Front => Color::Red,
            Face::Back => Color::Orange,
            Face::Right => Color::Blue,
            Face::Left => Color::Green,
        }
    }

    /// Inverse of [`Color::of_face`].
    pub fn home_face(self) -> Face {
        match self {
            Color::White => Face::Up,
            Color::Yellow => Face::Down,
            Color::Red => Face::Front,
            Color::Orange => Face::Back,
            Color::Blue => Face::Right,
            Color::Green => Face::Left,
        }
    }

    /// Single-letter abbreviation used in nets and snapshots.
    pub fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Blue => 'B',
            Color::Green => 'G',
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// An sRGB color parsed from `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Rgb, CubeError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CubeError::InvalidColor(text.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| CubeError::InvalidColor(text.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Like [`Rgb::from_hex`] but falls back to white on bad input.
    pub fn from_hex_or_white(text: &str) -> Rgb {
        Rgb::from_hex(text).unwrap_or_else(|err| {
            log::warn!("{err}, using white");
            Rgb::WHITE
        })
    }

    /// Channels scaled to `0.0..=1.0` for the renderer.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Display colors for the six sticker colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: [Rgb; 6],
}

impl Palette {
    /// Builds a palette from hex strings in [`Color::ALL`] order.
    ///
    /// Unparseable entries become white and missing entries keep the
    /// default color.
    pub fn from_hex_list(entries: &[&str]) -> Palette {
        let mut palette = Palette::default();
        for (slot, text) in palette.colors.iter_mut().zip(entries) {
            *slot = Rgb::from_hex_or_white(text);
        }
        palette
    }

    pub fn rgb(&self, color: Color) -> Rgb {
        self.colors[color.index()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: [
                Rgb::new(0xff, 0xff, 0xff),
                Rgb::new(0xff, 0xff, 0x00),
                Rgb::new(0xff, 0x00, 0x00),
                Rgb::new(0xff, 0xa5, 0x00),
                Rgb::new(0x00, 0x00, 0xff),
                Rgb::new(0x00, 0xff, 0x00),
            ],
        }
    }
}

/// One colored facet of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sticker {
    pub color: Color,
    /// The face this sticker looks at while the piece is in its home slot.
    pub home_face: Face,
}

/// The three kinds of visible piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceClass {
    Center,
    Edge,
    Corner,
}

/// A physical piece sitting in some slot of the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    home: usize,
    stickers: Vec<Sticker>,
    rotation: Rotation,
    /// Corner twist in 0..3 or the two edge bits in 0..4; always 0 for centers.
    orientation: u8,
}

impl Piece {
    /// Builds a piece in its home slot with stickers facing `faces`.
    ///
    /// `faces` must hold one to three faces in U/D, F/B, R/L priority order,
    /// which makes the first sticker the primary one.
    pub(crate) fn new(home: usize, faces: &[Face]) -> Piece {
        debug_assert!((1..=3).contains(&faces.len()));
        Piece {
            home,
            stickers: faces
                .iter()
                .map(|&face| Sticker {
                    color: Color::of_face(face),
                    home_face: face,
                })
                .collect(),
            rotation: Rotation::IDENTITY,
            orientation: 0,
        }
    }

    /// Grid index of the slot this piece belongs in.
    pub fn home(&self) -> usize {
        self.home
    }

    pub fn class(&self) -> PieceClass {
        match self.stickers.len() {
            1 => PieceClass::Center,
            2 => PieceClass::Edge,
            _ => PieceClass::Corner,
        }
    }

    pub fn stickers(&self) -> &[Sticker] {
        &self.stickers
    }

    /// Rotation accumulated since the piece left home.
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Orientation code: corner twist `0..3`, edge bits `0..4`, centers 0.
    ///
    /// Edge bit 0 is set when the edge is misoriented with respect to the
    /// U/D-then-F/B reference, bit 1 with respect to U/D-then-R/L.
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    /// Whether the piece shows exactly the colors in `colors`, in any order.
    pub fn has_colors(&self, colors: &[Color]) -> bool {
        self.stickers.len() == colors.len()
            && colors
                .iter()
                .all(|color| self.stickers.iter().any(|sticker| sticker.color == *color))
    }

    /// Sticker colors in a canonical order, for census keys.
    pub fn sorted_colors(&self) -> Vec<Color> {
        let mut colors: Vec<Color> = self.stickers.iter().map(|s| s.color).collect();
        colors.sort();
        colors
    }

    /// The color currently facing the world direction of `face`, if any.
    pub fn color_facing(&self, face: Face) -> Option<Color> {
        let home_direction = self.rotation.inverse().apply(face.normal());
        self.stickers
            .iter()
            .find(|sticker| sticker.home_face.normal() == home_direction)
            .map(|sticker| sticker.color)
    }

    /// The world face a sticker of `color` currently looks at.
    pub fn facing_of(&self, color: Color) -> Option<Face> {
        let sticker = self.stickers.iter().find(|s| s.color == color)?;
        Face::from_normal(self.rotation.apply(sticker.home_face.normal()))
    }

    /// Applies one quarter turn: the rotation composes on top of the current
    /// one and `delta` is folded into the orientation code.
    ///
    /// Corners add `delta` modulo 3, edges XOR it in, centers ignore it.
    pub(crate) fn turn(&mut self, quarter: &Rotation, delta: u8) {
        self.rotation = self.rotation.then(quarter);
        self.orientation = match self.class() {
            PieceClass::Corner => (self.orientation + delta) % 3,
            PieceClass::Edge => self.orientation ^ delta,
            PieceClass::Center => 0,
        };
    }
}
