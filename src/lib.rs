//! Grid-based circuit board connectivity: points with compass etch links,
//! path tracing and validation, part placement and a compact binary codec.

#[macro_use]
mod macros;

pub mod board;
pub mod config;
pub mod containers;
pub mod error;
pub mod io;
pub mod netlist;
pub mod parts;
pub mod path;
pub mod point;
pub mod vector;

pub use board::{
    editor::{Editor, EtchGesture, EtchPlan, SelectMode},
    Fixture, FixtureId, PackReport, Pcb,
};
pub use config::EditorConfig;
pub use error::{DecodeError, Error, Result};
pub use parts::{Part, PartLibrary, PinKind};
pub use path::Path;
pub use point::{Directions, Point};
pub use vector::Vec2i;

/// Compass direction between neighboring cells. Y grows downwards.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Self::East,
        Self::NorthEast,
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
        Self::South,
        Self::SouthEast,
    ];

    pub fn iter_all() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter()
    }

    pub fn iter_cardinal() -> impl Iterator<Item = Self> {
        [Self::East, Self::North, Self::West, Self::South].into_iter()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn unit_vector(self) -> Vec2i {
        match self {
            Self::East => [1, 0],
            Self::NorthEast => [1, -1],
            Self::North => [0, -1],
            Self::NorthWest => [-1, -1],
            Self::West => [-1, 0],
            Self::SouthWest => [-1, 1],
            Self::South => [0, 1],
            Self::SouthEast => [1, 1],
        }
        .into()
    }

    /// Direction of a single grid step, `None` for zero or longer deltas.
    pub fn from_vector(delta: Vec2i) -> Option<Self> {
        Self::iter_all().find(|d| d.unit_vector() == delta)
    }

    pub fn inverted(self) -> Self {
        self.rotated(4)
    }

    /// Rotates counterclockwise by `steps` eighths of a turn.
    pub fn rotated(self, steps: i32) -> Self {
        Self::ALL[(self.index() as i32 + steps).rem_euclid(8) as usize]
    }
}
