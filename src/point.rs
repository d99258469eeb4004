use crate::{board::FixtureId, parts::PinKind, Direction};

/// Set of compass directions, one bit per [`Direction`] index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Directions(u8);

impl Directions {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::iter_all().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Direction> for Directions {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut dirs = Self::EMPTY;
        for dir in iter {
            dirs.insert(dir);
        }
        dirs
    }
}

/// Connectivity state of one board cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Point {
    pub directions: Directions,
    pub locked: bool,
    pub(crate) pin: Option<PinKind>,
    pub(crate) part: Option<FixtureId>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(&self) -> Option<PinKind> {
        self.pin
    }

    /// Fixture occupying this cell through one of its footprint points.
    pub fn part(&self) -> Option<FixtureId> {
        self.part
    }

    pub fn connect(&mut self, kind: PinKind) {
        self.pin = Some(kind);
    }

    pub fn connect_input(&mut self) {
        self.connect(PinKind::Input);
    }

    pub fn connect_output(&mut self) {
        self.connect(PinKind::Output);
    }

    pub fn connect_structural(&mut self) {
        self.connect(PinKind::Structural);
    }

    pub fn disconnect(&mut self) {
        self.pin = None;
    }

    pub fn is_output(&self) -> bool {
        self.pin == Some(PinKind::Output)
    }

    pub fn etch_direction(&mut self, dir: Direction) {
        self.directions.insert(dir);
    }

    pub fn clear_direction(&mut self, dir: Direction) {
        self.directions.remove(dir);
    }

    pub fn has_direction(&self, dir: Direction) -> bool {
        self.directions.contains(dir)
    }

    pub fn has_paths(&self) -> bool {
        !self.directions.is_empty()
    }

    /// Pins, dead ends and branches. Only a plain point with exactly two
    /// links is a through point.
    pub fn is_junction(&self) -> bool {
        self.pin.is_some() || self.directions.len() != 2
    }

    pub fn flatten(&mut self, other: &Point) {
        self.directions = self.directions.union(other.directions);
    }

    pub fn path_overlaps(&self, other: &Point) -> bool {
        !self.directions.intersection(other.directions).is_empty()
    }

    pub fn path_equals(&self, other: &Point) -> bool {
        self.directions.intersection(other.directions) == other.directions
    }

    pub fn erase_paths(&mut self, other: &Point) {
        self.directions = self.directions.difference(other.directions);
    }

    /// Etched directions, skipping `exclude`.
    pub fn connected(&self, exclude: Option<Direction>) -> impl Iterator<Item = Direction> {
        self.directions.iter().filter(move |d| Some(*d) != exclude)
    }
}
