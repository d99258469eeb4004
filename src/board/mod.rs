use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    containers::{FixedVec, RaggedGrid},
    parts::{Configuration, Part, Pin},
    path::Path,
    point::Point,
    vector::Vec2i,
    Direction,
};

pub mod editor;
pub mod history;
pub mod selection;

pub type FixtureId = usize;

/// A placed part and the board position of its footprint origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: FixtureId,
    pub part: Part,
    pub pos: Vec2i,
}

impl Fixture {
    /// Board cells occupied by the footprint.
    pub fn points(&self) -> impl Iterator<Item = Vec2i> + '_ {
        let pos = self.pos;
        self.configuration()
            .footprint
            .points
            .iter()
            .map(move |p| pos + *p)
    }

    pub fn space(&self) -> impl Iterator<Item = Vec2i> + '_ {
        let pos = self.pos;
        self.configuration()
            .footprint
            .space
            .iter()
            .map(move |p| pos + *p)
    }

    pub fn air(&self) -> impl Iterator<Item = Vec2i> + '_ {
        let pos = self.pos;
        self.configuration()
            .footprint
            .air
            .iter()
            .map(move |p| pos + *p)
    }

    /// Pins with their board positions.
    pub fn pins(&self) -> impl Iterator<Item = (Vec2i, &Pin)> + '_ {
        let pos = self.pos;
        self.configuration()
            .io
            .iter()
            .map(move |p| (pos + p.offset(), p))
    }

    pub fn configuration(&self) -> &Configuration {
        self.part.configuration()
    }
}

/// Rows and columns removed from each side by [`Pcb::pack`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl PackReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Circuit board: a ragged grid of points plus the parts placed on it.
///
/// `Clone` is a deep copy. Points are values and fixtures share only their
/// immutable part definitions.
#[derive(Debug, Clone, Default)]
pub struct Pcb {
    grid: RaggedGrid<Point>,
    point_count: usize,
    width: u32,
    fixtures: FixedVec<Fixture>,
    air: HashMap<Vec2i, FixtureId>,
}

impl Pcb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        let mut pcb = Self::new();
        pcb.initialize(width, height);
        pcb
    }

    /// Replaces the board with a bare `width` x `height` rectangle.
    pub fn initialize(&mut self, width: u32, height: u32) {
        *self = Self::new();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                self.extend(Vec2i::new(x, y));
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.grid.row_count() as u32
    }

    /// Widens the board to at least `width` columns.
    pub(crate) fn reserve_width(&mut self, width: u32) {
        self.width = self.width.max(width);
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn point(&self, pos: Vec2i) -> Option<&Point> {
        self.grid.get(pos)
    }

    pub(crate) fn point_mut(&mut self, pos: Vec2i) -> Option<&mut Point> {
        self.grid.get_mut(pos)
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = (Vec2i, &Point)> {
        self.grid.iter()
    }

    pub fn is_air(&self, pos: Vec2i) -> bool {
        self.air.contains_key(&pos)
    }

    pub fn is_extendable(&self, pos: Vec2i) -> bool {
        self.point(pos).is_none() && !self.is_air(pos)
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id)
    }

    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }

    /// Fixture covering `pos` with a footprint point or a space cell.
    pub fn fixture_at(&self, pos: Vec2i) -> Option<&Fixture> {
        if let Some(id) = self.point(pos).and_then(Point::part) {
            return self.fixture(id);
        }
        self.fixtures().find(|f| f.space().any(|s| s == pos))
    }

    /// Adds a bare point at `pos`. Existing points are returned unchanged,
    /// negative positions are rejected.
    pub fn extend(&mut self, pos: Vec2i) -> Option<&mut Point> {
        let Some(index) = pos.to_index() else {
            warn!(%pos, "cannot extend into negative coordinates");
            return None;
        };

        if self.grid.get(pos).is_none() {
            self.point_count += 1;
            self.width = self.width.max(index.x() + 1);
        }
        Some(self.grid.get_or_insert_with(index, Point::new))
    }

    /// Extends every cell, shifting the board first so that negative cells
    /// land on the grid. Returns the applied shift; callers add it to any
    /// position they hold.
    pub fn extend_all(&mut self, cells: impl IntoIterator<Item = Vec2i>) -> Vec2i {
        let cells: Vec<Vec2i> = cells.into_iter().collect();
        let min_x = cells.iter().map(|c| c.x()).min().unwrap_or(0).min(0);
        let min_y = cells.iter().map(|c| c.y()).min().unwrap_or(0).min(0);
        let shift = Vec2i::new(-min_x, -min_y);

        if !shift.is_zero() {
            self.shift(shift.x() as u32, shift.y() as u32);
        }
        for cell in cells {
            self.extend(cell + shift);
        }
        shift
    }

    /// Removes the point at `pos` together with any part covering it and
    /// every link into or across the hole. The last point is never erased.
    pub fn erase(&mut self, pos: Vec2i) -> bool {
        let Some(point) = self.point(pos) else {
            return false;
        };
        if self.point_count == 1 {
            warn!(%pos, "refusing to erase the last point");
            return false;
        }

        let mut covering: Vec<FixtureId> = point.part().into_iter().collect();
        covering.extend(
            self.fixtures()
                .filter(|f| f.space().any(|s| s == pos))
                .map(|f| f.id),
        );
        for id in covering {
            self.remove(id);
        }

        self.erase_connections_to(pos);
        self.erase_connections_intersecting(pos);

        self.grid.take(pos);
        self.point_count -= 1;
        debug!(%pos, "erased point");
        true
    }

    fn erase_connections_to(&mut self, pos: Vec2i) {
        for dir in Direction::iter_all() {
            if let Some(neighbor) = self.point_mut(pos + dir.unit_vector()) {
                neighbor.clear_direction(dir.inverted());
            }
        }
    }

    /// Clears diagonal links between cardinal neighbors that pass the
    /// corner of `pos`.
    fn erase_connections_intersecting(&mut self, pos: Vec2i) {
        for cardinal in Direction::iter_cardinal() {
            let from = pos + cardinal.unit_vector();
            let back = cardinal.inverted();
            for dir in [back.rotated(1), back.rotated(-1)] {
                self.unetch(from, dir);
            }
        }
    }

    /// Etches `dir` from `pos` and its mirror on the neighbor. Both cells
    /// need a point.
    pub fn etch(&mut self, pos: Vec2i, dir: Direction) -> bool {
        let to = pos + dir.unit_vector();
        if self.point(pos).is_none() || self.point(to).is_none() {
            return false;
        }
        for (at, d) in [(pos, dir), (to, dir.inverted())] {
            if let Some(point) = self.point_mut(at) {
                point.etch_direction(d);
            }
        }
        true
    }

    /// Clears `dir` from `pos` and its mirror on the neighbor.
    pub fn unetch(&mut self, pos: Vec2i, dir: Direction) {
        for (at, d) in [(pos, dir), (pos + dir.unit_vector(), dir.inverted())] {
            if let Some(point) = self.point_mut(at) {
                point.clear_direction(d);
            }
        }
    }

    /// Unions every path entry into the board point at its position.
    pub fn etch_path(&mut self, path: &Path) {
        for (pos, point) in path.iter() {
            let target = unwrap_option_or_continue!(self.point_mut(pos));
            target.flatten(point);
        }
        debug!(points = path.len(), "etched path");
    }

    /// Removes every path entry's directions from the board.
    pub fn erase_path(&mut self, path: &Path) {
        for (pos, point) in path.iter() {
            let target = unwrap_option_or_continue!(self.point_mut(pos));
            target.erase_paths(point);
        }
        debug!(points = path.len(), "erased path");
    }

    pub fn set_locked(&mut self, pos: Vec2i, locked: bool) -> bool {
        match self.point_mut(pos) {
            Some(point) => {
                point.locked = locked;
                true
            }
            None => false,
        }
    }

    /// Prepends `dx` empty columns and `dy` empty rows.
    pub fn shift(&mut self, dx: u32, dy: u32) {
        if dx == 0 && dy == 0 {
            return;
        }
        self.grid.prepend(dx as usize, dy as usize);
        if self.point_count > 0 {
            self.width += dx;
        }
        self.translate(Vec2i::new(dx as i32, dy as i32));
        debug!(dx, dy, "shifted board");
    }

    fn translate(&mut self, delta: Vec2i) {
        for fixture in self.fixtures.iter_mut() {
            fixture.pos += delta;
        }
        self.air = self.air.drain().map(|(p, id)| (p + delta, id)).collect();
    }

    /// Trims empty rows and columns from all four sides.
    pub fn pack(&mut self) -> PackReport {
        let mut bounds: Option<(Vec2i, Vec2i)> = None;
        for (pos, _) in self.grid.iter() {
            bounds = Some(match bounds {
                None => (pos, pos),
                Some((min, max)) => (
                    min.combine_with(pos, i32::min),
                    max.combine_with(pos, i32::max),
                ),
            });
        }
        let (min, max) = unwrap_option_or_return!(bounds, PackReport::default());

        let report = PackReport {
            top: min.y() as u32,
            bottom: self.height() - 1 - max.y() as u32,
            left: min.x() as u32,
            right: self.width - 1 - max.x() as u32,
        };
        if report.is_empty() {
            return report;
        }

        self.grid.truncate_rows(max.y() as usize + 1);
        self.grid.remove_rows_front(report.top as usize);
        self.grid.truncate_columns(max.x() as usize + 1);
        self.grid.remove_columns_front(report.left as usize);
        self.width = (max.x() - min.x() + 1) as u32;
        self.translate(-min);

        debug!(?report, "packed board");
        report
    }

    /// Whether a part in `configuration` can be placed with its origin at
    /// `pos`. No network may end up with more than one output, counting the
    /// part's own output pins.
    pub fn fits(&self, pos: Vec2i, configuration: &Configuration) -> bool {
        if !self.fits_footprint(pos, configuration) {
            return false;
        }

        let mut networks: Vec<(Path, usize)> = vec![];
        for pin in configuration.outputs() {
            let at = pos + pin.offset();
            if !self.point(at).is_some_and(Point::has_paths) {
                continue;
            }
            match networks.iter_mut().find(|(n, _)| n.contains_position(at)) {
                Some((_, outputs)) => *outputs += 1,
                None => {
                    let network = Path::from_board(self, at);
                    let outputs = network.count_outputs() + 1;
                    networks.push((network, outputs));
                }
            }
        }
        networks.iter().all(|(_, outputs)| *outputs <= 1)
    }

    /// The cell checks of [`Pcb::fits`] alone.
    pub fn fits_footprint(&self, pos: Vec2i, configuration: &Configuration) -> bool {
        let footprint = &configuration.footprint;

        let points_free = footprint
            .points
            .iter()
            .all(|p| self.point(pos + *p).is_some_and(|p| p.part().is_none()));
        let space_present = footprint.space.iter().all(|s| self.point(pos + *s).is_some());
        let air_clear = footprint
            .air
            .iter()
            .all(|a| self.point(pos + *a).is_none() && !self.is_air(pos + *a));
        points_free && space_present && air_clear
    }

    /// Places `part` at `pos` without checking [`Pcb::fits`].
    pub fn place(&mut self, part: Part, pos: Vec2i) -> FixtureId {
        let id = self.fixtures.first_free_pos();
        let fixture = Fixture { id, part, pos };

        for cell in fixture.points() {
            if let Some(point) = self.grid.get_mut(cell) {
                point.part = Some(id);
            }
        }
        for (cell, pin) in fixture.pins() {
            if let Some(point) = self.grid.get_mut(cell) {
                point.connect(pin.kind);
            }
        }
        for cell in fixture.air() {
            self.air.insert(cell, id);
        }

        debug!(part = fixture.part.name(), %pos, id, "placed part");
        self.fixtures.set(fixture, id);
        id
    }

    pub fn remove(&mut self, id: FixtureId) -> Option<Fixture> {
        let fixture = self.fixtures.remove(id)?;

        for cell in fixture.points() {
            if let Some(point) = self.grid.get_mut(cell) {
                if point.part == Some(id) {
                    point.part = None;
                }
            }
        }
        for (cell, _) in fixture.pins() {
            if let Some(point) = self.grid.get_mut(cell) {
                point.disconnect();
            }
        }
        self.air.retain(|_, claim| *claim != id);

        debug!(part = fixture.part.name(), id, "removed part");
        Some(fixture)
    }

    /// First link whose mirror is missing, if any.
    pub fn find_asymmetry(&self) -> Option<(Vec2i, Direction)> {
        self.points().find_map(|(pos, point)| {
            point.connected(None).find(|dir| {
                !self
                    .point(pos + dir.unit_vector())
                    .is_some_and(|n| n.has_direction(dir.inverted()))
            })
            .map(|dir| (pos, dir))
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::parts::test::test_library;

    pub(crate) fn strip(len: i32) -> Pcb {
        Pcb::with_size(len as u32, 1)
    }

    #[test]
    fn initialize_builds_rectangle() {
        let board = Pcb::with_size(3, 2);
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
        assert_eq!(board.point_count(), 6);
        assert!(board.point(Vec2i::new(2, 1)).is_some());
        assert!(board.point(Vec2i::new(3, 1)).is_none());
        assert!(board.point(Vec2i::new(-1, 0)).is_none());
    }

    #[test]
    fn extend_rejects_negative_and_keeps_existing() {
        let mut board = strip(2);
        board.etch(Vec2i::new(0, 0), Direction::East);

        assert!(board.extend(Vec2i::new(-1, 0)).is_none());
        let existing = board.extend(Vec2i::new(0, 0)).unwrap();
        assert!(existing.has_direction(Direction::East));
        assert_eq!(board.point_count(), 2);

        board.extend(Vec2i::new(4, 2));
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 3);
        assert_eq!(board.point_count(), 3);
    }

    #[test]
    fn extend_all_shifts_negative_cells() {
        let mut board = Pcb::with_size(1, 1);
        let library = test_library();
        board.place(library.part("sink", 0).unwrap(), Vec2i::new(0, 0));

        let shift = board.extend_all([Vec2i::new(-1, 0)]);
        assert_eq!(shift, Vec2i::new(1, 0));
        assert_eq!(board.width(), 2);
        assert!(board.point(Vec2i::new(1, 0)).unwrap().part().is_some());
        assert!(board.point(Vec2i::new(0, 0)).unwrap().part().is_none());
        assert_eq!(board.fixtures().next().unwrap().pos, Vec2i::new(1, 0));
    }

    #[test]
    fn erase_clears_links_into_and_across_the_hole() {
        let mut board = Pcb::with_size(3, 3);
        let center = Vec2i::new(1, 1);
        for dir in Direction::iter_all() {
            board.etch(center, dir);
        }
        // North to east neighbor passes the corner of the center cell.
        board.etch(Vec2i::new(1, 0), Direction::SouthEast);
        board.etch(Vec2i::new(0, 0), Direction::East);

        assert!(board.erase(center));
        assert!(board.point(center).is_none());
        assert_eq!(board.point_count(), 8);
        assert!(!board.point(Vec2i::new(1, 0)).unwrap().has_direction(Direction::SouthEast));
        assert!(!board.point(Vec2i::new(2, 1)).unwrap().has_direction(Direction::NorthWest));
        assert!(board.point(Vec2i::new(0, 0)).unwrap().has_direction(Direction::East));
        assert!(board.points().all(|(p, point)| p.y() == 0 || !point.has_paths()));
        assert_eq!(board.find_asymmetry(), None);
    }

    #[test]
    fn erase_refuses_last_point() {
        let mut board = Pcb::with_size(1, 1);
        assert!(!board.erase(Vec2i::new(0, 0)));
        assert!(!board.erase(Vec2i::new(5, 5)));
        assert_eq!(board.point_count(), 1);
    }

    #[test]
    fn pack_trims_all_sides_once() {
        let mut board = Pcb::new();
        board.extend(Vec2i::new(2, 1));
        board.extend(Vec2i::new(3, 1));
        board.extend(Vec2i::new(2, 2));
        board.shift(0, 1);
        board.extend(Vec2i::new(6, 5));
        board.erase(Vec2i::new(6, 5));

        let report = board.pack();
        assert_eq!(
            report,
            PackReport {
                top: 2,
                bottom: 2,
                left: 2,
                right: 3
            }
        );
        assert_eq!((board.width(), board.height()), (2, 2));
        assert!(board.point(Vec2i::new(0, 0)).is_some());
        assert!(board.point(Vec2i::new(0, 1)).is_some());
        assert!(board.point(Vec2i::new(1, 1)).is_none());
        assert!(board.pack().is_empty());
    }

    #[test]
    fn pack_on_empty_board_is_a_no_op() {
        let mut board = Pcb::new();
        assert!(board.pack().is_empty());
    }

    #[test]
    fn place_and_remove_are_inverse() {
        let library = test_library();
        let mut board = Pcb::with_size(3, 2);
        let sensor = library.part("sensor", 0).unwrap();
        assert!(!board.fits(Vec2i::new(0, 0), sensor.configuration()));

        board.erase(Vec2i::new(0, 0));
        assert!(board.fits(Vec2i::new(0, 0), sensor.configuration()));
        let id = board.place(sensor, Vec2i::new(0, 0));

        assert!(board.is_air(Vec2i::new(0, 0)));
        assert!(!board.is_extendable(Vec2i::new(0, 0)));
        assert_eq!(board.fixture_at(Vec2i::new(1, 1)).map(|f| f.id), Some(id));
        assert_eq!(board.point(Vec2i::new(0, 1)).unwrap().pin(), Some(crate::PinKind::Structural));

        let fixture = board.remove(id).unwrap();
        assert_eq!(fixture.part.name(), "sensor");
        assert!(board.is_extendable(Vec2i::new(0, 0)));
        assert!(board.point(Vec2i::new(0, 1)).unwrap().pin().is_none());
        assert!(board.point(Vec2i::new(0, 1)).unwrap().part().is_none());
        assert!(board.remove(id).is_none());
    }

    #[test]
    fn fits_rejects_occupied_and_missing_cells() {
        let library = test_library();
        let mut board = strip(2);
        let resistor = library.part("resistor", 0).unwrap();
        assert!(board.fits(Vec2i::new(0, 0), resistor.configuration()));
        assert!(!board.fits(Vec2i::new(1, 0), resistor.configuration()));

        board.place(library.part("sink", 0).unwrap(), Vec2i::new(1, 0));
        assert!(!board.fits(Vec2i::new(0, 0), resistor.configuration()));
    }

    #[test]
    fn fits_rejects_second_output_on_a_network() {
        let library = test_library();
        let mut board = strip(3);
        board.etch(Vec2i::new(0, 0), Direction::East);
        board.etch(Vec2i::new(1, 0), Direction::East);
        let source = library.part("source", 0).unwrap();

        assert!(board.fits(Vec2i::new(2, 0), source.configuration()));
        board.place(source.clone(), Vec2i::new(0, 0));
        assert!(!board.fits(Vec2i::new(2, 0), source.configuration()));
        assert!(board
            .fits(Vec2i::new(2, 0), library.part("sink", 0).unwrap().configuration()));
    }

    #[test]
    fn fits_counts_every_output_pin_of_the_part() {
        let library = test_library();
        let splitter = library.part("splitter", 0).unwrap();
        let mut board = strip(3);
        assert!(board.fits(Vec2i::new(0, 0), splitter.configuration()));

        // One pin on the wire, the other on a bare cell.
        board.etch(Vec2i::new(1, 0), Direction::East);
        assert!(board.fits(Vec2i::new(0, 0), splitter.configuration()));
        // Both pins on the same wire.
        assert!(!board.fits(Vec2i::new(1, 0), splitter.configuration()));

        board.etch(Vec2i::new(0, 0), Direction::East);
        assert!(!board.fits(Vec2i::new(0, 0), splitter.configuration()));
    }

    #[test]
    fn erase_removes_parts_through_space_cells() {
        let library = test_library();
        let mut board = Pcb::with_size(2, 2);
        board.erase(Vec2i::new(0, 0));
        let id = board.place(library.part("sensor", 0).unwrap(), Vec2i::new(0, 0));

        assert!(board.erase(Vec2i::new(1, 1)));
        assert!(board.fixture(id).is_none());
        assert!(!board.is_air(Vec2i::new(0, 0)));
        assert!(board.point(Vec2i::new(0, 1)).unwrap().pin().is_none());
    }

    #[test]
    fn clone_is_isolated() {
        let mut board = strip(2);
        let copy = board.clone();
        board.etch(Vec2i::new(0, 0), Direction::East);
        assert!(!copy.point(Vec2i::new(0, 0)).unwrap().has_paths());
    }
}
