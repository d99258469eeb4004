use std::collections::{HashMap, HashSet, VecDeque};

use crate::{board::Pcb, point::Point, vector::Vec2i, Direction};

/// Ordered walk over board cells. Each entry carries its own [`Point`], so a
/// path can describe wiring that is not (yet) on the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    entries: Vec<(Vec2i, Point)>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every point reachable from `start` over etched links, in depth-first
    /// preorder. Entries are copies of the board's points.
    pub fn from_board(board: &Pcb, start: Vec2i) -> Path {
        let mut path = Path::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(pos) = stack.pop() {
            let point = unwrap_option_or_continue!(board.point(pos));
            if !visited.insert(pos) {
                continue;
            }
            path.entries.push((pos, point.clone()));

            for dir in point.connected(None).collect::<Vec<_>>().into_iter().rev() {
                let next = pos + dir.unit_vector();
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
        path
    }

    /// A route from `start` to `end` along existing links, listed from `end`
    /// back to `start`. Cells are taken from the back of a queue that is
    /// filled at the front. The result is invalid when no route exists.
    pub fn from_route(board: &Pcb, start: Vec2i, end: Vec2i) -> Path {
        if board.point(start).is_none() {
            return Path::new();
        }

        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::from([start]);
        let mut from: HashMap<Vec2i, Vec2i> = HashMap::new();

        while let Some(pos) = queue.pop_back() {
            if pos == end {
                let mut path = Path::new();
                let mut at = end;
                path.push(at, Point::new(), true);
                while at != start {
                    at = *unwrap_option_or_break!(from.get(&at));
                    path.push(at, Point::new(), true);
                }
                return path;
            }

            let point = unwrap_option_or_continue!(board.point(pos));
            for dir in point.connected(None) {
                let next = pos + dir.unit_vector();
                if board.point(next).is_some() && visited.insert(next) {
                    from.insert(next, pos);
                    queue.push_front(next);
                }
            }
        }
        Path::new()
    }

    /// Straight or diagonal line of fresh, connected points from `start`
    /// towards `end`. `None` when a cell on the way is missing, when a
    /// diagonal step cuts a missing corner, or when the line is a single
    /// cell.
    pub fn from_line(board: &Pcb, start: Vec2i, end: Vec2i) -> Option<Path> {
        board.point(start)?;

        let mut path = Path::new();
        let mut at = start;
        path.push(at, Point::new(), false);

        while at != end {
            let step = (end - at).signum();
            at += step;

            board.point(at)?;
            if step.x() != 0 && step.y() != 0 {
                board.point(Vec2i::new(at.x() - step.x(), at.y()))?;
                board.point(Vec2i::new(at.x(), at.y() - step.y()))?;
            }
            path.push(at, Point::new(), true);
        }

        path.is_valid().then_some(path)
    }

    /// Appends an entry. With `connect`, the link to the previous entry is
    /// etched into both entries' points.
    pub fn push(&mut self, pos: Vec2i, mut point: Point, connect: bool) {
        if connect {
            if let Some((prev_pos, prev)) = self.entries.last_mut() {
                if let Some(dir) = Direction::from_vector(pos - *prev_pos) {
                    prev.etch_direction(dir);
                    point.etch_direction(dir.inverted());
                }
            }
        }
        self.entries.push((pos, point));
    }

    pub fn is_valid(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn start(&self) -> Option<Vec2i> {
        self.entries.first().map(|e| e.0)
    }

    pub fn end(&self) -> Option<Vec2i> {
        self.entries.last().map(|e| e.0)
    }

    pub fn count_outputs(&self) -> usize {
        self.entries.iter().filter(|(_, p)| p.is_output()).count()
    }

    pub fn contains_position(&self, pos: Vec2i) -> bool {
        self.entries.iter().any(|(p, _)| *p == pos)
    }

    /// Keeps the first `len` entries and clears the link from the new last
    /// entry to the dropped one.
    pub fn trim(&mut self, len: usize) {
        let Some(&(next, _)) = self.entries.get(len) else {
            return;
        };
        self.entries.truncate(len);
        if let Some((pos, point)) = self.entries.last_mut() {
            if let Some(dir) = Direction::from_vector(next - *pos) {
                point.clear_direction(dir);
            }
        }
    }

    /// Unit vector from `from` towards a neighbor that is not on the path,
    /// checking up, down, right and left in that order. Up if all are taken.
    pub fn outward_vector(&self, from: Vec2i) -> Vec2i {
        [Direction::North, Direction::South, Direction::East, Direction::West]
            .into_iter()
            .map(Direction::unit_vector)
            .find(|v| !self.contains_position(from + *v))
            .unwrap_or(Direction::North.unit_vector())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vec2i, &Point)> {
        self.entries.iter().map(|(pos, point)| (*pos, point))
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2i> + '_ {
        self.entries.iter().map(|e| e.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::test::strip;

    fn positions(path: &Path) -> Vec<(i32, i32)> {
        path.positions().map(|p| (p.x(), p.y())).collect()
    }

    /// ```text
    /// 0-1-2
    ///   |
    ///   3
    /// ```
    fn tee() -> Pcb {
        let mut board = Pcb::with_size(3, 2);
        board.etch(Vec2i::new(0, 0), Direction::East);
        board.etch(Vec2i::new(1, 0), Direction::East);
        board.etch(Vec2i::new(1, 0), Direction::South);
        board
    }

    #[test]
    fn flood_fill_is_depth_first_preorder() {
        let board = tee();
        let path = Path::from_board(&board, Vec2i::new(0, 0));
        assert_eq!(positions(&path), vec![(0, 0), (1, 0), (2, 0), (1, 1)]);

        let bare = Path::from_board(&board, Vec2i::new(0, 1));
        assert_eq!(positions(&bare), vec![(0, 1)]);
        assert!(Path::from_board(&board, Vec2i::new(5, 5)).is_empty());
    }

    #[test]
    fn flood_fill_copies_points() {
        let board = tee();
        let path = Path::from_board(&board, Vec2i::new(1, 1));
        let (_, center) = path.iter().find(|(p, _)| *p == Vec2i::new(1, 0)).unwrap();
        assert_eq!(center.directions.len(), 3);
    }

    #[test]
    fn route_runs_from_end_to_start() {
        let board = tee();
        let path = Path::from_route(&board, Vec2i::new(0, 0), Vec2i::new(1, 1));
        assert_eq!(positions(&path), vec![(1, 1), (1, 0), (0, 0)]);

        let (_, middle) = path.iter().nth(1).unwrap();
        assert!(middle.has_direction(Direction::South));
        assert!(middle.has_direction(Direction::West));
        assert!(!middle.has_direction(Direction::East));
    }

    /// ```text
    /// 0-1-2
    /// | | |
    /// 3-4-5
    /// ```
    fn ladder() -> Pcb {
        let mut board = Pcb::with_size(3, 2);
        for (x, y, dir) in [
            (0, 0, Direction::East),
            (1, 0, Direction::East),
            (0, 1, Direction::East),
            (1, 1, Direction::East),
            (0, 0, Direction::South),
            (1, 0, Direction::South),
            (2, 0, Direction::South),
        ] {
            board.etch(Vec2i::new(x, y), dir);
        }
        board
    }

    #[test]
    fn route_choice_follows_queue_order() {
        let board = ladder();
        let path = Path::from_route(&board, Vec2i::new(0, 0), Vec2i::new(2, 1));
        assert_eq!(positions(&path), vec![(2, 1), (2, 0), (1, 0), (0, 0)]);

        let path = Path::from_route(&board, Vec2i::new(0, 0), Vec2i::new(1, 1));
        assert_eq!(positions(&path), vec![(1, 1), (1, 0), (0, 0)]);

        let path = Path::from_route(&board, Vec2i::new(2, 1), Vec2i::new(0, 1));
        assert_eq!(positions(&path), vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn route_needs_existing_links() {
        let board = tee();
        assert!(!Path::from_route(&board, Vec2i::new(0, 0), Vec2i::new(0, 1)).is_valid());
        assert!(!Path::from_route(&board, Vec2i::new(0, 0), Vec2i::new(0, 0)).is_valid());
        assert!(Path::from_route(&board, Vec2i::new(9, 0), Vec2i::new(0, 0)).is_empty());
    }

    #[test]
    fn line_steps_diagonally_first() {
        let board = Pcb::with_size(4, 3);
        let path = Path::from_line(&board, Vec2i::new(0, 0), Vec2i::new(3, 1)).unwrap();
        assert_eq!(positions(&path), vec![(0, 0), (1, 1), (2, 1), (3, 1)]);

        let (_, start) = path.iter().next().unwrap();
        assert_eq!(start.directions.iter().collect::<Vec<_>>(), vec![Direction::SouthEast]);
        assert!(Path::from_line(&board, Vec2i::new(1, 1), Vec2i::new(1, 1)).is_none());
    }

    #[test]
    fn line_rejects_gaps_and_cut_corners() {
        let mut board = Pcb::with_size(3, 3);
        board.erase(Vec2i::new(1, 0));
        assert!(Path::from_line(&board, Vec2i::new(0, 0), Vec2i::new(2, 0)).is_none());
        assert!(Path::from_line(&board, Vec2i::new(0, 1), Vec2i::new(1, 0)).is_none());
        assert!(Path::from_line(&board, Vec2i::new(0, 0), Vec2i::new(1, 1)).is_none());
        assert!(Path::from_line(&board, Vec2i::new(0, 1), Vec2i::new(2, 2)).is_some());
    }

    #[test]
    fn trim_clears_dangling_link() {
        let board = strip(4);
        let mut path = Path::from_line(&board, Vec2i::new(0, 0), Vec2i::new(3, 0)).unwrap();
        path.trim(2);
        assert_eq!(path.len(), 2);
        let (_, last) = path.iter().last().unwrap();
        assert_eq!(last.directions.iter().collect::<Vec<_>>(), vec![Direction::West]);

        path.trim(5);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn outward_vector_order() {
        let mut line = Path::new();
        line.push(Vec2i::new(0, 0), Point::new(), false);
        line.push(Vec2i::new(0, 1), Point::new(), true);
        line.push(Vec2i::new(0, 2), Point::new(), true);
        assert_eq!(line.outward_vector(Vec2i::new(0, 0)), Vec2i::new(0, -1));
        assert_eq!(line.outward_vector(Vec2i::new(0, 1)), Vec2i::new(1, 0));
        assert_eq!(line.outward_vector(Vec2i::new(0, 2)), Vec2i::new(0, 1));

        line.push(Vec2i::new(1, 1), Point::new(), false);
        assert_eq!(line.outward_vector(Vec2i::new(0, 1)), Vec2i::new(-1, 0));
        line.push(Vec2i::new(-1, 1), Point::new(), false);
        assert_eq!(line.outward_vector(Vec2i::new(0, 1)), Vec2i::new(0, -1));
    }
}
