use std::collections::HashSet;

use crate::{board::Pcb, vector::Vec2i, Direction};

/// Axis-aligned rectangle of cells spanned by two corners, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    min: Vec2i,
    max: Vec2i,
}

impl Region {
    pub fn new(a: Vec2i, b: Vec2i) -> Self {
        Self {
            min: a.combine_with(b, i32::min),
            max: a.combine_with(b, i32::max),
        }
    }

    pub fn min(&self) -> Vec2i {
        self.min
    }

    pub fn max(&self) -> Vec2i {
        self.max
    }

    pub fn contains(&self, pos: Vec2i) -> bool {
        (self.min.x()..=self.max.x()).contains(&pos.x())
            && (self.min.y()..=self.max.y()).contains(&pos.y())
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Vec2i> {
        let (min, max) = (self.min, self.max);
        (min.y()..=max.y()).flat_map(move |y| (min.x()..=max.x()).map(move |x| Vec2i::new(x, y)))
    }
}

/// Extends `deletion` so that the board stays in one piece.
///
/// The points left over are grouped into 4-connected islands. The largest
/// island survives, the first one in row-major order on ties, and every other
/// island joins the deletion. A deletion that would leave no point behind is
/// dropped entirely. The result is sorted row-major.
pub fn prevent_split(board: &Pcb, deletion: impl IntoIterator<Item = Vec2i>) -> Vec<Vec2i> {
    let mut deleted: HashSet<Vec2i> = deletion
        .into_iter()
        .filter(|pos| board.point(*pos).is_some())
        .collect();

    let mut remaining: HashSet<Vec2i> = board
        .points()
        .map(|(pos, _)| pos)
        .filter(|pos| !deleted.contains(pos))
        .collect();
    if remaining.is_empty() {
        return vec![];
    }

    let mut groups: Vec<Vec<Vec2i>> = vec![];
    let mut queue = vec![];

    for (start, _) in board.points() {
        if !remaining.contains(&start) {
            continue;
        }

        let mut group = vec![];
        queue.push(start);
        while let Some(pos) = queue.pop() {
            if !remaining.remove(&pos) {
                continue;
            }
            group.push(pos);

            for dir in Direction::iter_cardinal() {
                let next = pos + dir.unit_vector();
                if remaining.contains(&next) {
                    queue.push(next);
                }
            }
        }
        groups.push(group);
    }

    let mut biggest = 0;
    for (i, group) in groups.iter().enumerate() {
        if group.len() > groups[biggest].len() {
            biggest = i;
        }
    }

    for (i, group) in groups.into_iter().enumerate() {
        if i != biggest {
            deleted.extend(group);
        }
    }

    let mut deleted: Vec<Vec2i> = deleted.into_iter().collect();
    deleted.sort_by_key(|p| (p.y(), p.x()));
    deleted
}
