use crate::vector::{Vec2i, Vec2u};

/// Slot storage with stable indices. Freed slots are reused lowest first and
/// trailing empty slots are dropped.
#[derive(Debug, Clone)]
pub struct FixedVec<T> {
    vec: Vec<Option<T>>,
    first_free: Option<usize>,
}

impl<T> Default for FixedVec<T> {
    fn default() -> Self {
        Self {
            vec: vec![],
            first_free: None,
        }
    }
}

impl<T> FixedVec<T> {
    pub fn get(&self, pos: usize) -> Option<&T> {
        self.vec.get(pos)?.as_ref()
    }

    pub fn remove(&mut self, pos: usize) -> Option<T> {
        let value = self.vec.get_mut(pos)?.take()?;
        self.first_free = Some(self.first_free.map_or(pos, |f| f.min(pos)));
        while self.vec.last().is_some_and(Option::is_none) {
            self.vec.pop();
        }
        Some(value)
    }

    /// Stores `value` at `index`, returning what was there before.
    pub fn set(&mut self, value: T, index: usize) -> Option<T> {
        if index > self.vec.len() {
            let gap = self.vec.len();
            self.first_free = Some(self.first_free.map_or(gap, |f| f.min(gap)));
        }
        if index >= self.vec.len() {
            self.vec.resize_with(index + 1, || None);
        }
        if self.first_free == Some(index) {
            self.first_free = (index + 1..self.vec.len()).find(|i| self.vec[*i].is_none());
        }
        self.vec[index].replace(value)
    }

    pub fn first_free_pos(&self) -> usize {
        self.first_free
            .map_or(self.vec.len(), |f| f.min(self.vec.len()))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.vec.iter().filter_map(Option::as_ref)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.vec.iter_mut().filter_map(Option::as_mut)
    }
}

/// Row-major grid of optional cells. Rows may differ in length, so every
/// lookup is bounds checked against its own row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaggedGrid<T> {
    rows: Vec<Vec<Option<T>>>,
}

impl<T> Default for RaggedGrid<T> {
    fn default() -> Self {
        Self { rows: vec![] }
    }
}

impl<T> RaggedGrid<T> {
    pub fn get(&self, pos: Vec2i) -> Option<&T> {
        let index = pos.to_index()?;
        self.rows
            .get(index.y() as usize)?
            .get(index.x() as usize)?
            .as_ref()
    }

    pub fn get_mut(&mut self, pos: Vec2i) -> Option<&mut T> {
        let index = pos.to_index()?;
        self.rows
            .get_mut(index.y() as usize)?
            .get_mut(index.x() as usize)?
            .as_mut()
    }

    /// Returns the cell at `pos`, filling it (and any rows or columns in
    /// between) first if needed.
    pub fn get_or_insert_with(&mut self, pos: Vec2u, creator: impl FnOnce() -> T) -> &mut T {
        let (x, y) = (pos.x() as usize, pos.y() as usize);
        if self.rows.len() <= y {
            self.rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize_with(x + 1, || None);
        }
        row[x].get_or_insert_with(creator)
    }

    pub fn take(&mut self, pos: Vec2i) -> Option<T> {
        let index = pos.to_index()?;
        self.rows
            .get_mut(index.y() as usize)?
            .get_mut(index.x() as usize)?
            .take()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Inserts `columns` empty cells at the start of every row and `rows`
    /// empty rows at the top.
    pub fn prepend(&mut self, columns: usize, rows: usize) {
        if columns > 0 {
            for row in self.rows.iter_mut() {
                row.splice(0..0, std::iter::repeat_with(|| None).take(columns));
            }
        }
        if rows > 0 {
            self.rows
                .splice(0..0, std::iter::repeat_with(Vec::new).take(rows));
        }
    }

    pub fn remove_rows_front(&mut self, count: usize) {
        self.rows.drain(..count.min(self.rows.len()));
    }

    pub fn truncate_rows(&mut self, len: usize) {
        self.rows.truncate(len);
    }

    pub fn remove_columns_front(&mut self, count: usize) {
        for row in self.rows.iter_mut() {
            row.drain(..count.min(row.len()));
        }
    }

    /// Drops trailing cells so that every row is at most `len` long and
    /// ends in an occupied cell.
    pub fn truncate_columns(&mut self, len: usize) {
        for row in self.rows.iter_mut() {
            row.truncate(len);
            while row.last().is_some_and(Option::is_none) {
                row.pop();
            }
        }
    }

    /// Occupied cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2i, &T)> {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                cell.as_ref().map(|c| (Vec2i::new(x as i32, y as i32), c))
            })
        })
    }
}
