use std::collections::BTreeMap;

use crate::{board::Pcb, parts::Part};

/// Number of placed parts per part name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartSummary {
    counts: BTreeMap<String, usize>,
}

impl PartSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_board(board: &Pcb) -> Self {
        let mut summary = Self::new();
        for fixture in board.fixtures() {
            summary.register(&fixture.part);
        }
        summary
    }

    pub fn register(&mut self, part: &Part) {
        *self.counts.entry(part.name().to_owned()).or_default() += 1;
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn merge(&mut self, other: &PartSummary) {
        for (name, count) in other.counts.iter() {
            *self.counts.entry(name.clone()).or_default() += count;
        }
    }

    /// Part names with their counts, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(n, c)| (n.as_str(), *c))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{parts::test::test_library, vector::Vec2i};

    #[test]
    fn counts_placed_parts() {
        let library = test_library();
        let mut board = Pcb::with_size(4, 2);
        for x in 0..3 {
            let part = library.part("source", 0).unwrap();
            board.place(part, Vec2i::new(x, 0));
        }
        board.place(library.part("sink", 0).unwrap(), Vec2i::new(0, 1));

        let summary = PartSummary::from_board(&board);
        assert_eq!(summary.count("source"), 3);
        assert_eq!(summary.count("sink"), 1);
        assert_eq!(summary.count("sensor"), 0);
        assert_eq!(summary.total(), 4);

        let mut merged = summary.clone();
        merged.merge(&summary);
        assert_eq!(merged.iter().collect::<Vec<_>>(), vec![("sink", 2), ("source", 6)]);
    }
}
