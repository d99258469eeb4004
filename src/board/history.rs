//! Whole-board undo and redo.

use std::collections::VecDeque;

use crate::board::Pcb;

/// Bounded undo and redo stacks of board snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Pcb>,
    redo: Vec<Pcb>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: vec![],
            capacity: capacity.max(1),
        }
    }

    /// Records the board as it was before a change. Clears the redo stack
    /// and drops the oldest snapshot beyond capacity.
    pub fn push(&mut self, snapshot: Pcb) {
        self.redo.clear();
        self.undo.push_back(snapshot);
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    /// Swaps `current` for the previous snapshot.
    pub fn undo(&mut self, current: &Pcb) -> Option<Pcb> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &Pcb) -> Option<Pcb> {
        let next = self.redo.pop()?;
        self.undo.push_back(current.clone());
        if self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty()
    }
}
