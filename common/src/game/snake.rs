use std::collections::{HashSet, VecDeque};

use super::types::Cell;

/// Ordered body, head first. `occupied` mirrors `body` for O(1) lookups.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,
    occupied: HashSet<Cell>,
}

impl Snake {
    /// Returns `None` for an empty body or one that overlaps itself.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Option<Self> {
        let mut body = VecDeque::new();
        let mut occupied = HashSet::new();
        for cell in cells {
            if !occupied.insert(cell) {
                return None;
            }
            body.push_back(cell);
        }
        if body.is_empty() {
            return None;
        }
        Some(Self { body, occupied })
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.occupied.contains(&cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub(super) fn push_head(&mut self, cell: Cell) {
        self.body.push_front(cell);
        self.occupied.insert(cell);
    }

    /// Never shrinks below one cell.
    pub(super) fn pop_tail(&mut self) {
        if self.body.len() <= 1 {
            return;
        }
        if let Some(tail) = self.body.pop_back() {
            self.occupied.remove(&tail);
        }
    }
}
