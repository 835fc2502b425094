//! Bounded snapshot history for undo/redo.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

/// A bounded stack of whole-state snapshots with an undo cursor.
///
/// The stack always holds at least one entry, the current state. Committing
/// while undone discards the redo tail; committing past the cap evicts the
/// oldest snapshot.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    stack: Vec<T>,
    cursor: usize,
    cap: usize,
}

impl<T: Clone> History<T> {
    /// Start a history at `initial`, retaining at most `cap` snapshots.
    #[must_use]
    pub fn new(initial: T, cap: usize) -> Self {
        Self {
            stack: vec![initial],
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// Record a new state after the cursor.
    pub fn commit(&mut self, value: T) {
        self.stack.truncate(self.cursor + 1);
        self.stack.push(value);
        if self.stack.len() > self.cap {
            self.stack.remove(0);
        }
        self.cursor = self.stack.len() - 1;
    }

    /// Step back one snapshot and return it, or `None` at the oldest.
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.stack[self.cursor].clone())
    }

    /// Step forward one snapshot and return it, or `None` at the newest.
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.stack[self.cursor].clone())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    /// The snapshot under the cursor, the last committed state.
    #[must_use]
    pub fn current(&self) -> T {
        self.stack[self.cursor].clone()
    }

    /// Drop everything and restart at `initial`.
    pub fn reset(&mut self, initial: T) {
        self.stack.clear();
        self.stack.push(initial);
        self.cursor = 0;
    }
}
