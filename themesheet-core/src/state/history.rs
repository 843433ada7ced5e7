//! Bounded undo/redo history.

use std::collections::VecDeque;

/// Linear history of checkpoints around a present state.
///
/// Committing a state equal to the present is ignored, so repeated identical
/// actions never create empty undo steps. At most `depth` past states are kept;
/// the oldest is dropped first.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: Vec<T>,
    depth: usize,
}

impl<T: Clone + PartialEq> History<T> {
    /// Start a history at `initial`.
    pub fn new(initial: T, depth: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(depth.min(64)),
            present: initial,
            future: Vec::new(),
            depth,
        }
    }

    /// The current state.
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Make `state` the present. Returns `false` when it equals the present.
    pub fn commit(&mut self, state: T) -> bool {
        if state == self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, state);
        if self.depth > 0 {
            if self.past.len() >= self.depth {
                self.past.pop_front();
            }
            self.past.push_back(previous);
        }
        self.future.clear();
        true
    }

    /// Step back. Returns the new present.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    /// Step forward. Returns the new present.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Some(&self.present)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    /// Drop all checkpoints and start over at `state`.
    pub fn reset(&mut self, state: T) {
        self.past.clear();
        self.future.clear();
        self.present = state;
    }
}
