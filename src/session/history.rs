use std::collections::VecDeque;

use crate::session::state::CompositionState;

/// Most snapshots a history ever holds
pub const MAX_ENTRIES: usize = 20;

/// Bounded undo/redo stacks of composition snapshots
///
/// The top of `entries` always mirrors the state that is on screen once the
/// debounced capture has run. `undo` needs a previous entry below it.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<CompositionState>,
    redo: Vec<CompositionState>,
    capacity: usize,
}

impl History {
    /// `capacity` is clamped to `2..=MAX_ENTRIES`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(2, MAX_ENTRIES);
        Self {
            entries: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Record a snapshot of a fresh (non undo/redo) change
    ///
    /// Clears the redo list and evicts the oldest entries beyond capacity.
    pub fn capture(&mut self, snapshot: CompositionState) {
        self.entries.push_back(snapshot);
        self.redo.clear();
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Step back; returns the state to reapply
    pub fn undo(&mut self) -> Option<CompositionState> {
        if self.entries.len() < 2 {
            return None;
        }
        let top = self.entries.pop_back()?;
        self.redo.push(top);
        self.entries.back().cloned()
    }

    /// Step forward; returns the state to reapply
    pub fn redo(&mut self) -> Option<CompositionState> {
        let entry = self.redo.pop()?;
        self.entries.push_back(entry.clone());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Snapshots oldest first
    pub fn entries(&self) -> impl Iterator<Item = &CompositionState> {
        self.entries.iter()
    }
}
