use std::collections::VecDeque;

/// A stored state plus the label of the edit that replaced it.
#[derive(Clone, Debug, PartialEq)]
struct Entry<T> {
    label: String,
    state: T,
}

/// Bounded snapshot undo/redo.
///
/// Callers record the state *before* an edit; undo swaps it with the current one.
#[derive(Clone, Debug)]
pub struct History<T> {
    undo_stack: VecDeque<Entry<T>>,
    redo_stack: VecDeque<Entry<T>>,
    max_depth: usize,
}

impl<T> History<T> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn record(&mut self, label: impl Into<String>, before: T) {
        self.redo_stack.clear();
        self.undo_stack.push_back(Entry {
            label: label.into(),
            state: before,
        });
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Returns the state to restore and hands `current` to the redo stack.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push_back(Entry {
            label: entry.label,
            state: current,
        });
        Some(entry.state)
    }

    pub fn redo(&mut self, current: T) -> Option<T> {
        let entry = self.redo_stack.pop_back()?;
        self.undo_stack.push_back(Entry {
            label: entry.label,
            state: current,
        });
        Some(entry.state)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/history.rs"]
mod tests;
