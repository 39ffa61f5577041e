/// Bounded undo/redo stack of baseline snapshots.
///
/// The stack holds *pre-edit* copies of the baseline: each committed edit
/// pushes the state it replaced, so undo restores the state immediately
/// prior to that action. Undo/redo swap the live baseline with the stored
/// snapshot while moving the cursor, which keeps undo-then-redo a fixed
/// point. When the stack is full the oldest snapshot is silently evicted;
/// history beyond the capacity is unreachable by design, not an error.

use crate::imaging::ImageBuffer;

/// Default capacity, matching the viewer's edit limit.
pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: Vec<ImageBuffer>,
    /// Number of snapshots behind the cursor, i.e. how many undos are
    /// available. Entries at `cursor..` are the redo branch.
    cursor: usize,
    limit: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        EditHistory::new(DEFAULT_LIMIT)
    }
}

impl EditHistory {
    pub fn new(limit: usize) -> Self {
        EditHistory {
            snapshots: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }

    /// Record the pre-edit baseline. Call once per discrete edit, before
    /// the edit is applied.
    ///
    /// Any redo branch past the cursor is discarded (linear history). At
    /// capacity the oldest entry is evicted and the cursor stays put, so
    /// the push never fails.
    pub fn push(&mut self, snapshot: ImageBuffer) {
        self.snapshots.truncate(self.cursor);
        if self.snapshots.len() >= self.limit {
            self.snapshots.remove(0);
        } else {
            self.cursor += 1;
        }
        self.snapshots.push(snapshot);
    }

    /// Step back one edit, exchanging `current` with the stored snapshot.
    /// Returns false (leaving `current` untouched) at the boundary.
    pub fn undo(&mut self, current: &mut ImageBuffer) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        std::mem::swap(&mut self.snapshots[self.cursor], current);
        true
    }

    /// Step forward one edit, exchanging `current` with the stored
    /// snapshot. Returns false at the boundary.
    pub fn redo(&mut self, current: &mut ImageBuffer) -> bool {
        if self.cursor >= self.snapshots.len() {
            return false;
        }
        std::mem::swap(&mut self.snapshots[self.cursor], current);
        self.cursor += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    /// A tiny buffer whose width encodes its identity.
    fn marker(id: u32) -> ImageBuffer {
        ImageBuffer::new(DynamicImage::new_rgb8(id, 1))
    }

    fn id(buf: &ImageBuffer) -> u32 {
        buf.width()
    }

    #[test]
    fn test_undo_restores_pre_edit_state() {
        let mut history = EditHistory::new(DEFAULT_LIMIT);
        let mut current = marker(1);

        // Edit: push the pre-edit state, then replace current.
        history.push(current.clone());
        current = marker(2);

        assert!(history.undo(&mut current));
        assert_eq!(id(&current), 1);
    }

    #[test]
    fn test_undo_redo_fixed_point() {
        let mut history = EditHistory::new(DEFAULT_LIMIT);
        let mut current = marker(1);
        for next in 2..=4 {
            history.push(current.clone());
            current = marker(next);
        }

        assert!(history.undo(&mut current));
        assert_eq!(id(&current), 3);
        assert!(history.redo(&mut current));
        assert_eq!(id(&current), 4);

        // All the way back, then all the way forward.
        for expected in [3, 2, 1] {
            assert!(history.undo(&mut current));
            assert_eq!(id(&current), expected);
        }
        assert!(!history.undo(&mut current));
        assert_eq!(id(&current), 1);
        for expected in [2, 3, 4] {
            assert!(history.redo(&mut current));
            assert_eq!(id(&current), expected);
        }
        assert!(!history.redo(&mut current));
    }

    #[test]
    fn test_boundaries_are_silent_noops() {
        let mut history = EditHistory::new(DEFAULT_LIMIT);
        let mut current = marker(7);
        assert!(!history.undo(&mut current));
        assert!(!history.redo(&mut current));
        assert_eq!(id(&current), 7);
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        let mut history = EditHistory::new(DEFAULT_LIMIT);
        let mut current = marker(1);
        for next in [2, 3] {
            history.push(current.clone());
            current = marker(next);
        }
        assert!(history.undo(&mut current)); // back to 2
        assert!(history.can_redo());

        // A new edit from here discards the redo branch.
        history.push(current.clone());
        current = marker(10);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);

        assert!(history.undo(&mut current));
        assert_eq!(id(&current), 2);
        assert!(history.undo(&mut current));
        assert_eq!(id(&current), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let limit = 5;
        let mut history = EditHistory::new(limit);
        let mut current = marker(0);
        for next in 1..=(limit as u32 + 1) {
            history.push(current.clone());
            current = marker(next);
        }

        assert_eq!(history.len(), limit);
        // Walk all the way back: the oldest state (0) was evicted, so the
        // earliest reachable state is 1.
        let mut undone = 0;
        while history.undo(&mut current) {
            undone += 1;
        }
        assert_eq!(undone, limit);
        assert_eq!(id(&current), 1);
    }

    #[test]
    fn test_clear() {
        let mut history = EditHistory::new(DEFAULT_LIMIT);
        let mut current = marker(1);
        history.push(current.clone());
        current = marker(2);
        history.clear();
        assert!(history.is_empty());
        assert!(!history.undo(&mut current));
    }
}
