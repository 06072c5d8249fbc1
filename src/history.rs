//! Linear undo/redo history over full shape-set snapshots.
//!
//! Every committed mutation (add, move, erase, clear) pushes a complete
//! [`Frame`] snapshot. Undo and redo only move the cursor; a commit after an
//! undo discards the snapshots beyond the cursor.

use crate::draw::Frame;

/// Default cap on stored snapshots.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 200;

/// Snapshot history with a cursor.
///
/// Invariant: `snapshots` is never empty and `index < snapshots.len()`.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Frame>,
    index: usize,
    /// Maximum number of snapshots kept (0 = unbounded)
    max_snapshots: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SNAPSHOTS)
    }
}

impl History {
    /// Creates a history holding a single empty snapshot.
    pub fn new(max_snapshots: usize) -> Self {
        Self::with_initial(Frame::new(), max_snapshots)
    }

    /// Creates a history whose only snapshot is `initial`.
    pub fn with_initial(initial: Frame, max_snapshots: usize) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            max_snapshots,
        }
    }

    /// Drops all snapshots and starts over from `initial`.
    pub fn reset(&mut self, initial: Frame) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.index = 0;
        log::debug!("History reset");
    }

    pub fn set_max_snapshots(&mut self, max_snapshots: usize) {
        self.max_snapshots = max_snapshots;
        self.enforce_cap();
    }

    /// Records a new snapshot after the cursor, discarding any redo branch.
    pub fn commit(&mut self, frame: Frame) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(frame);
        self.index = self.snapshots.len() - 1;
        self.enforce_cap();
        log::debug!(
            "History commit: {} snapshot(s), index {}",
            self.snapshots.len(),
            self.index
        );
    }

    fn enforce_cap(&mut self) {
        if self.max_snapshots == 0 || self.snapshots.len() <= self.max_snapshots {
            return;
        }
        let excess = self.snapshots.len() - self.max_snapshots;
        self.snapshots.drain(..excess);
        self.index = self.index.saturating_sub(excess);
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Steps back one snapshot and returns it, or `None` at the oldest one.
    pub fn undo(&mut self) -> Option<&Frame> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Steps forward one snapshot and returns it, or `None` at the newest one.
    pub fn redo(&mut self) -> Option<&Frame> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&Frame> {
        self.snapshots.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Shape, ShapeKind, Style};
    use crate::geometry::Point;

    fn frame_with(ids: &[u64]) -> Frame {
        Frame::from_shapes(
            ids.iter()
                .map(|id| {
                    Shape::new(
                        *id,
                        Style::default(),
                        ShapeKind::Point {
                            x: *id as f64,
                            y: 0.0,
                            label: format!("p{id}"),
                        },
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn starts_with_single_empty_snapshot() {
        let history = History::default();
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&Frame::new()));
    }

    #[test]
    fn undo_then_redo_restores_the_same_snapshot() {
        let mut history = History::default();
        history.commit(frame_with(&[1]));
        history.commit(frame_with(&[1, 2]));

        assert_eq!(history.undo(), Some(&frame_with(&[1])));
        assert_eq!(history.redo(), Some(&frame_with(&[1, 2])));
        assert!(history.redo().is_none());
    }

    #[test]
    fn commit_after_undo_discards_redo_branch() {
        let mut history = History::default();
        history.commit(frame_with(&[1]));
        history.commit(frame_with(&[1, 2]));
        history.undo();

        history.commit(frame_with(&[1, 3]));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&frame_with(&[1, 3])));
    }

    #[test]
    fn undo_at_oldest_snapshot_is_a_no_op() {
        let mut history = History::default();
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn cap_drops_oldest_snapshots() {
        let mut history = History::new(3);
        for id in 1..=5 {
            history.commit(frame_with(&[id]));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.undo(), Some(&frame_with(&[4])));
        assert_eq!(history.undo(), Some(&frame_with(&[3])));
        assert!(history.undo().is_none());
    }

    #[test]
    fn reset_discards_everything() {
        let mut history = History::default();
        history.commit(frame_with(&[1]));
        history.reset(Frame::new());
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }
}
