//! Snapshot-based undo/redo history.
//!
//! Every committed change stores a full copy of the board together with
//! its group color table. Undo and redo move a cursor through that list
//! and hand back the snapshot to restore, so there is no per-mutation
//! inverse chain. Gestures (drag, resize, stroke, erase) are batched by
//! the engine and pushed once at gesture end.

use ib_core::group::GroupTable;
use ib_core::model::BoardState;

/// One undo step: the entities and the group colors they were drawn with.
///
/// Restoring one puts merged, cleared or deleted groups back in their
/// original colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub state: BoardState,
    pub groups: GroupTable,
}

impl Snapshot {
    pub fn new(state: BoardState, groups: GroupTable) -> Self {
        Self { state, groups }
    }
}

/// Bounded, linear snapshot history.
///
/// Never empty: it is created with a bootstrap snapshot, and the cursor
/// always indexes a stored snapshot.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    /// Maximum number of retained snapshots.
    limit: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(limit: usize, initial: Snapshot) -> Self {
        let limit = limit.max(1);
        let mut snapshots = Vec::with_capacity(limit);
        snapshots.push(initial);
        Self {
            snapshots,
            cursor: 0,
            limit,
        }
    }

    /// Replace everything with a single bootstrap snapshot.
    pub fn bootstrap(&mut self, initial: Snapshot) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
    }

    /// Record a committed state. Discards any redo entries past the
    /// cursor, then evicts the oldest entries beyond the limit.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        while self.snapshots.len() > self.limit {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back. Returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward. Returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    /// The snapshot the cursor points at.
    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
