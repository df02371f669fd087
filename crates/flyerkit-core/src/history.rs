//! Linear undo/redo history over scene snapshots.

use crate::background::Background;
use crate::scene::Scene;
use crate::shapes::SceneObject;

/// Default maximum number of snapshots kept.
pub const MAX_UNDO_HISTORY: usize = 50;

/// An immutable copy of the scene contents at one point in time.
///
/// Image objects keep their source reference but no decoded pixels.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub objects: Vec<SceneObject>,
    pub background: Background,
}

impl Snapshot {
    /// Capture the current objects and background of a scene.
    pub fn capture(scene: &Scene) -> Self {
        Self {
            objects: scene.iter().map(SceneObject::detached).collect(),
            background: scene.background.clone(),
        }
    }

    /// Field-by-field comparison, ignoring decoded image state.
    pub fn same_contents(&self, other: &Snapshot) -> bool {
        self.background == other.background
            && self.objects.len() == other.objects.len()
            && self
                .objects
                .iter()
                .zip(&other.objects)
                .all(|(a, b)| a.same_fields(b))
    }
}

/// Snapshot list plus a cursor at the snapshot matching the live scene.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` snapshots.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record a new snapshot, discarding any redo branch.
    pub fn record(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            self.entries.remove(0);
            self.cursor -= 1;
        }
        log::debug!("History: {} entries, cursor {}", self.entries.len(), self.cursor);
    }

    /// Step back. Returns the snapshot to restore, or None at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward. Returns the snapshot to restore, or None at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Drop all entries and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.cursor = 0;
        self.entries.push(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Snapshot matching the live scene.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }
}
