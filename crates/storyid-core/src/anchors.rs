//! Anchor tracking: the identifier ↔ live-line association for one buffer.
//!
//! The buffer owns positions (see [`MarkerBuffer`]); this module owns only
//! which identifier is bound to which marker. Anchors are session-scoped:
//! created when tags are extracted on load or when the generator mints a new
//! identifier, and discarded when the buffer is unloaded.

use crate::buffer::{MarkerBuffer, MarkerId};
use crate::tag::LineId;

#[derive(Debug, Clone)]
struct AnchorEntry {
    id: LineId,
    marker: MarkerId,
}

/// The set of identifier anchors registered against one buffer.
#[derive(Debug, Clone, Default)]
pub struct AnchorSet {
    entries: Vec<AnchorEntry>,
}

impl AnchorSet {
    /// Create an empty anchor set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to `line` (0-based).
    ///
    /// An identifier already bound in this set is rebound: one anchor per
    /// identifier. Returns `false` when the line does not exist.
    pub fn bind(&mut self, buffer: &mut MarkerBuffer, line: usize, id: LineId) -> bool {
        let Some(marker) = buffer.create_line_marker(line) else {
            return false;
        };
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            let old = self.entries.remove(pos);
            buffer.remove_marker(old.marker);
        }
        self.entries.push(AnchorEntry { id, marker });
        true
    }

    /// Bulk rebind used on file load: clears all anchors, then binds one per
    /// extracted `(line, id)` pair.
    pub fn rebind(&mut self, buffer: &mut MarkerBuffer, ids_by_line: &[(usize, LineId)]) {
        self.clear(buffer);
        for (line, id) in ids_by_line {
            self.bind(buffer, *line, id.clone());
        }
    }

    /// The live `(line, id)` associations, sorted by current line.
    ///
    /// Identifiers whose marker has collapsed (their line was deleted) are
    /// omitted: they are no longer present in the buffer.
    pub fn associations(&self, buffer: &MarkerBuffer) -> Vec<(usize, LineId)> {
        let mut out: Vec<(usize, LineId)> = self
            .entries
            .iter()
            .filter_map(|e| buffer.marker_line(e.marker).map(|line| (line, e.id.clone())))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }

    /// Whether `id` is bound here, live or collapsed.
    pub fn contains(&self, id: &LineId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    /// Every bound identifier, collapsed entries included.
    ///
    /// Collapsed entries still reserve their identifier for the session:
    /// re-minting a deleted line's id would resurrect a stale localization
    /// key.
    pub fn ids(&self) -> impl Iterator<Item = &LineId> {
        self.entries.iter().map(|e| &e.id)
    }

    /// Drop every anchor and its marker.
    pub fn clear(&mut self, buffer: &mut MarkerBuffer) {
        for entry in self.entries.drain(..) {
            buffer.remove_marker(entry.marker);
        }
    }

    /// Number of bound identifiers, collapsed entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifiers are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
