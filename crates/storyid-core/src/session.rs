//! Document session: the explicit context that owns all overlay state.
//!
//! Earlier designs of this kind of subsystem tend to grow ambient "current
//! project" globals. Here the session is an ordinary value passed to each
//! component: it owns the open files (buffer + anchors + line ending), knows
//! which one is active, and answers the project-wide questions — which
//! identifiers are in use, and what exactly should be written to disk.

use std::collections::{BTreeMap, HashSet};

use crate::anchors::AnchorSet;
use crate::buffer::MarkerBuffer;
use crate::extract::{self, Extraction};
use crate::line_ending::LineEnding;
use crate::tag::LineId;

/// One open script file.
struct FileSlot {
    buffer: MarkerBuffer,
    anchors: AnchorSet,
    line_ending: LineEnding,
}

/// A `{path, content}` pair ready to hand to the persistence layer.
///
/// The content is always the reconstructed full form (tags reinjected):
/// clean display text is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePayload {
    /// Destination path, as registered on open.
    pub path: String,
    /// Full content in the file's preferred line ending.
    pub content: String,
}

/// All overlay state for the currently open document set.
#[derive(Default)]
pub struct DocumentSession {
    files: BTreeMap<String, FileSlot>,
    active: Option<String>,
}

impl DocumentSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load raw file content: normalize line endings, extract tags, and bind
    /// one anchor per extracted id. The first opened file becomes active.
    ///
    /// Re-opening a name replaces its slot (anchors are rebuilt from the new
    /// content).
    pub fn open_file(&mut self, name: &str, raw: &str) {
        let line_ending = LineEnding::detect_in_text(raw);
        let normalized = LineEnding::normalize(raw);
        let Extraction { clean, ids_by_line } = extract::extract(&normalized);

        let mut buffer = MarkerBuffer::from_text(&clean);
        let mut anchors = AnchorSet::new();
        anchors.rebind(&mut buffer, &ids_by_line);

        self.files.insert(
            name.to_string(),
            FileSlot {
                buffer,
                anchors,
                line_ending,
            },
        );
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
    }

    /// Unload a file, discarding its anchors. Returns `false` if it was not
    /// open. If it was active, another open file (if any) becomes active.
    pub fn close_file(&mut self, name: &str) -> bool {
        if self.files.remove(name).is_none() {
            return false;
        }
        if self.active.as_deref() == Some(name) {
            self.active = self.files.keys().next().cloned();
        }
        true
    }

    /// Make `name` the active file. Returns `false` if it is not open.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.files.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    /// Name of the active file, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Names of every open file, in deterministic order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Whether `name` is open.
    pub fn is_open(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// The editable buffer of one file.
    pub fn buffer(&self, name: &str) -> Option<&MarkerBuffer> {
        self.files.get(name).map(|slot| &slot.buffer)
    }

    /// Mutable access to one file's buffer, for hosts applying user edits.
    pub fn buffer_mut(&mut self, name: &str) -> Option<&mut MarkerBuffer> {
        self.files.get_mut(name).map(|slot| &mut slot.buffer)
    }

    /// The anchor set of one file.
    pub fn anchors(&self, name: &str) -> Option<&AnchorSet> {
        self.files.get(name).map(|slot| &slot.anchors)
    }

    /// Bind `id` to `line` (0-based) in one file's buffer.
    pub fn bind(&mut self, name: &str, line: usize, id: LineId) -> bool {
        match self.files.get_mut(name) {
            Some(slot) => slot.anchors.bind(&mut slot.buffer, line, id),
            None => false,
        }
    }

    /// Drop every anchor of one file without unloading it (project switch).
    pub fn clear_anchors(&mut self, name: &str) -> bool {
        match self.files.get_mut(name) {
            Some(slot) => {
                slot.anchors.clear(&mut slot.buffer);
                true
            }
            None => false,
        }
    }

    /// The Existing-Id Set: every identifier in use across the open document
    /// set, including ids whose host line has been deleted this session.
    pub fn known_ids(&self) -> HashSet<LineId> {
        self.files
            .values()
            .flat_map(|slot| slot.anchors.ids().cloned())
            .collect()
    }

    /// Clean (tag-free) text of one file, as shown in the editor.
    pub fn clean_text(&self, name: &str) -> Option<String> {
        self.files.get(name).map(|slot| slot.buffer.text())
    }

    /// Full text of one file with tags reinjected at the anchors' current
    /// lines. This is what the compiler sees; LF newlines.
    pub fn full_text(&self, name: &str) -> Option<String> {
        let slot = self.files.get(name)?;
        let associations = slot.anchors.associations(&slot.buffer);
        Some(extract::reconstruct(&slot.buffer.text(), &associations))
    }

    /// Build the save payload for one file: full text in its preferred line
    /// ending. Uses the anchors as they exist right now; saving never waits
    /// for an in-flight tagging run.
    pub fn save_payload(&self, name: &str) -> Option<SavePayload> {
        let slot = self.files.get(name)?;
        let full = self.full_text(name)?;
        Some(SavePayload {
            path: name.to_string(),
            content: slot.line_ending.apply_to_text(&full),
        })
    }

    /// Save payloads for every open file ("save all").
    pub fn export_all(&self) -> Vec<SavePayload> {
        self.files
            .keys()
            .filter_map(|name| self.save_payload(name))
            .collect()
    }
}
