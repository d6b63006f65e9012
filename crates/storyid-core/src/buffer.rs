//! Rope-backed editable text with whole-line, edge-sticky markers.
//!
//! The overlay engine needs one capability from an editing surface: a live,
//! whole-line range that moves with edits, survives insertions and deletions
//! elsewhere, and collapses when its line is deleted. [`MarkerBuffer`] makes
//! that capability concrete so the engine can run headlessly; a host editor
//! with its own decoration primitive can mirror this behavior instead.
//!
//! All offsets are **character offsets** (Unicode scalar values) and all line
//! numbers are 0-based. A marker's range covers its line including the
//! trailing newline, so an empty line between paragraphs still has a
//! non-empty range to track.

use std::ops::Range;

use ropey::Rope;

/// Opaque handle to a live line marker in a [`MarkerBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

#[derive(Debug, Clone)]
struct LineMarker {
    id: MarkerId,
    /// Start char offset of the tracked line (inclusive).
    start: usize,
    /// End char offset (exclusive); covers the trailing newline when present.
    end: usize,
}

impl LineMarker {
    /// A collapsed marker means the hosting line was deleted.
    fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }
}

/// Editable text plus the live line markers registered against it.
pub struct MarkerBuffer {
    rope: Rope,
    markers: Vec<LineMarker>,
    next_marker: u64,
}

impl MarkerBuffer {
    /// Build a buffer from initial text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            markers: Vec::new(),
            next_marker: 0,
        }
    }

    /// Full buffer text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total line count (an empty buffer has one line, per rope semantics).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Text of one line, without its trailing newline.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Char offset of the start of a line.
    pub fn line_to_char(&self, line: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line_to_char(line))
    }

    /// Insert text at a char offset, rebasing every marker.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let pos = char_offset.min(self.rope.len_chars());
        self.rope.insert(pos, text);
        let len = text.chars().count();
        for marker in &mut self.markers {
            if marker.start >= pos {
                // Sticky start: typing at the line's first character shifts
                // the whole range instead of growing it leftward.
                marker.start += len;
                marker.end += len;
            } else if marker.end > pos {
                // Insertion strictly inside the line extends it. An insertion
                // exactly at `end` belongs to the next line and changes
                // nothing (sticky end).
                marker.end += len;
            }
        }
    }

    /// Delete a char range, rebasing every marker.
    ///
    /// A marker fully covered by the deletion collapses; its line is gone
    /// and [`MarkerBuffer::marker_line`] reports `None` from then on.
    pub fn remove(&mut self, range: Range<usize>) {
        let start = range.start.min(self.rope.len_chars());
        let end = range.end.min(self.rope.len_chars());
        if start >= end {
            return;
        }
        self.rope.remove(start..end);
        let delta = end - start;
        for marker in &mut self.markers {
            if marker.end <= start {
                // Before the deletion, unaffected.
            } else if marker.start >= end {
                marker.start -= delta;
                marker.end -= delta;
            } else if marker.start >= start && marker.end <= end {
                // Fully covered: collapse in place.
                marker.start = start;
                marker.end = start;
            } else if marker.start < start && marker.end > end {
                marker.end -= delta;
            } else if marker.start < start {
                // Tail deleted; the line merges with its successor but the
                // marker keeps tracking the surviving head.
                marker.end = start;
            } else {
                marker.start = start;
                marker.end -= delta;
            }
        }
    }

    /// Register a whole-line marker on `line`.
    ///
    /// Returns `None` when the line does not exist. A marker created on a
    /// trailing empty last line (no newline to cover) collapses immediately.
    pub fn create_line_marker(&mut self, line: usize) -> Option<MarkerId> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let start = self.rope.line_to_char(line);
        let end = if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1)
        } else {
            self.rope.len_chars()
        };
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.push(LineMarker { id, start, end });
        Some(id)
    }

    /// Current 0-based line of a marker, or `None` once it has collapsed.
    pub fn marker_line(&self, id: MarkerId) -> Option<usize> {
        let marker = self.markers.iter().find(|m| m.id == id)?;
        if marker.is_collapsed() {
            return None;
        }
        Some(self.rope.char_to_line(marker.start))
    }

    /// Drop one marker. Returns `false` if it was not registered.
    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        self.markers.len() != before
    }

    /// Drop every marker (buffer unload / project switch).
    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Number of registered markers, collapsed ones included.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}
