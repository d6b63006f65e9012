#![warn(missing_docs)]
//! `storyid-core` - Stable Line-Identifier Overlay Kernel
//!
//! # Overview
//!
//! Branching-narrative script editors need every line of spoken or choice
//! text to carry a short, stable, globally unique identifier for
//! localization, voice-recording lookup, and analytics. The identifier must
//! never appear in the editable text, and it must stay attached to "its"
//! line as the document is edited, reordered, split across files, and
//! saved.
//!
//! This crate is the kernel of that overlay:
//!
//! - **Tag codec** ([`tag`]) — recognize, strip, and inject `#id:` tags in
//!   a line of script source.
//! - **Extraction / reconstruction** ([`extract`]) — raw file text ⇄ clean
//!   editable text plus `(line, id)` pairs.
//! - **Marker buffer** ([`buffer`]) — rope-backed text with whole-line,
//!   edge-sticky markers that rebase under arbitrary edits.
//! - **Anchor tracking** ([`anchors`]) — which identifier is bound to which
//!   live line.
//! - **Document session** ([`session`]) — the explicit context owning open
//!   files, the active buffer, the project-wide id set, and save payloads.
//!
//! Identifier generation (tree traversal, minting) lives in `storyid-gen`;
//! the debounced synchronization driver lives in `storyid-sync`.
//!
//! # Conventions
//!
//! - All line numbers are 0-based; all offsets are character offsets.
//! - Internal text is LF-normalized; the preferred line ending is restored
//!   on save ([`line_ending`]).
//! - The only on-disk artifact this kernel defines is the tag format
//!   `#id:<prefix><4-alnum>` where `<prefix>` is zero or more `Name_`
//!   segments.

pub mod anchors;
pub mod buffer;
pub mod extract;
pub mod line_ending;
pub mod session;
pub mod tag;

pub use anchors::AnchorSet;
pub use buffer::{MarkerBuffer, MarkerId};
pub use extract::{Extraction, extract, reconstruct};
pub use line_ending::LineEnding;
pub use session::{DocumentSession, SavePayload};
pub use tag::{IdShapeError, LineId, TAG_SIGIL, TagMatch, detect_tag, inject_tag, strip_tag};
