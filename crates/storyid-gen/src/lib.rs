#![warn(missing_docs)]
//! `storyid-gen` - Identifier generation for the storyid overlay engine.
//!
//! Consumes the external parser's syntax tree (modeled in [`tree`] as a
//! tagged-variant type) and produces, per untagged candidate line, a
//! freshly minted project-unique identifier ([`generator`]). The caller —
//! usually the synchronization driver in `storyid-sync` — registers the
//! resulting edits as anchors; nothing here mutates visible text.

pub mod generator;
pub mod tree;

pub use generator::{
    ExhaustedCandidate, GenerationReport, MintError, MintPolicy, TagEdit, generate,
};
pub use tree::{ContainerKind, NodeKind, Origin, SyntaxNode, SyntaxTree};
