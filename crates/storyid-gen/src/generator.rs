//! Candidate discovery and collision-free identifier minting.
//!
//! The generator walks the parsed tree depth-first, tracking an ancestry
//! stack of named containers. Every non-empty text node outside an
//! assignment context is a candidate; candidates that already carry an
//! attached tag feed the Existing-Id Set, the rest get a freshly minted
//! identifier. The generator never mutates buffers — it returns edits for
//! the caller to register as anchors.

use std::collections::HashSet;

use log::warn;
use rand::Rng;
use thiserror::Error;

use storyid_core::tag::LineId;

use crate::tree::{NodeKind, SyntaxNode, SyntaxTree};

/// Characters a minted suffix is drawn from.
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// How identifiers are minted.
///
/// The defaults are the production values. Shrinking `suffix_len` shrinks
/// the identifier space, which is how the exhaustion path is exercised
/// deterministically in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintPolicy {
    /// Number of random suffix characters per identifier.
    pub suffix_len: usize,
    /// Draw budget per candidate before giving up.
    pub max_attempts: u32,
}

impl Default for MintPolicy {
    fn default() -> Self {
        Self {
            suffix_len: 4,
            max_attempts: 100,
        }
    }
}

/// Minting failed for one candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MintError {
    /// Every draw collided with an identifier already in use. The candidate
    /// stays untagged; it will be retried on the next synchronization run.
    #[error("identifier space exhausted for prefix {prefix:?} after {attempts} draws")]
    Exhausted {
        /// Hierarchical prefix the draws were made under.
        prefix: String,
        /// How many draws were spent.
        attempts: u32,
    },
}

impl MintPolicy {
    /// Mint one identifier with the given prefix, avoiding `existing`.
    ///
    /// The accepted identifier is inserted into `existing` before it is
    /// returned (reservation), so a batch of mints can never collide with
    /// itself. The draw budget bounds worst-case latency under uniqueness
    /// pressure.
    pub fn mint(
        &self,
        prefix: &str,
        existing: &mut HashSet<LineId>,
        rng: &mut impl Rng,
    ) -> Result<LineId, MintError> {
        for _ in 0..self.max_attempts {
            let mut suffix = String::with_capacity(self.suffix_len);
            for _ in 0..self.suffix_len {
                let index = rng.gen_range(0..SUFFIX_ALPHABET.len());
                suffix.push(SUFFIX_ALPHABET[index] as char);
            }
            // A prefix the codec cannot carry makes the draw invalid; it
            // still counts against the budget.
            let Ok(id) = LineId::from_parts(prefix, &suffix) else {
                continue;
            };
            if !existing.contains(&id) {
                existing.insert(id.clone());
                return Ok(id);
            }
        }
        Err(MintError::Exhausted {
            prefix: prefix.to_string(),
            attempts: self.max_attempts,
        })
    }
}

/// One newly minted tag assignment, to be registered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEdit {
    /// File the candidate line belongs to.
    pub file: String,
    /// 1-based line number (parser convention).
    pub line: usize,
    /// Candidate text at generation time, used for revalidation and logs.
    pub text: String,
    /// The minted identifier.
    pub id: LineId,
}

/// A candidate the minter gave up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhaustedCandidate {
    /// File the candidate line belongs to.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Candidate text.
    pub text: String,
    /// Prefix the draws were made under.
    pub prefix: String,
}

/// Everything one generation pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// New tag assignments, in traversal order.
    pub edits: Vec<TagEdit>,
    /// Candidates skipped because the identifier space was exhausted.
    pub exhausted: Vec<ExhaustedCandidate>,
}

impl GenerationReport {
    /// Whether the pass produced neither edits nor failures.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.exhausted.is_empty()
    }

    /// The edits targeting one file.
    pub fn edits_for_file<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a TagEdit> {
        self.edits.iter().filter(move |edit| edit.file == file)
    }
}

/// Walk `tree` and mint identifiers for every untagged candidate line.
///
/// `existing` is the project-wide Existing-Id Set: identifiers found on
/// already-tagged candidates are recorded into it, and minted identifiers
/// are reserved in it, so generation never collides with content it has not
/// seen this session.
///
/// A parser failure means there is no tree and this is never called; an
/// empty tree simply yields an empty report.
pub fn generate(
    tree: &SyntaxTree,
    existing: &mut HashSet<LineId>,
    policy: MintPolicy,
    rng: &mut impl Rng,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    let mut ancestry: Vec<String> = Vec::new();
    walk(
        &tree.root.children,
        &mut ancestry,
        false,
        existing,
        policy,
        rng,
        &mut report,
    );
    report
}

fn walk(
    nodes: &[SyntaxNode],
    ancestry: &mut Vec<String>,
    in_assignment: bool,
    existing: &mut HashSet<LineId>,
    policy: MintPolicy,
    rng: &mut impl Rng,
    report: &mut GenerationReport,
) {
    for (index, node) in nodes.iter().enumerate() {
        match &node.kind {
            NodeKind::Container { name, .. } => match name {
                Some(name) if !name.is_empty() => {
                    ancestry.push(sanitize_name(name));
                    walk(
                        &node.children,
                        ancestry,
                        in_assignment,
                        existing,
                        policy,
                        rng,
                        report,
                    );
                    ancestry.pop();
                }
                _ => walk(
                    &node.children,
                    ancestry,
                    in_assignment,
                    existing,
                    policy,
                    rng,
                    report,
                ),
            },
            NodeKind::Assignment => {
                walk(
                    &node.children,
                    ancestry,
                    true,
                    existing,
                    policy,
                    rng,
                    report,
                );
            }
            NodeKind::Text(text) => {
                if in_assignment || text.trim().is_empty() {
                    continue;
                }
                if let Some(id) = attached_tag(&nodes[index + 1..]) {
                    existing.insert(id);
                    continue;
                }
                // Without a source position there is nothing to edit.
                let Some(origin) = &node.origin else {
                    continue;
                };
                let prefix = prefix_of(ancestry);
                match policy.mint(&prefix, existing, rng) {
                    Ok(id) => report.edits.push(TagEdit {
                        file: origin.file.clone(),
                        line: origin.line,
                        text: text.clone(),
                        id,
                    }),
                    Err(MintError::Exhausted { prefix, attempts }) => {
                        warn!(
                            "no free identifier for {}:{} (prefix {prefix:?}, {attempts} draws)",
                            origin.file, origin.line
                        );
                        report.exhausted.push(ExhaustedCandidate {
                            file: origin.file.clone(),
                            line: origin.line,
                            text: text.clone(),
                            prefix,
                        });
                    }
                }
            }
            NodeKind::Tag(_) => {}
            NodeKind::Other => {
                walk(
                    &node.children,
                    ancestry,
                    in_assignment,
                    existing,
                    policy,
                    rng,
                    report,
                );
            }
        }
    }
}

/// Identifier carried by a tag attached to the candidate, if any.
///
/// A tag counts as attached when it appears after the text node and before
/// the next non-empty text node or line break. Unrelated tags (mood marks,
/// audio cues) do not end the scan.
fn attached_tag(following: &[SyntaxNode]) -> Option<LineId> {
    for node in following {
        match &node.kind {
            NodeKind::Text(text) => {
                if node.is_line_break() || !text.trim().is_empty() {
                    return None;
                }
            }
            NodeKind::Tag(body) => {
                if let Some(raw) = body.strip_prefix("id:") {
                    if let Ok(id) = LineId::parse(raw) {
                        return Some(id);
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// `Forest` + `Clearing` → `Forest_Clearing_`; empty ancestry → empty prefix.
fn prefix_of(ancestry: &[String]) -> String {
    let mut prefix = String::new();
    for name in ancestry {
        prefix.push_str(name);
        prefix.push('_');
    }
    prefix
}

/// Container names pass into identifiers verbatim where possible; anything
/// the tag grammar cannot carry is mapped to `_`.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
