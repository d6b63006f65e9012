//! The debounce-and-revalidate synchronization driver.
//!
//! The driver coordinates the overlay engine on a debounced edit cadence:
//! reconstruct full content from current anchors → hand it to the external
//! parser → run the generator on the resulting tree → register anchors for
//! the newly minted identifiers. Visible text is never mutated.
//!
//! The design is sans-io: the host owns the clock, the parser invocation,
//! and any threading. The driver owns ordering and safety —
//!
//! - bursts of edits coalesce into one run ([`SyncDriver::poll`]);
//! - only the most recently issued run may apply; completions of superseded
//!   runs are discarded wholesale (cooperative staleness, no cancellation);
//! - each surviving edit re-checks that its target line still reads exactly
//!   as it did when the run was issued, so a user typing through the
//!   asynchronous round trip can never get a mis-tagged line.
//!
//! Exactly one writer (the driver) mutates anchors, so no locking is
//! involved anywhere.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use storyid_core::session::DocumentSession;
use storyid_gen::generator::{ExhaustedCandidate, MintPolicy, TagEdit, generate};
use storyid_gen::tree::SyntaxTree;

/// Tuning for the synchronization driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// How long the buffer must stay quiet before a run is issued.
    pub debounce: Duration,
    /// Mint policy forwarded to the generator.
    pub mint: MintPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            mint: MintPolicy::default(),
        }
    }
}

/// Driver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No run in flight.
    Idle,
    /// A run is in flight and still authoritative.
    Tagging,
    /// The in-flight run has been superseded by newer edits; its results
    /// will be discarded when it returns.
    Stale,
}

/// Handle identifying one issued run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

/// A request for the host to invoke the external parser/compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRequest {
    /// Run this request belongs to; echo it to [`SyncDriver::complete_run`].
    pub run: RunId,
    /// The active file — the compilation entry point.
    pub root_file: String,
    /// Full (reconstructed) content per open file, LF newlines.
    pub files: BTreeMap<String, String>,
}

/// The external parser failed.
///
/// Expected during invalid intermediate editing states; the run yields no
/// edits and nothing is escalated. The host's error-display path owns
/// showing the message to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse failed: {message}")]
pub struct ParseFailure {
    /// Parser-reported message.
    pub message: String,
}

/// What applying one completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Edits bound as anchors on the active buffer.
    pub applied: Vec<TagEdit>,
    /// Edits staged for files that are not currently active.
    pub staged: usize,
    /// Edits dropped because their target line changed mid-flight.
    pub discarded: usize,
    /// Candidates skipped because the identifier space was exhausted.
    pub exhausted: Vec<ExhaustedCandidate>,
    /// The whole run was dropped (superseded, or unknown run id).
    pub superseded: bool,
    /// The parser reported failure; no edits were produced.
    pub parse_failed: bool,
}

struct InFlight {
    run: RunId,
    root_file: String,
    /// Clean lines per file at issue time, for per-line revalidation.
    snapshots: BTreeMap<String, Vec<String>>,
}

/// The synchronization driver. One per session.
pub struct SyncDriver {
    config: DriverConfig,
    state: DriverState,
    next_run: u64,
    in_flight: Option<InFlight>,
    pending_since: Option<Instant>,
    staged: Vec<TagEdit>,
    rng: StdRng,
}

impl SyncDriver {
    /// Create a driver with entropy-seeded minting.
    pub fn new(config: DriverConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a driver minting from a caller-provided RNG, for reproducible
    /// runs.
    pub fn with_rng(config: DriverConfig, rng: StdRng) -> Self {
        Self {
            config,
            state: DriverState::Idle,
            next_run: 0,
            in_flight: None,
            pending_since: None,
            staged: Vec::new(),
            rng,
        }
    }

    /// Create a driver minting from a fixed seed. Test convenience.
    pub fn with_rng_seed(config: DriverConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Number of edits currently staged for inactive files.
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Record a content-change event.
    ///
    /// An in-flight run becomes stale: it runs to completion but its results
    /// are discarded on return. A fresh run is scheduled after the debounce
    /// window.
    pub fn note_edit(&mut self, now: Instant) {
        if self.state == DriverState::Tagging {
            self.state = DriverState::Stale;
        }
        self.pending_since = Some(now);
    }

    /// Issue the next run once the debounce window has elapsed.
    ///
    /// Returns the parse request the host should forward to the external
    /// parser, or `None` while the window is still open (or nothing is
    /// pending, or no file is active). Issuing a new run while an older one
    /// is in flight supersedes the older one.
    pub fn poll(&mut self, session: &DocumentSession, now: Instant) -> Option<ParseRequest> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.config.debounce {
            return None;
        }
        let root_file = session.active()?.to_string();
        self.pending_since = None;

        let mut files = BTreeMap::new();
        let mut snapshots = BTreeMap::new();
        for name in session.file_names() {
            if let Some(full) = session.full_text(name) {
                files.insert(name.to_string(), full);
            }
            if let Some(clean) = session.clean_text(name) {
                snapshots.insert(name.to_string(), clean_lines(&clean));
            }
        }

        let run = RunId(self.next_run);
        self.next_run += 1;
        self.in_flight = Some(InFlight {
            run,
            root_file: root_file.clone(),
            snapshots,
        });
        self.state = DriverState::Tagging;

        Some(ParseRequest {
            run,
            root_file,
            files,
        })
    }

    /// Apply the results of one parser round trip.
    ///
    /// Only the most recently issued, non-stale run applies. Edits for the
    /// active file bind anchors after per-line revalidation; edits for other
    /// files are staged until [`SyncDriver::take_staged_for`] runs for them.
    pub fn complete_run(
        &mut self,
        session: &mut DocumentSession,
        run: RunId,
        outcome: Result<SyntaxTree, ParseFailure>,
    ) -> RunOutcome {
        let mut result = RunOutcome::default();

        let flight = match self.in_flight.take() {
            Some(flight) if flight.run == run => flight,
            other => {
                // A completion for a run that was already replaced.
                self.in_flight = other;
                debug!("discarding completion for superseded run {run:?}");
                result.superseded = true;
                return result;
            }
        };

        let was_stale = self.state == DriverState::Stale;
        self.state = DriverState::Idle;

        if was_stale {
            debug!("run {run:?} superseded by newer edits; results dropped");
            result.superseded = true;
            return result;
        }

        let tree = match outcome {
            Ok(tree) => tree,
            Err(failure) => {
                debug!("run {run:?}: {failure}");
                result.parse_failed = true;
                return result;
            }
        };

        let mut known = session.known_ids();
        let report = generate(&tree, &mut known, self.config.mint, &mut self.rng);
        result.exhausted = report.exhausted;

        for edit in report.edits {
            if edit.file == flight.root_file {
                if apply_to_active(session, &flight, &edit) {
                    result.applied.push(edit);
                } else {
                    debug!("dropping stale edit for {}:{}", edit.file, edit.line);
                    result.discarded += 1;
                }
            } else {
                self.staged.push(edit);
                result.staged += 1;
            }
        }
        result
    }

    /// Apply staged edits for `file`, typically when it becomes active.
    ///
    /// Staged edits outlive the snapshots of the run that produced them, so
    /// they revalidate by candidate-text containment instead: the target
    /// line must still contain the text that was parsed, and must not
    /// already carry an anchor.
    pub fn take_staged_for(&mut self, session: &mut DocumentSession, file: &str) -> RunOutcome {
        let mut result = RunOutcome::default();
        let mut keep = Vec::new();
        for edit in std::mem::take(&mut self.staged) {
            if edit.file != file {
                keep.push(edit);
                continue;
            }
            if apply_staged(session, &edit) {
                result.applied.push(edit);
            } else {
                debug!("dropping stale staged edit for {}:{}", edit.file, edit.line);
                result.discarded += 1;
            }
        }
        self.staged = keep;
        result
    }
}

/// Split clean text into lines the same way the buffer counts them.
fn clean_lines(clean: &str) -> Vec<String> {
    clean.split('\n').map(str::to_string).collect()
}

/// Bind one active-file edit after checking its line still matches the
/// issue-time snapshot.
fn apply_to_active(session: &mut DocumentSession, flight: &InFlight, edit: &TagEdit) -> bool {
    // Parser lines are 1-based.
    let Some(line) = edit.line.checked_sub(1) else {
        return false;
    };
    let snapshot = flight
        .snapshots
        .get(&edit.file)
        .and_then(|lines| lines.get(line));
    let current = session
        .buffer(&edit.file)
        .and_then(|buffer| buffer.line_text(line));
    match (snapshot, current) {
        (Some(snapshot), Some(current)) if *snapshot == current => {
            session.bind(&edit.file, line, edit.id.clone())
        }
        _ => false,
    }
}

/// Bind one staged edit after containment revalidation.
fn apply_staged(session: &mut DocumentSession, edit: &TagEdit) -> bool {
    let Some(line) = edit.line.checked_sub(1) else {
        return false;
    };
    let Some(buffer) = session.buffer(&edit.file) else {
        return false;
    };
    let Some(current) = buffer.line_text(line) else {
        return false;
    };
    if !current.contains(edit.text.trim()) {
        return false;
    }
    let occupied = session
        .anchors(&edit.file)
        .zip(session.buffer(&edit.file))
        .map(|(anchors, buffer)| {
            anchors
                .associations(buffer)
                .iter()
                .any(|(bound, _)| *bound == line)
        })
        .unwrap_or(false);
    if occupied {
        return false;
    }
    session.bind(&edit.file, line, edit.id.clone())
}
