#![warn(missing_docs)]
//! `storyid-sync` - Debounced synchronization for the storyid overlay.
//!
//! Orchestrates `storyid-core` and `storyid-gen` on a debounced edit
//! cadence, sans-io: the host owns the clock and the parser invocation, the
//! driver owns run ordering, staleness handling, per-line revalidation, and
//! anchor registration. See [`SyncDriver`] for the protocol.

mod driver;

pub use driver::{
    DriverConfig, DriverState, ParseFailure, ParseRequest, RunId, RunOutcome, SyncDriver,
};
