//! Outcomes of [`crate::ledger::Ledger::process`] (§4.3, §7).
//!
//! `Progress` is the only success; every other variant leaves the store
//! unchanged except `Fork`, which additionally records the losing block
//! as evidence in the `forks` table. This is a plain value type compared
//! for equality throughout the test suite, not a `thiserror` enum bubbled
//! with `?` -- I/O failures get their own type, [`crate::storage::StoreError`].

use std::fmt;

/// The result of applying one block to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// Newly accepted: signature verified, no conflicts.
    Progress,
    /// Signature did not verify against the expected account.
    BadSignature,
    /// This exact block hash is already present in the `blocks` table.
    Old,
    /// A send whose new balance exceeds its previous balance, or a
    /// receive whose balance computation overflows.
    Overspend,
    /// A receive/open whose `source` is not (or no longer) pending.
    Overreceive,
    /// Another block already extends the same `previous` (or, for open,
    /// the account already has a frontier). The new block was recorded
    /// in the `forks` table as evidence; the main chain is unchanged.
    Fork,
    /// `previous` is not present in the store.
    GapPrevious,
    /// `source` is not present in the store.
    GapSource,
    /// A receive/open's `source` block exists but is not a send.
    NotReceiveFromSend,
}

impl ProcessResult {
    /// Whether this result represents a block that was actually applied.
    pub fn is_progress(self) -> bool {
        matches!(self, ProcessResult::Progress)
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ProcessResult::Progress => "progress",
            ProcessResult::BadSignature => "bad signature",
            ProcessResult::Old => "already processed",
            ProcessResult::Overspend => "overspend",
            ProcessResult::Overreceive => "overreceive",
            ProcessResult::Fork => "fork",
            ProcessResult::GapPrevious => "gap: previous block missing",
            ProcessResult::GapSource => "gap: source block missing",
            ProcessResult::NotReceiveFromSend => "source block is not a send",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for ProcessResult {}
