//! Blind-auction phase classification

use soroban_sdk::contracttype;

/// Phase of a sealed-bid auction.
///
/// The phase is never stored. It is recomputed from the two deadlines and the
/// `finalized` flag every time it is needed, so the contract (at the ledger
/// timestamp) and an off-chain observer (at its own clock) classify the same
/// instant identically.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuctionPhase {
    /// Sealed commitments are accepted (`now < commit_end_time`)
    Commit,
    /// Commitments are opened and bids escrowed (`commit_end_time <= now < reveal_end_time`)
    Reveal,
    /// Reveal window closed, settlement not yet executed
    PendingSettlement,
    /// Winner and highest bid are fixed
    Finalized,
}

impl AuctionPhase {
    /// Classify `now` against an auction's deadlines
    ///
    /// # Arguments
    /// * `now` - The timestamp to classify (ledger or wall clock seconds)
    /// * `commit_end_time` - First second of the reveal phase
    /// * `reveal_end_time` - First second after the reveal phase
    /// * `finalized` - Whether settlement has already run
    pub fn at(now: u64, commit_end_time: u64, reveal_end_time: u64, finalized: bool) -> Self {
        if finalized {
            AuctionPhase::Finalized
        } else if now < commit_end_time {
            AuctionPhase::Commit
        } else if now < reveal_end_time {
            AuctionPhase::Reveal
        } else {
            AuctionPhase::PendingSettlement
        }
    }

    pub fn accepts_commitments(&self) -> bool {
        matches!(self, AuctionPhase::Commit)
    }

    pub fn accepts_reveals(&self) -> bool {
        matches!(self, AuctionPhase::Reveal)
    }

    pub fn can_finalize(&self) -> bool {
        matches!(self, AuctionPhase::PendingSettlement)
    }
}
