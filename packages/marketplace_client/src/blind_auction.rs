//! Client side of the commit-reveal auction.
//!
//! The driver validates input locally, keeps the bidder's secret and amount
//! in a durable [`SecretStore`] between the two phases, and submits through a
//! [`MarketplaceGateway`]. Phase decisions use the same pure classifier the
//! contract uses, evaluated against the driver's [`Clock`].

use shared_utils::AuctionPhase;
use tracing::{debug, error, info, warn};

use crate::amount::{format_amount, parse_amount};
use crate::clock::Clock;
use crate::commitment::{derive_commitment, secret_hash};
use crate::error::{ClientError, ClientResult};
use crate::gateway::{AuctionView, MarketplaceGateway};
use crate::secrets::{amount_key, secret_key, SecretStore};

/// Shortest secret accepted at commit time
pub const MIN_SECRET_LEN: usize = 3;

/// What [`BlindAuctionDriver::finalize`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// Finalization was submitted and confirmed
    Submitted,
    /// Reveal window closed but only the seller settles from this client
    WaitingForSeller,
    /// Already settled; nothing was sent
    AlreadyFinalized,
    /// The auction is still in an earlier phase
    NotReady(AuctionPhase),
}

/// A sealed bid as submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBid {
    pub auction_id: u64,
    pub amount: i128,
    pub commitment: [u8; 32],
}

pub struct BlindAuctionDriver<G, S, C>
where
    G: MarketplaceGateway,
    S: SecretStore,
    C: Clock,
{
    gateway: G,
    secrets: S,
    clock: C,
    decimals: u32,
}

impl<G, S, C> BlindAuctionDriver<G, S, C>
where
    G: MarketplaceGateway,
    S: SecretStore,
    C: Clock,
{
    pub fn new(gateway: G, secrets: S, clock: C, decimals: u32) -> Self {
        Self {
            gateway,
            secrets,
            clock,
            decimals,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn secrets(&self) -> &S {
        &self.secrets
    }

    /// Observed phase of an auction at the driver's clock
    pub async fn phase(&self, auction_id: u64) -> ClientResult<(AuctionView, AuctionPhase)> {
        let auction = self.gateway.get_blind_auction(auction_id).await?;
        let phase = auction.phase_at(self.clock.now());
        Ok((auction, phase))
    }

    /// Seal and submit a bid.
    ///
    /// The secret and amount are persisted before the commitment is sent, so
    /// a confirmed commitment always has its reveal inputs on disk. A failed
    /// submission is not retried.
    pub async fn commit(
        &self,
        auction_id: u64,
        amount_text: &str,
        secret_text: &str,
    ) -> ClientResult<CommittedBid> {
        let amount = parse_amount(amount_text, self.decimals)?;
        if amount <= 0 {
            return Err(ClientError::validation("Bid amount must be greater than zero"));
        }
        if secret_text.chars().count() < MIN_SECRET_LEN {
            return Err(ClientError::validation(format!(
                "Secret must be at least {MIN_SECRET_LEN} characters"
            )));
        }

        let hash = secret_hash(secret_text);
        let commitment = derive_commitment(amount, &hash, &self.gateway.caller().key);

        self.secrets.put(&secret_key(auction_id), secret_text).await?;
        self.secrets
            .put(&amount_key(auction_id), &format_amount(amount, self.decimals))
            .await?;

        if let Err(err) = self.gateway.commit_blind_bid(auction_id, commitment).await {
            error!(auction_id, error = %err, "sealed bid submission failed");
            return Err(err.into());
        }

        info!(
            auction_id,
            commitment = %hex::encode(commitment),
            "sealed bid committed"
        );
        Ok(CommittedBid {
            auction_id,
            amount,
            commitment,
        })
    }

    /// Open a sealed bid, escrowing the amount.
    ///
    /// Missing inputs are recovered from the secret store; explicit inputs
    /// take precedence. The commitment is not re-checked locally, the
    /// contract does that.
    pub async fn reveal(
        &self,
        auction_id: u64,
        amount_text: Option<&str>,
        secret_text: Option<&str>,
    ) -> ClientResult<i128> {
        let amount_text = match amount_text.filter(|text| !text.trim().is_empty()) {
            Some(text) => text.to_string(),
            None => self
                .secrets
                .get(&amount_key(auction_id))
                .await?
                .unwrap_or_default(),
        };
        let secret_text = match secret_text.filter(|text| !text.is_empty()) {
            Some(text) => text.to_string(),
            None => self
                .secrets
                .get(&secret_key(auction_id))
                .await?
                .unwrap_or_default(),
        };

        if amount_text.trim().is_empty() {
            return Err(ClientError::validation("Bid amount is required to reveal"));
        }
        let amount = parse_amount(&amount_text, self.decimals)?;
        if amount <= 0 {
            return Err(ClientError::validation("Bid amount must be greater than zero"));
        }
        if secret_text.is_empty() {
            return Err(ClientError::validation("Secret is required to reveal"));
        }

        debug!(auction_id, amount = %amount_text, "revealing sealed bid");
        if let Err(err) = self
            .gateway
            .reveal_blind_bid(auction_id, amount, secret_hash(&secret_text))
            .await
        {
            warn!(auction_id, error = %err, "reveal rejected");
            return Err(err.into());
        }

        info!(auction_id, amount, "sealed bid revealed");
        Ok(amount)
    }

    /// Settle an auction whose reveal window has closed
    pub async fn finalize(&self, auction_id: u64) -> ClientResult<FinalizeOutcome> {
        let (auction, phase) = self.phase(auction_id).await?;
        if phase == AuctionPhase::Finalized {
            return Ok(FinalizeOutcome::AlreadyFinalized);
        }
        if !phase.can_finalize() {
            return Ok(FinalizeOutcome::NotReady(phase));
        }

        if auction.seller != self.gateway.caller().address {
            debug!(auction_id, "waiting for seller to finalize");
            return Ok(FinalizeOutcome::WaitingForSeller);
        }

        self.gateway.finalize_blind_auction(auction_id).await?;
        info!(
            auction_id,
            winner = ?auction.winner,
            "blind auction finalized"
        );
        Ok(FinalizeOutcome::Submitted)
    }
}
