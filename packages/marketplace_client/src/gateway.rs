//! Seams between the client logic and the chain.
//!
//! A gateway signs and submits invocations as one account and waits for each
//! to settle before returning. Failures carry the contract's numeric error
//! code so callers never inspect message text.

use async_trait::async_trait;
use shared_utils::AuctionPhase;
use stellar_strkey::Strkey;

use crate::error::{ClientError, ClientResult, GatewayError};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// The signing account of a gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    /// Strkey text (`G...` or `C...`)
    pub address: String,
    /// Raw 32-byte account key or contract hash, as committed to in sealed bids
    pub key: [u8; 32],
}

impl Account {
    /// Account for a `G...` public key or `C...` contract strkey, with the
    /// key decoded from its payload
    pub fn from_strkey(address: &str) -> ClientResult<Self> {
        let key = match Strkey::from_string(address) {
            Ok(Strkey::PublicKeyEd25519(public_key)) => public_key.0,
            Ok(Strkey::Contract(contract)) => contract.0,
            Ok(_) => {
                return Err(ClientError::validation(
                    "Address must be an account (G...) or contract (C...) strkey",
                ))
            }
            Err(_) => return Err(ClientError::validation("Address is not a valid strkey")),
        };
        Ok(Self {
            address: address.to_string(),
            key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
    pub listing_id: u64,
    pub nft_contract: String,
    pub token_id: u32,
    pub seller: String,
    pub price: i128,
    pub active: bool,
    pub paused: bool,
    pub listed_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferView {
    pub offerer: String,
    pub amount: i128,
    pub expiration: u64,
    pub active: bool,
}

impl OfferView {
    /// Offers expire strictly after their expiration second
    pub fn is_expired_at(&self, now: u64) -> bool {
        shared_utils::TimeUtils::is_expired_at(now, self.expiration)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionView {
    pub auction_id: u64,
    pub seller: String,
    pub nft_contract: String,
    pub token_id: u32,
    pub min_bid: i128,
    pub commit_end_time: u64,
    pub reveal_end_time: u64,
    pub finalized: bool,
    pub winner: Option<String>,
    pub highest_bid: i128,
}

impl AuctionView {
    /// Phase at `now`, computed exactly as the contract computes it
    pub fn phase_at(&self, now: u64) -> AuctionPhase {
        AuctionPhase::at(now, self.commit_end_time, self.reveal_end_time, self.finalized)
    }
}

/// Marketplace contract entry points
#[async_trait]
pub trait MarketplaceGateway: Send + Sync {
    fn caller(&self) -> &Account;

    async fn list_nft(&self, nft_contract: &str, token_id: u32, price: i128) -> GatewayResult<u64>;
    async fn buy_nft(&self, listing_id: u64, payment: i128) -> GatewayResult<()>;
    async fn update_price(&self, listing_id: u64, price: i128) -> GatewayResult<()>;
    async fn pause_listing(&self, listing_id: u64) -> GatewayResult<()>;
    async fn resume_listing(&self, listing_id: u64) -> GatewayResult<()>;
    async fn cancel_listing(&self, listing_id: u64) -> GatewayResult<()>;

    async fn make_offer(&self, listing_id: u64, amount: i128, expiration: u64) -> GatewayResult<u32>;
    async fn accept_offer(&self, listing_id: u64, offer_index: u32) -> GatewayResult<()>;
    async fn cancel_offer(&self, listing_id: u64, offer_index: u32) -> GatewayResult<()>;

    async fn create_blind_auction(
        &self,
        nft_contract: &str,
        token_id: u32,
        min_bid: i128,
        commit_seconds: u64,
        reveal_seconds: u64,
    ) -> GatewayResult<u64>;
    async fn commit_blind_bid(&self, auction_id: u64, commitment: [u8; 32]) -> GatewayResult<()>;
    /// Reveal with `value = amount` attached as escrow
    async fn reveal_blind_bid(
        &self,
        auction_id: u64,
        amount: i128,
        secret_hash: [u8; 32],
    ) -> GatewayResult<()>;
    async fn finalize_blind_auction(&self, auction_id: u64) -> GatewayResult<()>;

    async fn get_all_active_listings(&self) -> GatewayResult<Vec<ListingView>>;
    async fn get_all_listings(&self) -> GatewayResult<Vec<ListingView>>;
    async fn get_offers(&self, listing_id: u64) -> GatewayResult<Vec<OfferView>>;
    async fn get_blind_auction(&self, auction_id: u64) -> GatewayResult<AuctionView>;
    async fn get_all_active_blind_auctions(&self) -> GatewayResult<Vec<AuctionView>>;
}

/// Collection contract entry points
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    async fn mint_item(&self, to: &str, uri: &str) -> GatewayResult<u32>;
    async fn airdrop_mint(&self, recipients: &[String], uri: &str) -> GatewayResult<Vec<u32>>;
    async fn token_uri(&self, token_id: u32) -> GatewayResult<String>;
    async fn owner_of(&self, token_id: u32) -> GatewayResult<String>;
    async fn balance_of(&self, owner: &str) -> GatewayResult<u32>;
    async fn token_of_owner_by_index(&self, owner: &str, index: u32) -> GatewayResult<u32>;
}
