//! In-memory stand-ins for the chain and the pinning service.
//!
//! `MockMarket` is shared state; each `MockGateway` acts as one account on it,
//! so a seller and several bidders can drive the same auction. Contract rules
//! are reproduced closely enough for client flows to hit the same error codes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use shared_utils::{code, AuctionPhase};

use crate::clock::{Clock, MockClock};
use crate::commitment::derive_commitment;
use crate::error::{GatewayError, UploadError};
use crate::gateway::{
    Account, AuctionView, CollectionGateway, GatewayResult, ListingView, MarketplaceGateway,
    OfferView,
};
use crate::ipfs::PinningService;
use crate::resolver::MetadataFetcher;

/// Deterministic 32-byte key for a mock address
pub fn mock_key(address: &str) -> [u8; 32] {
    crate::commitment::secret_hash(address)
}

pub fn mock_account(address: &str) -> Account {
    Account {
        address: address.to_string(),
        key: mock_key(address),
    }
}

#[derive(Debug, Default)]
struct MarketState {
    listings: Vec<ListingView>,
    offers: HashMap<u64, Vec<OfferView>>,
    auctions: Vec<AuctionView>,
    commitments: HashMap<(u64, String), ([u8; 32], bool)>,
    calls: Vec<String>,
    failures: HashMap<String, GatewayError>,
}

/// Shared mock marketplace
#[derive(Debug, Clone)]
pub struct MockMarket {
    state: Arc<Mutex<MarketState>>,
    clock: MockClock,
}

impl MockMarket {
    pub fn new(clock: MockClock) -> Self {
        Self {
            state: Arc::new(Mutex::new(MarketState::default())),
            clock,
        }
    }

    pub fn gateway(&self, address: &str) -> MockGateway {
        MockGateway {
            account: mock_account(address),
            market: self.clone(),
        }
    }

    /// Make the next call to `method` fail with `error`
    pub fn fail_next(&self, method: &str, error: GatewayError) {
        self.lock().failures.insert(method.to_string(), error);
    }

    /// Every submitted call as `"<address> <method> <args>"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn calls_named(&self, method: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.split(' ').nth(1) == Some(method))
            .count()
    }

    pub fn listing(&self, listing_id: u64) -> Option<ListingView> {
        self.lock()
            .listings
            .iter()
            .find(|l| l.listing_id == listing_id)
            .cloned()
    }

    pub fn auction(&self, auction_id: u64) -> Option<AuctionView> {
        self.lock()
            .auctions
            .iter()
            .find(|a| a.auction_id == auction_id)
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MarketState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn revert<T>(value: u32) -> GatewayResult<T> {
    Err(GatewayError::Reverted(value))
}

/// One account acting on a [`MockMarket`]
#[derive(Debug, Clone)]
pub struct MockGateway {
    account: Account,
    market: MockMarket,
}

impl MockGateway {
    pub fn market(&self) -> &MockMarket {
        &self.market
    }

    /// Record the call and consume any injected failure for it
    fn enter(&self, method: &str, args: String) -> GatewayResult<MutexGuard<'_, MarketState>> {
        let mut state = self.market.lock();
        state
            .calls
            .push(format!("{} {method} {args}", self.account.address));
        match state.failures.remove(method) {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }

    fn now(&self) -> u64 {
        self.market.clock.now()
    }
}

fn listing_mut(state: &mut MarketState, listing_id: u64) -> GatewayResult<&mut ListingView> {
    match state.listings.iter_mut().find(|l| l.listing_id == listing_id) {
        Some(listing) => Ok(listing),
        None => revert(code::LISTING_NOT_FOUND),
    }
}

fn seller_listing<'a>(
    state: &'a mut MarketState,
    listing_id: u64,
    caller: &str,
) -> GatewayResult<&'a mut ListingView> {
    let listing = listing_mut(state, listing_id)?;
    if listing.seller != caller {
        return revert(code::NOT_SELLER);
    }
    if !listing.active {
        return revert(code::LISTING_INACTIVE);
    }
    Ok(listing)
}

fn close_offers(state: &mut MarketState, listing_id: u64) {
    if let Some(offers) = state.offers.get_mut(&listing_id) {
        for offer in offers.iter_mut() {
            offer.active = false;
        }
    }
}

#[async_trait]
impl MarketplaceGateway for MockGateway {
    fn caller(&self) -> &Account {
        &self.account
    }

    async fn list_nft(&self, nft_contract: &str, token_id: u32, price: i128) -> GatewayResult<u64> {
        let now = self.now();
        let mut state = self.enter("list_nft", format!("{nft_contract} {token_id} {price}"))?;
        if price <= 0 {
            return revert(code::INVALID_PRICE);
        }
        if state
            .listings
            .iter()
            .any(|l| l.active && l.nft_contract == nft_contract && l.token_id == token_id)
        {
            return revert(code::LISTING_EXISTS);
        }
        let listing_id = state.listings.len() as u64 + 1;
        state.listings.push(ListingView {
            listing_id,
            nft_contract: nft_contract.to_string(),
            token_id,
            seller: self.account.address.clone(),
            price,
            active: true,
            paused: false,
            listed_at: now,
        });
        Ok(listing_id)
    }

    async fn buy_nft(&self, listing_id: u64, payment: i128) -> GatewayResult<()> {
        let mut state = self.enter("buy_nft", format!("{listing_id} {payment}"))?;
        let listing = listing_mut(&mut state, listing_id)?;
        if !listing.active {
            return revert(code::LISTING_INACTIVE);
        }
        if listing.paused {
            return revert(code::LISTING_PAUSED);
        }
        if listing.seller == self.account.address {
            return revert(code::SELF_TRADE);
        }
        if payment < listing.price {
            return revert(code::INSUFFICIENT_PAYMENT);
        }
        listing.active = false;
        close_offers(&mut state, listing_id);
        Ok(())
    }

    async fn update_price(&self, listing_id: u64, price: i128) -> GatewayResult<()> {
        let mut state = self.enter("update_price", format!("{listing_id} {price}"))?;
        let caller = self.account.address.clone();
        let listing = seller_listing(&mut state, listing_id, &caller)?;
        if price <= 0 {
            return revert(code::INVALID_PRICE);
        }
        listing.price = price;
        Ok(())
    }

    async fn pause_listing(&self, listing_id: u64) -> GatewayResult<()> {
        let mut state = self.enter("pause_listing", listing_id.to_string())?;
        let caller = self.account.address.clone();
        let listing = seller_listing(&mut state, listing_id, &caller)?;
        if listing.paused {
            return revert(code::LISTING_PAUSED);
        }
        listing.paused = true;
        Ok(())
    }

    async fn resume_listing(&self, listing_id: u64) -> GatewayResult<()> {
        let mut state = self.enter("resume_listing", listing_id.to_string())?;
        let caller = self.account.address.clone();
        let listing = seller_listing(&mut state, listing_id, &caller)?;
        if !listing.paused {
            return revert(code::LISTING_NOT_PAUSED);
        }
        listing.paused = false;
        Ok(())
    }

    async fn cancel_listing(&self, listing_id: u64) -> GatewayResult<()> {
        let mut state = self.enter("cancel_listing", listing_id.to_string())?;
        let caller = self.account.address.clone();
        let listing = seller_listing(&mut state, listing_id, &caller)?;
        listing.active = false;
        close_offers(&mut state, listing_id);
        Ok(())
    }

    async fn make_offer(&self, listing_id: u64, amount: i128, expiration: u64) -> GatewayResult<u32> {
        let now = self.now();
        let mut state = self.enter("make_offer", format!("{listing_id} {amount} {expiration}"))?;
        if amount <= 0 {
            return revert(code::INVALID_AMOUNT);
        }
        if expiration <= now {
            return revert(code::INVALID_EXPIRATION);
        }
        let listing = listing_mut(&mut state, listing_id)?;
        if !listing.active {
            return revert(code::LISTING_INACTIVE);
        }
        if listing.paused {
            return revert(code::LISTING_PAUSED);
        }
        if listing.seller == self.account.address {
            return revert(code::SELF_TRADE);
        }
        let offers = state.offers.entry(listing_id).or_default();
        offers.push(OfferView {
            offerer: self.account.address.clone(),
            amount,
            expiration,
            active: true,
        });
        Ok(offers.len() as u32 - 1)
    }

    async fn accept_offer(&self, listing_id: u64, offer_index: u32) -> GatewayResult<()> {
        let now = self.now();
        let mut state = self.enter("accept_offer", format!("{listing_id} {offer_index}"))?;
        let caller = self.account.address.clone();
        seller_listing(&mut state, listing_id, &caller)?;
        let offer = match state
            .offers
            .get(&listing_id)
            .and_then(|offers| offers.get(offer_index as usize))
        {
            Some(offer) => offer.clone(),
            None => return revert(code::OFFER_NOT_FOUND),
        };
        if !offer.active {
            return revert(code::OFFER_INACTIVE);
        }
        if offer.is_expired_at(now) {
            return revert(code::OFFER_EXPIRED);
        }
        listing_mut(&mut state, listing_id)?.active = false;
        close_offers(&mut state, listing_id);
        Ok(())
    }

    async fn cancel_offer(&self, listing_id: u64, offer_index: u32) -> GatewayResult<()> {
        let mut state = self.enter("cancel_offer", format!("{listing_id} {offer_index}"))?;
        let offer = match state
            .offers
            .get_mut(&listing_id)
            .and_then(|offers| offers.get_mut(offer_index as usize))
        {
            Some(offer) => offer,
            None => return revert(code::OFFER_NOT_FOUND),
        };
        if offer.offerer != self.account.address {
            return revert(code::NOT_OFFER_MAKER);
        }
        if !offer.active {
            return revert(code::OFFER_INACTIVE);
        }
        offer.active = false;
        Ok(())
    }

    async fn create_blind_auction(
        &self,
        nft_contract: &str,
        token_id: u32,
        min_bid: i128,
        commit_seconds: u64,
        reveal_seconds: u64,
    ) -> GatewayResult<u64> {
        let now = self.now();
        let mut state = self.enter(
            "create_blind_auction",
            format!("{nft_contract} {token_id} {min_bid} {commit_seconds} {reveal_seconds}"),
        )?;
        if min_bid <= 0 {
            return revert(code::INVALID_AMOUNT);
        }
        if commit_seconds == 0 || reveal_seconds == 0 {
            return revert(code::INVALID_DURATION);
        }
        let auction_id = state.auctions.len() as u64 + 1;
        let commit_end_time = now + commit_seconds;
        state.auctions.push(AuctionView {
            auction_id,
            seller: self.account.address.clone(),
            nft_contract: nft_contract.to_string(),
            token_id,
            min_bid,
            commit_end_time,
            reveal_end_time: commit_end_time + reveal_seconds,
            finalized: false,
            winner: None,
            highest_bid: 0,
        });
        Ok(auction_id)
    }

    async fn commit_blind_bid(&self, auction_id: u64, commitment: [u8; 32]) -> GatewayResult<()> {
        let now = self.now();
        let mut state = self.enter(
            "commit_blind_bid",
            format!("{auction_id} {}", hex::encode(commitment)),
        )?;
        let auction = match state.auctions.iter().find(|a| a.auction_id == auction_id) {
            Some(auction) => auction.clone(),
            None => return revert(code::AUCTION_NOT_FOUND),
        };
        if !auction.phase_at(now).accepts_commitments() {
            return revert(code::NOT_COMMIT_PHASE);
        }
        if auction.seller == self.account.address {
            return revert(code::SELF_TRADE);
        }
        state
            .commitments
            .insert((auction_id, self.account.address.clone()), (commitment, false));
        Ok(())
    }

    async fn reveal_blind_bid(
        &self,
        auction_id: u64,
        amount: i128,
        secret_hash: [u8; 32],
    ) -> GatewayResult<()> {
        let now = self.now();
        let mut state = self.enter(
            "reveal_blind_bid",
            format!("{auction_id} {amount} {}", hex::encode(secret_hash)),
        )?;
        let auction = match state.auctions.iter().find(|a| a.auction_id == auction_id) {
            Some(auction) => auction.clone(),
            None => return revert(code::AUCTION_NOT_FOUND),
        };
        if !auction.phase_at(now).accepts_reveals() {
            return revert(code::NOT_REVEAL_PHASE);
        }
        let key = (auction_id, self.account.address.clone());
        let (stored, revealed) = match state.commitments.get(&key) {
            Some(entry) => *entry,
            None => return revert(code::COMMITMENT_NOT_FOUND),
        };
        if revealed {
            return revert(code::ALREADY_REVEALED);
        }
        if amount <= 0 {
            return revert(code::INVALID_AMOUNT);
        }
        if derive_commitment(amount, &secret_hash, &self.account.key) != stored {
            return revert(code::COMMITMENT_MISMATCH);
        }
        if amount < auction.min_bid {
            return revert(code::BID_TOO_LOW);
        }
        state.commitments.insert(key, (stored, true));
        if let Some(auction) = state.auctions.iter_mut().find(|a| a.auction_id == auction_id) {
            if amount > auction.highest_bid {
                auction.highest_bid = amount;
                auction.winner = Some(self.account.address.clone());
            }
        }
        Ok(())
    }

    async fn finalize_blind_auction(&self, auction_id: u64) -> GatewayResult<()> {
        let now = self.now();
        let mut state = self.enter("finalize_blind_auction", auction_id.to_string())?;
        let auction = match state.auctions.iter_mut().find(|a| a.auction_id == auction_id) {
            Some(auction) => auction,
            None => return revert(code::AUCTION_NOT_FOUND),
        };
        let phase = auction.phase_at(now);
        if phase == AuctionPhase::Finalized {
            return revert(code::AUCTION_FINALIZED);
        }
        if !phase.can_finalize() {
            return revert(code::AUCTION_NOT_ENDED);
        }
        auction.finalized = true;
        Ok(())
    }

    async fn get_all_active_listings(&self) -> GatewayResult<Vec<ListingView>> {
        Ok(self
            .market
            .lock()
            .listings
            .iter()
            .filter(|l| l.active && !l.paused)
            .cloned()
            .collect())
    }

    async fn get_all_listings(&self) -> GatewayResult<Vec<ListingView>> {
        Ok(self.market.lock().listings.clone())
    }

    async fn get_offers(&self, listing_id: u64) -> GatewayResult<Vec<OfferView>> {
        Ok(self
            .market
            .lock()
            .offers
            .get(&listing_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_blind_auction(&self, auction_id: u64) -> GatewayResult<AuctionView> {
        match self.market.auction(auction_id) {
            Some(auction) => Ok(auction),
            None => revert(code::AUCTION_NOT_FOUND),
        }
    }

    async fn get_all_active_blind_auctions(&self) -> GatewayResult<Vec<AuctionView>> {
        Ok(self
            .market
            .lock()
            .auctions
            .iter()
            .filter(|a| !a.finalized)
            .cloned()
            .collect())
    }
}

/// In-memory collection contract
#[derive(Debug, Default)]
pub struct MockCollection {
    tokens: Mutex<Vec<(String, String)>>,
    airdrop_calls: AtomicU32,
    mint_calls: AtomicU32,
}

impl MockCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn airdrop_calls(&self) -> u32 {
        self.airdrop_calls.load(Ordering::SeqCst)
    }

    pub fn mint_calls(&self) -> u32 {
        self.mint_calls.load(Ordering::SeqCst)
    }

    fn tokens(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        match self.tokens.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn push(&self, to: &str, uri: &str) -> u32 {
        let mut tokens = self.tokens();
        tokens.push((to.to_string(), uri.to_string()));
        tokens.len() as u32
    }
}

#[async_trait]
impl CollectionGateway for MockCollection {
    async fn mint_item(&self, to: &str, uri: &str) -> GatewayResult<u32> {
        self.mint_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.push(to, uri))
    }

    async fn airdrop_mint(&self, recipients: &[String], uri: &str) -> GatewayResult<Vec<u32>> {
        self.airdrop_calls.fetch_add(1, Ordering::SeqCst);
        if recipients.is_empty() {
            return revert(code::EMPTY_RECIPIENTS);
        }
        Ok(recipients.iter().map(|to| self.push(to, uri)).collect())
    }

    async fn token_uri(&self, token_id: u32) -> GatewayResult<String> {
        match self.tokens().get((token_id as usize).wrapping_sub(1)) {
            Some((_, uri)) => Ok(uri.clone()),
            None => revert(code::TOKEN_NOT_FOUND),
        }
    }

    async fn owner_of(&self, token_id: u32) -> GatewayResult<String> {
        match self.tokens().get((token_id as usize).wrapping_sub(1)) {
            Some((owner, _)) => Ok(owner.clone()),
            None => revert(code::TOKEN_NOT_FOUND),
        }
    }

    async fn balance_of(&self, owner: &str) -> GatewayResult<u32> {
        Ok(self.tokens().iter().filter(|(o, _)| o == owner).count() as u32)
    }

    async fn token_of_owner_by_index(&self, owner: &str, index: u32) -> GatewayResult<u32> {
        let tokens = self.tokens();
        match tokens
            .iter()
            .enumerate()
            .filter(|(_, (o, _))| o == owner)
            .nth(index as usize)
        {
            Some((position, _)) => Ok(position as u32 + 1),
            None => revert(code::INDEX_OUT_OF_BOUNDS),
        }
    }
}

/// Pinning service that hands out sequential fake CIDs
#[derive(Debug, Default)]
pub struct MockPinning {
    pins: Mutex<Vec<(String, String)>>,
    failures_left: AtomicU32,
}

impl MockPinning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` pin attempts with HTTP 503
    pub fn failing(count: u32) -> Self {
        Self {
            pins: Mutex::new(Vec::new()),
            failures_left: AtomicU32::new(count),
        }
    }

    /// Pinned `(label, content)` pairs in pin order
    pub fn pins(&self) -> Vec<(String, String)> {
        match self.pins.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, label: &str, content: String) -> Result<String, UploadError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(UploadError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        let mut pins = match self.pins.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pins.push((label.to_string(), content));
        Ok(format!("QmMock{}", pins.len()))
    }
}

#[async_trait]
impl PinningService for MockPinning {
    async fn pin_file(&self, file_name: &str, bytes: Vec<u8>, label: &str) -> Result<String, UploadError> {
        self.record(label, format!("{file_name}:{}", bytes.len()))
    }

    async fn pin_json(&self, document: &serde_json::Value, name: &str) -> Result<String, UploadError> {
        self.record(name, document.to_string())
    }
}

/// Serves canned documents by URL and records every request
#[derive(Debug, Default)]
pub struct MockFetcher {
    documents: HashMap<String, serde_json::Value>,
    requested: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn with(mut self, url: &str, document: serde_json::Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        match self.requested.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl MetadataFetcher for MockFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, UploadError> {
        match self.requested.lock() {
            Ok(mut guard) => guard.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
        self.documents.get(url).cloned().ok_or(UploadError::Status {
            status: 504,
            body: "gateway timeout".to_string(),
        })
    }
}
