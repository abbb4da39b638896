use crate::{BlindAuction, DataKey, Listing, MarketplaceError, Offer, SealedBid};
use soroban_sdk::{Address, Env, Vec};

// --- Configuration ---

pub fn payment_token(e: &Env) -> Result<Address, MarketplaceError> {
    e.storage()
        .instance()
        .get(&DataKey::PaymentToken)
        .ok_or(MarketplaceError::NotInitialized)
}

pub fn fee_recipient(e: &Env) -> Result<Address, MarketplaceError> {
    e.storage()
        .instance()
        .get(&DataKey::FeeRecipient)
        .ok_or(MarketplaceError::NotInitialized)
}

pub fn fee_bps(e: &Env) -> u32 {
    e.storage()
        .instance()
        .get(&DataKey::MarketplaceFee)
        .unwrap_or(0)
}

pub fn set_fee_bps(e: &Env, fee_bps: u32) {
    e.storage().instance().set(&DataKey::MarketplaceFee, &fee_bps);
}

// --- Counters ---

fn next_id(e: &Env, key: &DataKey) -> u64 {
    let id: u64 = e.storage().instance().get(key).unwrap_or(0) + 1;
    e.storage().instance().set(key, &id);
    id
}

pub fn next_listing_id(e: &Env) -> u64 {
    next_id(e, &DataKey::ListingCounter)
}

pub fn listing_count(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get(&DataKey::ListingCounter)
        .unwrap_or(0)
}

pub fn next_auction_id(e: &Env) -> u64 {
    next_id(e, &DataKey::AuctionCounter)
}

pub fn auction_count(e: &Env) -> u64 {
    e.storage()
        .instance()
        .get(&DataKey::AuctionCounter)
        .unwrap_or(0)
}

// --- Listings ---

pub fn get_listing(e: &Env, listing_id: u64) -> Result<Listing, MarketplaceError> {
    e.storage()
        .persistent()
        .get(&DataKey::Listing(listing_id))
        .ok_or(MarketplaceError::ListingNotFound)
}

pub fn set_listing(e: &Env, listing: &Listing) {
    e.storage()
        .persistent()
        .set(&DataKey::Listing(listing.listing_id), listing);
}

pub fn token_listing(e: &Env, nft_contract: &Address, token_id: u32) -> Option<u64> {
    e.storage()
        .persistent()
        .get(&DataKey::TokenListing(nft_contract.clone(), token_id))
}

pub fn set_token_listing(e: &Env, nft_contract: &Address, token_id: u32, listing_id: u64) {
    e.storage().persistent().set(
        &DataKey::TokenListing(nft_contract.clone(), token_id),
        &listing_id,
    );
}

pub fn clear_token_listing(e: &Env, nft_contract: &Address, token_id: u32) {
    e.storage()
        .persistent()
        .remove(&DataKey::TokenListing(nft_contract.clone(), token_id));
}

// --- Offers ---

pub fn get_offers(e: &Env, listing_id: u64) -> Vec<Offer> {
    e.storage()
        .persistent()
        .get(&DataKey::Offers(listing_id))
        .unwrap_or(Vec::new(e))
}

pub fn set_offers(e: &Env, listing_id: u64, offers: &Vec<Offer>) {
    e.storage()
        .persistent()
        .set(&DataKey::Offers(listing_id), offers);
}

// --- Blind auctions ---

pub fn get_auction(e: &Env, auction_id: u64) -> Result<BlindAuction, MarketplaceError> {
    e.storage()
        .persistent()
        .get(&DataKey::BlindAuction(auction_id))
        .ok_or(MarketplaceError::AuctionNotFound)
}

pub fn set_auction(e: &Env, auction: &BlindAuction) {
    e.storage()
        .persistent()
        .set(&DataKey::BlindAuction(auction.auction_id), auction);
}

pub fn get_sealed_bid(e: &Env, auction_id: u64, bidder: &Address) -> Option<SealedBid> {
    e.storage()
        .persistent()
        .get(&DataKey::SealedBid(auction_id, bidder.clone()))
}

pub fn set_sealed_bid(e: &Env, auction_id: u64, bidder: &Address, bid: &SealedBid) {
    e.storage()
        .persistent()
        .set(&DataKey::SealedBid(auction_id, bidder.clone()), bid);
}
