//! Error and Edge Case Tests
//!
//! Contract error discriminants are the shared numeric codes, so a failed
//! invocation decodes to the same kind on the client.

use crate::harness::{TestHarness, ONE};
use collectible_nft::ContractError;
use marketplace_client::MarketErrorKind;
use nft_marketplace::MarketplaceError;
use shared_utils::{code, message_for_code};
use soroban_sdk::{String, Vec};

const MARKETPLACE_ERRORS: [(MarketplaceError, u32); 33] = [
    (MarketplaceError::InvalidPrice, code::INVALID_PRICE),
    (MarketplaceError::InvalidAmount, code::INVALID_AMOUNT),
    (MarketplaceError::InvalidDuration, code::INVALID_DURATION),
    (MarketplaceError::InvalidExpiration, code::INVALID_EXPIRATION),
    (MarketplaceError::InvalidFee, code::INVALID_FEE),
    (MarketplaceError::NotSeller, code::NOT_SELLER),
    (MarketplaceError::NotTokenOwner, code::NOT_TOKEN_OWNER),
    (MarketplaceError::NotOfferMaker, code::NOT_OFFER_MAKER),
    (MarketplaceError::SelfTrade, code::SELF_TRADE),
    (MarketplaceError::NotApproved, code::NOT_APPROVED),
    (MarketplaceError::AlreadyInitialized, code::ALREADY_INITIALIZED),
    (MarketplaceError::NotInitialized, code::NOT_INITIALIZED),
    (MarketplaceError::ListingInactive, code::LISTING_INACTIVE),
    (MarketplaceError::ListingExists, code::LISTING_EXISTS),
    (MarketplaceError::ReentrancyDetected, code::REENTRANCY),
    (MarketplaceError::ListingPaused, code::LISTING_PAUSED),
    (MarketplaceError::ListingNotPaused, code::LISTING_NOT_PAUSED),
    (MarketplaceError::OfferInactive, code::OFFER_INACTIVE),
    (MarketplaceError::OfferExpired, code::OFFER_EXPIRED),
    (MarketplaceError::NotCommitPhase, code::NOT_COMMIT_PHASE),
    (MarketplaceError::NotRevealPhase, code::NOT_REVEAL_PHASE),
    (MarketplaceError::AuctionNotEnded, code::AUCTION_NOT_ENDED),
    (MarketplaceError::AuctionFinalized, code::AUCTION_FINALIZED),
    (MarketplaceError::AlreadyRevealed, code::ALREADY_REVEALED),
    (MarketplaceError::CommitmentMismatch, code::COMMITMENT_MISMATCH),
    (MarketplaceError::ListingNotFound, code::LISTING_NOT_FOUND),
    (MarketplaceError::OfferNotFound, code::OFFER_NOT_FOUND),
    (MarketplaceError::InsufficientPayment, code::INSUFFICIENT_PAYMENT),
    (MarketplaceError::BidTooLow, code::BID_TOO_LOW),
    (MarketplaceError::AuctionNotFound, code::AUCTION_NOT_FOUND),
    (MarketplaceError::CommitmentNotFound, code::COMMITMENT_NOT_FOUND),
    (MarketplaceError::TokenNotFound, code::TOKEN_NOT_FOUND),
    (MarketplaceError::NFTContractError, code::CONTRACT_CALL_FAILED),
];

/// Test: Every marketplace error uses its shared code and has a message
#[test]
fn test_marketplace_discriminants_follow_shared_codes() {
    for (error, expected) in MARKETPLACE_ERRORS {
        assert_eq!(error as u32, expected, "{error:?}");
        assert_ne!(message_for_code(expected), "Unknown error", "{error:?}");
        assert_eq!(MarketErrorKind::from_code(error as u32).code(), expected);
    }
}

/// Test: Collection errors share the same code space
#[test]
fn test_collection_discriminants_follow_shared_codes() {
    assert_eq!(ContractError::EmptyRecipients as u32, code::EMPTY_RECIPIENTS);
    assert_eq!(ContractError::NotOwner as u32, code::NOT_TOKEN_OWNER);
    assert_eq!(ContractError::NotApproved as u32, code::NOT_APPROVED);
    assert_eq!(ContractError::AlreadyInitialized as u32, code::ALREADY_INITIALIZED);
    assert_eq!(ContractError::NotInitialized as u32, code::NOT_INITIALIZED);
    assert_eq!(ContractError::NFTNotFound as u32, code::TOKEN_NOT_FOUND);
    assert_eq!(ContractError::IndexOutOfBounds as u32, code::INDEX_OUT_OF_BOUNDS);
}

/// Test: Listing without approving the marketplace fails
#[test]
fn test_list_without_approval_fails() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let token_id = harness
        .nft()
        .mint_item(seller, &String::from_str(&harness.env, "ipfs://QmRhino"));

    let result = harness
        .market()
        .try_list_nft(seller, &harness.contracts.nft, &token_id, &ONE);
    assert_eq!(result, Err(Ok(MarketplaceError::NotApproved)));
}

/// Test: Only the owner can list, and a token is listed at most once
#[test]
fn test_list_by_non_owner_and_double_listing_fail() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let token_id = harness.mint_for_sale(seller, "ipfs://QmZebra");

    assert_eq!(
        harness
            .market()
            .try_list_nft(&harness.accounts.buyer, &harness.contracts.nft, &token_id, &ONE),
        Err(Ok(MarketplaceError::NotTokenOwner))
    );

    harness
        .market()
        .list_nft(seller, &harness.contracts.nft, &token_id, &ONE);
    assert_eq!(
        harness
            .market()
            .try_list_nft(seller, &harness.contracts.nft, &token_id, &ONE),
        Err(Ok(MarketplaceError::ListingExists))
    );
    assert_eq!(
        harness
            .market()
            .try_create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &60, &60),
        Err(Ok(MarketplaceError::ListingExists))
    );
}

/// Test: Validation errors for prices, amounts, durations and expirations
#[test]
fn test_validation_errors() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let market = harness.market();
    let token_id = harness.mint_for_sale(seller, "ipfs://QmFish");

    assert_eq!(
        market.try_list_nft(seller, &harness.contracts.nft, &token_id, &0),
        Err(Ok(MarketplaceError::InvalidPrice))
    );
    assert_eq!(
        market.try_create_blind_auction(seller, &harness.contracts.nft, &token_id, &0, &60, &60),
        Err(Ok(MarketplaceError::InvalidAmount))
    );
    assert_eq!(
        market.try_create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &0, &60),
        Err(Ok(MarketplaceError::InvalidDuration))
    );

    let listing_id = market.list_nft(seller, &harness.contracts.nft, &token_id, &ONE);
    let now = harness.current_timestamp();
    assert_eq!(
        market.try_make_offer(buyer, &listing_id, &0, &(now + 60)),
        Err(Ok(MarketplaceError::InvalidAmount))
    );
    assert_eq!(
        market.try_make_offer(buyer, &listing_id, &ONE, &now),
        Err(Ok(MarketplaceError::InvalidExpiration))
    );
    assert_eq!(
        market.try_update_price(seller, &listing_id, &-1),
        Err(Ok(MarketplaceError::InvalidPrice))
    );
}

/// Test: Sellers cannot trade with themselves
#[test]
fn test_self_trade_rejected() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let market = harness.market();
    let listing_id = harness.list_new_token(seller, ONE);
    let expiration = harness.current_timestamp() + 60;

    assert_eq!(
        market.try_buy_nft(seller, &listing_id, &ONE),
        Err(Ok(MarketplaceError::SelfTrade))
    );
    assert_eq!(
        market.try_make_offer(seller, &listing_id, &ONE, &expiration),
        Err(Ok(MarketplaceError::SelfTrade))
    );
}

/// Test: Unknown ids surface as not-found errors
#[test]
fn test_unknown_ids_not_found() {
    let harness = TestHarness::new();
    let market = harness.market();
    let buyer = &harness.accounts.buyer;

    assert_eq!(
        market.try_buy_nft(buyer, &42, &ONE),
        Err(Ok(MarketplaceError::ListingNotFound))
    );
    assert_eq!(
        market.try_get_blind_auction(&42),
        Err(Ok(MarketplaceError::AuctionNotFound))
    );
    assert_eq!(
        market.try_get_commitment(&42, buyer),
        Err(Ok(MarketplaceError::CommitmentNotFound))
    );
    assert_eq!(
        harness.nft().try_owner_of(&42),
        Err(Ok(ContractError::NFTNotFound))
    );
}

/// Test: Airdropping to nobody is rejected
#[test]
fn test_empty_airdrop_rejected() {
    let harness = TestHarness::new();
    let result = harness.nft().try_airdrop_mint(
        &Vec::new(&harness.env),
        &String::from_str(&harness.env, "ipfs://QmAirdrop"),
    );
    assert_eq!(result, Err(Ok(ContractError::EmptyRecipients)));
    assert_eq!(
        MarketErrorKind::from_code(ContractError::EmptyRecipients as u32),
        MarketErrorKind::Other(code::EMPTY_RECIPIENTS)
    );
}

/// Test: Cancelled listings cannot be bought and can be relisted
#[test]
fn test_cancelled_listing_is_inactive_and_relistable() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let market = harness.market();
    let listing_id = harness.list_new_token(seller, ONE);
    let token_id = market.get_listing(&listing_id).token_id;

    market.cancel_listing(seller, &listing_id);
    assert_eq!(
        market.try_buy_nft(&harness.accounts.buyer, &listing_id, &ONE),
        Err(Ok(MarketplaceError::ListingInactive))
    );
    assert_eq!(
        market.try_cancel_listing(&harness.accounts.buyer, &listing_id),
        Err(Ok(MarketplaceError::NotSeller))
    );

    let relisted = market.list_nft(seller, &harness.contracts.nft, &token_id, &(2 * ONE));
    assert_ne!(relisted, listing_id);
}

/// Test: A listing left behind by a transfer outside the marketplace does not block the new owner
#[test]
fn test_stale_listing_released_for_new_owner() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let carol = &harness.accounts.bidder_b;
    let market = harness.market();
    let stale = harness.list_new_token(seller, ONE);
    let token_id = market.get_listing(&stale).token_id;

    harness.nft().transfer(seller, carol, &token_id);
    harness
        .nft()
        .set_approval_for_all(carol, &harness.contracts.marketplace, &true);
    assert_eq!(market.get_all_active_listings().len(), 0);

    let auction_id =
        market.create_blind_auction(carol, &harness.contracts.nft, &token_id, &ONE, &60, &60);
    assert!(!market.get_listing(&stale).active);
    assert_eq!(market.get_blind_auction(&auction_id).seller, *carol);
    assert_eq!(
        market.try_buy_nft(&harness.accounts.buyer, &stale, &ONE),
        Err(Ok(MarketplaceError::ListingInactive))
    );
}
