//! End-to-End Flow Tests
//!
//! These tests verify complete user journeys involving:
//! - The collection and the marketplace together
//! - Payment token escrow, refunds and fee splits
//! - Blind auctions sealed with the client's commitment derivation
//! - Client-side aggregation over on-chain listings

use crate::harness::{address_label, TestHarness, DEFAULT_USER_BALANCE, ONE, SECONDS_PER_DAY};
use marketplace_client::{collection_stats, AuctionPhase, ListingView, MarketErrorKind};
use nft_marketplace::MarketplaceError;
use soroban_sdk::{String, Vec};

/// Test: List -> buy, with the fee split between seller and fee recipient
#[test]
fn test_e2e_listing_sale_pays_seller_and_fee() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let price = 10 * ONE;

    // ========== PHASE 1: LIST ==========
    let token_id = harness.mint_for_sale(seller, "ipfs://QmZebra");
    let listing_id = harness
        .market()
        .list_nft(seller, &harness.contracts.nft, &token_id, &price);
    assert_eq!(listing_id, 1);
    assert_eq!(harness.market().get_all_active_listings().len(), 1);

    // The seller keeps custody while listed
    assert_eq!(harness.nft().owner_of(&token_id), *seller);

    // ========== PHASE 2: BUY ==========
    harness.market().buy_nft(buyer, &listing_id, &price);

    // ========== PHASE 3: VERIFY SETTLEMENT ==========
    let fee = harness.fee_on(price);
    assert_eq!(harness.nft().owner_of(&token_id), *buyer);
    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE - price);
    assert_eq!(harness.balance(seller), price - fee);
    assert_eq!(harness.balance(&harness.accounts.fee_recipient), fee);
    assert_eq!(harness.balance(&harness.contracts.marketplace), 0);

    let listing = harness.market().get_listing(&listing_id);
    assert!(!listing.active);
    assert_eq!(harness.market().get_all_active_listings().len(), 0);
}

/// Test: Underpaying is rejected, leaves state untouched, and decodes client-side
#[test]
fn test_e2e_underpayment_rejected_then_paid() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let listing_id = harness.list_new_token(seller, ONE);

    let result = harness.market().try_buy_nft(buyer, &listing_id, &(ONE / 10));
    assert_eq!(result, Err(Ok(MarketplaceError::InsufficientPayment)));

    let kind = MarketErrorKind::from_code(MarketplaceError::InsufficientPayment as u32);
    assert_eq!(kind, MarketErrorKind::InsufficientPayment);

    assert!(harness.market().get_listing(&listing_id).active);
    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE);

    // Overpaying only charges the price
    harness.market().buy_nft(buyer, &listing_id, &(2 * ONE));
    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE - ONE);
}

/// Test: Paused listings refuse buyers until resumed at the new price
#[test]
fn test_e2e_pause_reprice_resume() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let listing_id = harness.list_new_token(seller, 3 * ONE);

    harness.market().pause_listing(seller, &listing_id);
    assert_eq!(harness.market().get_all_active_listings().len(), 0);
    assert_eq!(
        harness.market().try_buy_nft(buyer, &listing_id, &(3 * ONE)),
        Err(Ok(MarketplaceError::ListingPaused))
    );

    harness.market().update_price(seller, &listing_id, &(2 * ONE));
    harness.market().resume_listing(seller, &listing_id);

    harness.market().buy_nft(buyer, &listing_id, &(2 * ONE));
    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE - 2 * ONE);
}

/// Test: Offers are escrowed; accepting one refunds the others
#[test]
fn test_e2e_offer_accept_refunds_competing_offers() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let rival = &harness.accounts.bidder_a;
    let listing_id = harness.list_new_token(seller, 10 * ONE);
    let token_id = harness.market().get_listing(&listing_id).token_id;

    // ========== PHASE 1: OFFERS ==========
    let expiration = harness.current_timestamp() + 7 * SECONDS_PER_DAY;
    let first = harness
        .market()
        .make_offer(buyer, &listing_id, &(8 * ONE), &expiration);
    let second = harness
        .market()
        .make_offer(rival, &listing_id, &(6 * ONE), &expiration);
    assert_eq!((first, second), (0, 1));

    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE - 8 * ONE);
    assert_eq!(harness.balance(rival), DEFAULT_USER_BALANCE - 6 * ONE);
    assert_eq!(harness.balance(&harness.contracts.marketplace), 14 * ONE);

    // ========== PHASE 2: ACCEPT ==========
    harness.market().accept_offer(seller, &listing_id, &first);

    // ========== PHASE 3: VERIFY ==========
    let fee = harness.fee_on(8 * ONE);
    assert_eq!(harness.nft().owner_of(&token_id), *buyer);
    assert_eq!(harness.balance(seller), 8 * ONE - fee);
    assert_eq!(harness.balance(rival), DEFAULT_USER_BALANCE);
    assert_eq!(harness.balance(&harness.contracts.marketplace), 0);

    let offers = harness.market().get_offers(&listing_id);
    assert!(offers.iter().all(|offer| !offer.active));
}

/// Test: An expired offer cannot be accepted but can still be withdrawn
#[test]
fn test_e2e_expired_offer_withdrawn() {
    let harness = TestHarness::new();
    let seller = &harness.accounts.seller;
    let buyer = &harness.accounts.buyer;
    let listing_id = harness.list_new_token(seller, 10 * ONE);

    let expiration = harness.current_timestamp() + SECONDS_PER_DAY;
    let index = harness
        .market()
        .make_offer(buyer, &listing_id, &(5 * ONE), &expiration);

    harness.advance_time(SECONDS_PER_DAY + 1);
    assert_eq!(
        harness.market().try_accept_offer(seller, &listing_id, &index),
        Err(Ok(MarketplaceError::OfferExpired))
    );

    harness.market().cancel_offer(buyer, &listing_id, &index);
    assert_eq!(harness.balance(buyer), DEFAULT_USER_BALANCE);
    assert!(harness.market().get_listing(&listing_id).active);
}

/// Test: Complete blind auction (create -> commit -> reveal -> finalize)
#[test]
fn test_e2e_blind_auction_lifecycle() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;
    let bidder_a = &harness.accounts.bidder_a;
    let bidder_b = &harness.accounts.bidder_b;
    let hour = 3600u64;

    // ========== PHASE 1: CREATE ==========
    let token_id = harness.mint_for_sale(seller, "ipfs://QmRhino");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &hour, &hour);
    assert_eq!(harness.nft().owner_of(&token_id), harness.contracts.marketplace);

    let auction = market.get_blind_auction(&auction_id);
    assert_eq!(auction.commit_end_time, harness.current_timestamp() + hour);
    assert_eq!(auction.reveal_end_time, auction.commit_end_time + hour);
    assert_eq!(market.get_blind_auction_phase(&auction_id), AuctionPhase::Commit);

    // ========== PHASE 2: COMMIT ==========
    market.commit_blind_bid(bidder_a, &auction_id, &harness.seal_bid(bidder_a, 5 * ONE, "alpha"));
    market.commit_blind_bid(bidder_b, &auction_id, &harness.seal_bid(bidder_b, 7 * ONE, "bravo"));

    // Nothing is escrowed while bids are sealed
    assert_eq!(harness.balance(bidder_a), DEFAULT_USER_BALANCE);
    assert_eq!(
        market.try_reveal_blind_bid(bidder_a, &auction_id, &(5 * ONE), &harness.reveal_hash("alpha")),
        Err(Ok(MarketplaceError::NotRevealPhase))
    );

    // ========== PHASE 3: REVEAL ==========
    harness.advance_time(hour);
    assert_eq!(market.get_blind_auction_phase(&auction_id), AuctionPhase::Reveal);
    assert_eq!(
        market.try_commit_blind_bid(bidder_a, &auction_id, &harness.seal_bid(bidder_a, 9 * ONE, "late")),
        Err(Ok(MarketplaceError::NotCommitPhase))
    );

    market.reveal_blind_bid(bidder_a, &auction_id, &(5 * ONE), &harness.reveal_hash("alpha"));
    assert_eq!(market.get_blind_auction(&auction_id).winner, Some(bidder_a.clone()));
    assert_eq!(harness.balance(bidder_a), DEFAULT_USER_BALANCE - 5 * ONE);

    market.reveal_blind_bid(bidder_b, &auction_id, &(7 * ONE), &harness.reveal_hash("bravo"));
    let auction = market.get_blind_auction(&auction_id);
    assert_eq!(auction.winner, Some(bidder_b.clone()));
    assert_eq!(auction.highest_bid, 7 * ONE);

    // The displaced leader is refunded at once
    assert_eq!(harness.balance(bidder_a), DEFAULT_USER_BALANCE);
    assert_eq!(
        market.try_finalize_blind_auction(&auction_id),
        Err(Ok(MarketplaceError::AuctionNotEnded))
    );

    // ========== PHASE 4: FINALIZE ==========
    harness.advance_time(hour);
    assert_eq!(
        market.get_blind_auction_phase(&auction_id),
        AuctionPhase::PendingSettlement
    );
    market.finalize_blind_auction(&auction_id);

    let fee = harness.fee_on(7 * ONE);
    assert_eq!(harness.nft().owner_of(&token_id), *bidder_b);
    assert_eq!(harness.balance(bidder_b), DEFAULT_USER_BALANCE - 7 * ONE);
    assert_eq!(harness.balance(seller), 7 * ONE - fee);
    assert_eq!(harness.balance(&harness.accounts.fee_recipient), fee);
    assert_eq!(market.get_blind_auction_phase(&auction_id), AuctionPhase::Finalized);
    assert_eq!(
        market.try_finalize_blind_auction(&auction_id),
        Err(Ok(MarketplaceError::AuctionFinalized))
    );
    assert_eq!(market.get_all_active_blind_auctions().len(), 0);
}

/// Test: An auction nobody reveals returns the token to its seller
#[test]
fn test_e2e_blind_auction_without_reveals_returns_token() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;
    let bidder = &harness.accounts.bidder_a;

    let token_id = harness.mint_for_sale(seller, "ipfs://QmFish");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &60, &60);
    market.commit_blind_bid(bidder, &auction_id, &harness.seal_bid(bidder, 2 * ONE, "never"));

    harness.advance_time(120);
    market.finalize_blind_auction(&auction_id);

    let auction = market.get_blind_auction(&auction_id);
    assert!(auction.finalized);
    assert_eq!(auction.winner, None);
    assert_eq!(harness.nft().owner_of(&token_id), *seller);
    assert_eq!(harness.balance(bidder), DEFAULT_USER_BALANCE);
    assert_eq!(harness.balance(seller), 0);
}

/// Test: Client and contract classify every boundary second identically
#[test]
fn test_e2e_phase_agrees_with_client_view() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;

    let token_id = harness.mint_for_sale(seller, "ipfs://QmFlamingo");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &100, &50);
    let auction = market.get_blind_auction(&auction_id);

    let start = harness.current_timestamp();
    for offset in [0u64, 99, 100, 101, 149, 150, 151] {
        harness.set_timestamp(start + offset);
        let on_chain = market.get_blind_auction_phase(&auction_id);
        let off_chain = AuctionPhase::at(
            start + offset,
            auction.commit_end_time,
            auction.reveal_end_time,
            auction.finalized,
        );
        assert_eq!(on_chain, off_chain, "offset {offset}");
    }
}

/// Test: Airdrop -> every recipient lists -> client-side collection stats
#[test]
fn test_e2e_airdrop_then_collection_stats() {
    let harness = TestHarness::new();
    let env = &harness.env;
    let nft = harness.nft();
    let recipients = [
        harness.accounts.buyer.clone(),
        harness.accounts.bidder_a.clone(),
        harness.accounts.bidder_b.clone(),
    ];

    // ========== PHASE 1: AIRDROP ==========
    let minted = nft.airdrop_mint(
        &Vec::from_slice(env, &recipients),
        &String::from_str(env, "ipfs://QmAirdrop"),
    );
    assert_eq!(minted.len(), 3);
    assert_eq!(nft.total_supply(), 3);

    // ========== PHASE 2: LIST ==========
    let prices = [3 * ONE, 5 * ONE, 4 * ONE];
    for ((owner, token_id), price) in recipients.iter().zip(minted.iter()).zip(prices) {
        assert_eq!(nft.owner_of(&token_id), *owner);
        nft.set_approval_for_all(owner, &harness.contracts.marketplace, &true);
        harness
            .market()
            .list_nft(owner, &harness.contracts.nft, &token_id, &price);
    }

    // ========== PHASE 3: STATS ==========
    let views: std::vec::Vec<ListingView> = harness
        .market()
        .get_all_active_listings()
        .iter()
        .map(|listing| harness.listing_view(&listing))
        .collect();
    let stats = collection_stats(&views);

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].contract, address_label(&harness.contracts.nft));
    assert_eq!(stats[0].count, 3);
    assert_eq!(stats[0].floor, 3 * ONE);
    assert_eq!(stats[0].ceiling, 5 * ONE);
    assert_eq!(stats[0].avg, 4 * ONE);
    assert_eq!(stats[0].seller_count, 3);
}
