//! Sealed-bid agreement between the client and the contracts
//!
//! A commitment built off-chain must open on-chain with the same amount and
//! secret, and with nothing else.

use crate::harness::{TestHarness, DEFAULT_USER_BALANCE, ONE};
use marketplace_client::{
    derive_commitment, secret_hash, Account, ClientError, GatewayError, MarketErrorKind,
};
use nft_marketplace::MarketplaceError;
use shared_utils::BidCommitment;
use soroban_sdk::{testutils::Address as _, Address, BytesN, String};

/// Test: Client and contract derive identical commitments for account and contract bidders
#[test]
fn test_client_commitment_matches_contract_derivation() {
    let harness = TestHarness::new();
    let env = &harness.env;
    let bidders = [
        harness.accounts.bidder_a.clone(),
        Address::generate(env),
        harness.contracts.marketplace.clone(),
    ];

    for bidder in bidders.iter() {
        for (amount, secret) in [(1i128, "a"), (ONE, "hunter2"), (i64::MAX as i128 * 3, "long secret text")] {
            let hash = secret_hash(secret);
            let off_chain = derive_commitment(amount, &hash, &harness.bidder_key(bidder));
            let on_chain =
                BidCommitment::derive(env, amount, &BytesN::from_array(env, &hash), bidder);
            assert_eq!(off_chain, on_chain.to_array(), "amount {amount}, secret {secret}");
        }
    }
}

/// Test: Keys decoded from strkey text are the ones the contract commits to
#[test]
fn test_strkey_account_key_matches_contract_binding() {
    let harness = TestHarness::new();
    let env = &harness.env;
    let strkeys = [
        "GAAQEAYEAUDAOCAJBIFQYDIOB4IBCEQTCQKRMFYYDENBWHA5DYPSABOV",
        "CAAACAQDAQCQMBYIBEFAWDANBYHRAEISCMKBKFQXDAMRUGY4DUPB6N4O",
    ];

    for strkey in strkeys {
        let address = Address::from_string(&String::from_str(env, strkey));
        let account = Account::from_strkey(strkey).unwrap();
        assert_eq!(account.key, harness.bidder_key(&address), "{strkey}");

        let hash = secret_hash("hunter2");
        let on_chain = BidCommitment::derive(env, ONE, &BytesN::from_array(env, &hash), &address);
        assert_eq!(derive_commitment(ONE, &hash, &account.key), on_chain.to_array());
    }
}

/// Test: Secret hashing agrees on both sides
#[test]
fn test_secret_hash_matches_contract() {
    let harness = TestHarness::new();
    for secret in ["abc", "hunter2", "pässwörd"] {
        assert_eq!(harness.contract_secret_hash(secret).to_array(), secret_hash(secret));
    }
}

/// Test: Distinct bidders never share a commitment for the same bid
#[test]
fn test_commitment_binds_bidder() {
    let harness = TestHarness::new();
    let a = harness.seal_bid(&harness.accounts.bidder_a, ONE, "shared");
    let b = harness.seal_bid(&harness.accounts.bidder_b, ONE, "shared");
    assert_ne!(a, b);
}

/// Test: A wrong amount is refused on-chain, the honest reveal then succeeds
#[test]
fn test_wrong_amount_reveal_rejected_then_honest_reveal_accepted() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;
    let bidder = &harness.accounts.bidder_a;

    let token_id = harness.mint_for_sale(seller, "ipfs://QmBuffalo");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &60, &60);
    market.commit_blind_bid(bidder, &auction_id, &harness.seal_bid(bidder, ONE, "hunter2"));
    harness.advance_time(60);

    let hash = harness.reveal_hash("hunter2");
    let result = market.try_reveal_blind_bid(bidder, &auction_id, &(ONE - 1), &hash);
    assert_eq!(result, Err(Ok(MarketplaceError::CommitmentMismatch)));

    let err: ClientError = GatewayError::Reverted(MarketplaceError::CommitmentMismatch as u32).into();
    assert_eq!(err.kind(), Some(MarketErrorKind::CommitmentMismatch));

    // Wrong secret, right amount
    let result = market.try_reveal_blind_bid(bidder, &auction_id, &ONE, &harness.reveal_hash("hunter3"));
    assert_eq!(result, Err(Ok(MarketplaceError::CommitmentMismatch)));

    market.reveal_blind_bid(bidder, &auction_id, &ONE, &hash);
    assert!(market.get_commitment(&auction_id, bidder).revealed);
    assert_eq!(harness.balance(bidder), DEFAULT_USER_BALANCE - ONE);
    assert_eq!(
        market.try_reveal_blind_bid(bidder, &auction_id, &ONE, &hash),
        Err(Ok(MarketplaceError::AlreadyRevealed))
    );
}

/// Test: Recommitting replaces the sealed bid; only the latest opens
#[test]
fn test_recommit_replaces_previous_commitment() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;
    let bidder = &harness.accounts.bidder_b;

    let token_id = harness.mint_for_sale(seller, "ipfs://QmGodzilla");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &ONE, &60, &60);
    market.commit_blind_bid(bidder, &auction_id, &harness.seal_bid(bidder, 2 * ONE, "first"));
    market.commit_blind_bid(bidder, &auction_id, &harness.seal_bid(bidder, 3 * ONE, "second"));
    assert_eq!(
        market.get_commitment(&auction_id, bidder).commitment,
        harness.seal_bid(bidder, 3 * ONE, "second")
    );
    harness.advance_time(60);

    assert_eq!(
        market.try_reveal_blind_bid(bidder, &auction_id, &(2 * ONE), &harness.reveal_hash("first")),
        Err(Ok(MarketplaceError::CommitmentMismatch))
    );
    market.reveal_blind_bid(bidder, &auction_id, &(3 * ONE), &harness.reveal_hash("second"));
    assert_eq!(market.get_blind_auction(&auction_id).highest_bid, 3 * ONE);
}

/// Test: A matching reveal under the minimum is refused after the commitment check
#[test]
fn test_reveal_below_minimum_rejected() {
    let harness = TestHarness::new();
    let market = harness.market();
    let seller = &harness.accounts.seller;
    let bidder = &harness.accounts.bidder_a;

    let token_id = harness.mint_for_sale(seller, "ipfs://QmZebra");
    let auction_id =
        market.create_blind_auction(seller, &harness.contracts.nft, &token_id, &(5 * ONE), &60, &60);
    market.commit_blind_bid(bidder, &auction_id, &harness.seal_bid(bidder, ONE, "cheap"));
    harness.advance_time(60);

    assert_eq!(
        market.try_reveal_blind_bid(bidder, &auction_id, &ONE, &harness.reveal_hash("cheap")),
        Err(Ok(MarketplaceError::BidTooLow))
    );
    assert_eq!(harness.balance(bidder), DEFAULT_USER_BALANCE);
}
