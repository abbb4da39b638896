//! Integration Test Harness
//!
//! This module provides a reusable test harness that:
//! - Boots a Soroban Env
//! - Deploys the payment token, the collection and the marketplace
//! - Creates test accounts (admin/seller/buyer/bidders)
//! - Seeds token balances
//! - Provides typed contract clients
//! - Supports deterministic time advancement

use soroban_sdk::{
    testutils::{Address as _, Ledger, LedgerInfo},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Bytes, BytesN, Env, String,
};

use collectible_nft::{CollectibleNFTContract, CollectibleNFTContractClient};
use nft_marketplace::{Listing, NftMarketplace, NftMarketplaceClient};
use shared_utils::BidCommitment;

/// One whole payment token (7 decimals)
pub const ONE: i128 = 10_000_000;

/// Marketplace fee used by every harness (2.5%)
pub const FEE_BPS: u32 = 250;

/// Default user initial balance
pub const DEFAULT_USER_BALANCE: i128 = 1_000 * ONE;

/// Ledger time the harness starts at (Jan 1, 2024 00:00:00 UTC)
pub const GENESIS_TIMESTAMP: u64 = 1704067200;

/// One day in seconds
pub const SECONDS_PER_DAY: u64 = 86400;

/// Test accounts container
pub struct TestAccounts {
    pub admin: Address,
    pub seller: Address,
    pub buyer: Address,
    pub bidder_a: Address,
    pub bidder_b: Address,
    pub fee_recipient: Address,
}

impl TestAccounts {
    /// Create new test accounts
    pub fn new(e: &Env) -> Self {
        Self {
            admin: Address::generate(e),
            seller: Address::generate(e),
            buyer: Address::generate(e),
            bidder_a: Address::generate(e),
            bidder_b: Address::generate(e),
            fee_recipient: Address::generate(e),
        }
    }
}

/// Deployed contract addresses
pub struct DeployedContracts {
    pub token: Address,
    pub nft: Address,
    pub marketplace: Address,
}

/// Main test harness structure
pub struct TestHarness {
    pub env: Env,
    pub accounts: TestAccounts,
    pub contracts: DeployedContracts,
}

impl TestHarness {
    /// Create a new test harness with all contracts deployed and initialized
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();

        env.ledger().set(LedgerInfo {
            timestamp: GENESIS_TIMESTAMP,
            protocol_version: 21,
            sequence_number: 1,
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 1000,
            min_persistent_entry_ttl: 1000,
            max_entry_ttl: 10000,
        });

        let accounts = TestAccounts::new(&env);

        // Payment token (Stellar Asset Contract)
        let token_admin = Address::generate(&env);
        let token = env.register_stellar_asset_contract_v2(token_admin);
        let token_address = token.address();

        let nft = env.register_contract(None, CollectibleNFTContract);
        let marketplace = env.register_contract(None, NftMarketplace);

        CollectibleNFTContractClient::new(&env, &nft).initialize(&accounts.admin);
        NftMarketplaceClient::new(&env, &marketplace).initialize(
            &accounts.admin,
            &token_address,
            &FEE_BPS,
            &accounts.fee_recipient,
        );

        let token_client = StellarAssetClient::new(&env, &token_address);
        for user in [&accounts.buyer, &accounts.bidder_a, &accounts.bidder_b] {
            token_client.mint(user, &DEFAULT_USER_BALANCE);
        }

        let contracts = DeployedContracts {
            token: token_address,
            nft,
            marketplace,
        };

        Self {
            env,
            accounts,
            contracts,
        }
    }

    // ========================================================================
    // Time Management Helpers
    // ========================================================================

    /// Advance time by a specified number of seconds
    pub fn advance_time(&self, seconds: u64) {
        let mut ledger = self.env.ledger().get();
        ledger.timestamp += seconds;
        ledger.sequence_number += 1;
        self.env.ledger().set(ledger);
    }

    /// Set timestamp to a specific value
    pub fn set_timestamp(&self, timestamp: u64) {
        let mut ledger = self.env.ledger().get();
        ledger.timestamp = timestamp;
        self.env.ledger().set(ledger);
    }

    /// Get current timestamp
    pub fn current_timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    // ========================================================================
    // Contract Clients
    // ========================================================================

    pub fn market(&self) -> NftMarketplaceClient<'_> {
        NftMarketplaceClient::new(&self.env, &self.contracts.marketplace)
    }

    pub fn nft(&self) -> CollectibleNFTContractClient<'_> {
        CollectibleNFTContractClient::new(&self.env, &self.contracts.nft)
    }

    /// Get token client
    pub fn token_client(&self) -> TokenClient<'_> {
        TokenClient::new(&self.env, &self.contracts.token)
    }

    /// Check user balance
    pub fn balance(&self, user: &Address) -> i128 {
        self.token_client().balance(user)
    }

    // ========================================================================
    // Marketplace Helpers
    // ========================================================================

    /// Mint a token to `owner` and approve the marketplace as operator
    pub fn mint_for_sale(&self, owner: &Address, uri: &str) -> u32 {
        let nft = self.nft();
        let token_id = nft.mint_item(owner, &String::from_str(&self.env, uri));
        nft.set_approval_for_all(owner, &self.contracts.marketplace, &true);
        token_id
    }

    /// Mint, approve and list in one step; returns the listing id
    pub fn list_new_token(&self, seller: &Address, price: i128) -> u64 {
        let token_id = self.mint_for_sale(seller, "ipfs://QmListing");
        self.market()
            .list_nft(seller, &self.contracts.nft, &token_id, &price)
    }

    /// Fee the marketplace keeps from a sale at `price`
    pub fn fee_on(&self, price: i128) -> i128 {
        price * FEE_BPS as i128 / 10_000
    }

    /// Listings as the off-chain client sees them
    pub fn listing_view(&self, listing: &Listing) -> marketplace_client::ListingView {
        marketplace_client::ListingView {
            listing_id: listing.listing_id,
            nft_contract: address_label(&listing.nft_contract),
            token_id: listing.token_id,
            seller: address_label(&listing.seller),
            price: listing.price,
            active: listing.active,
            paused: listing.paused,
            listed_at: listing.listed_at,
        }
    }

    // ========================================================================
    // Sealed Bid Helpers
    // ========================================================================

    /// The 32-byte key a bidder's commitments are bound to
    pub fn bidder_key(&self, bidder: &Address) -> [u8; 32] {
        let word = BidCommitment::address_word(&self.env, bidder);
        let mut key = [0u8; 32];
        word.copy_into_slice(&mut key);
        key
    }

    /// Seal a bid the way the client does, ready to submit on-chain
    pub fn seal_bid(&self, bidder: &Address, amount: i128, secret: &str) -> BytesN<32> {
        let secret_hash = marketplace_client::secret_hash(secret);
        let commitment =
            marketplace_client::derive_commitment(amount, &secret_hash, &self.bidder_key(bidder));
        BytesN::from_array(&self.env, &commitment)
    }

    /// Secret hash as submitted with a reveal
    pub fn reveal_hash(&self, secret: &str) -> BytesN<32> {
        BytesN::from_array(&self.env, &marketplace_client::secret_hash(secret))
    }

    /// On-chain hash of a plain-text secret
    pub fn contract_secret_hash(&self, secret: &str) -> BytesN<32> {
        BidCommitment::secret_hash(&self.env, &Bytes::from_slice(&self.env, secret.as_bytes()))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable text label for an address in client-side views
pub fn address_label(address: &Address) -> std::string::String {
    format!("{:?}", address)
}
