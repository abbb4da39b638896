//! Off-chain client for the marketplace contracts
//!
//! - Blind-auction driver with durable secrets and phase watching
//! - Listing, offer and collection flows (bulk actions, stats, airdrop)
//! - IPFS upload pipeline, metadata resolution and image URL cache
//! - HTTP routes over the above

pub mod amount;
pub mod blind_auction;
pub mod clock;
pub mod commitment;
pub mod error;
pub mod gateway;
pub mod image_cache;
pub mod ipfs;
pub mod market;
pub mod resolver;
pub mod routes;
pub mod secrets;
pub mod watcher;

#[cfg(any(test, feature = "testutils"))]
pub mod mocks;

pub use amount::{format_amount, parse_amount, DEFAULT_DECIMALS};
pub use blind_auction::{BlindAuctionDriver, CommittedBid, FinalizeOutcome};
pub use clock::{Clock, MockClock, SystemClock};
pub use commitment::{derive_commitment, secret_hash};
pub use error::{ClientError, ClientResult, GatewayError, MarketErrorKind, UploadError};
pub use gateway::{
    Account, AuctionView, CollectionGateway, GatewayResult, ListingView, MarketplaceGateway,
    OfferView,
};
pub use image_cache::{
    global_cache, image_cache_from_env, image_cache_from_lookup, FileImageCache, ImageCache,
    MemoryImageCache,
};
pub use market::{
    airdrop, bulk_buy, bulk_cancel, bulk_list, collection_stats, offer_expiration, BulkReport,
    CollectionStats,
};
pub use resolver::{extract_ipfs_hash, rewrite_ipfs_uri, GatewayConfig, MetadataResolver};
pub use secrets::{FileSecretStore, MemorySecretStore, SecretStore};
pub use shared_utils::AuctionPhase;
pub use watcher::PhaseWatcher;
