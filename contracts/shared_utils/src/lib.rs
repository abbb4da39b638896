#![no_std]

//! Shared utility library for the marketplace contracts
//!
//! This library provides common functions, helpers, and patterns used by
//! the collection and marketplace contracts (and by off-chain code that must
//! agree with them byte for byte):
//! - Blind-auction phase classification
//! - Sealed-bid commitment encoding
//! - Math utilities (safe math, basis-point fees)
//! - Time utilities (timestamps, durations, expiry)
//! - Validation utilities
//! - Storage and access control helpers
//! - Error codes and event emission patterns

pub mod access_control;
pub mod commitment;
pub mod error_codes;
pub mod errors;
pub mod events;
pub mod math;
pub mod phase;
pub mod storage;
pub mod time;
pub mod validation;


// Re-export commonly used items
pub use access_control::*;
pub use commitment::BidCommitment;
pub use error_codes::*;
pub use errors::*;
pub use events::*;
pub use math::*;
pub use phase::AuctionPhase;
pub use storage::Storage;
pub use time::*;
pub use validation::*;
