//! Standardized error codes and messages for the marketplace contracts.
//!
//! Error code ranges (for documentation and off-chain decoding):
//! - Validation: 1-99 (invalid input, out of range)
//! - Authorization: 100-199 (wrong caller, missing approval)
//! - State: 200-299 (wrong phase, already processed)
//! - Resource: 300-399 (not found, insufficient funds)
//! - System: 400-499 (storage failures, contract failures)
//!
//! Contract error enums use these numbers as their discriminants so that a
//! client can decode a failed invocation into a structured kind instead of
//! matching on message text.

/// Error category boundaries for documentation and indexing.
pub mod category {
    pub const VALIDATION_START: u32 = 1;
    pub const VALIDATION_END: u32 = 99;
    pub const AUTH_START: u32 = 100;
    pub const AUTH_END: u32 = 199;
    pub const STATE_START: u32 = 200;
    pub const STATE_END: u32 = 299;
    pub const RESOURCE_START: u32 = 300;
    pub const RESOURCE_END: u32 = 399;
    pub const SYSTEM_START: u32 = 400;
    pub const SYSTEM_END: u32 = 499;
}

/// Standard error code constants (numeric only; contracts use their own contracterror enums).
pub mod code {
    // Validation (1-99)
    pub const INVALID_PRICE: u32 = 1;
    pub const INVALID_AMOUNT: u32 = 2;
    pub const INVALID_DURATION: u32 = 3;
    pub const INVALID_EXPIRATION: u32 = 4;
    pub const INVALID_FEE: u32 = 5;
    pub const EMPTY_RECIPIENTS: u32 = 6;

    // Authorization (100-199)
    pub const UNAUTHORIZED: u32 = 100;
    pub const NOT_SELLER: u32 = 101;
    pub const NOT_ADMIN: u32 = 102;
    pub const NOT_TOKEN_OWNER: u32 = 103;
    pub const NOT_OFFER_MAKER: u32 = 104;
    pub const SELF_TRADE: u32 = 105;
    pub const NOT_APPROVED: u32 = 106;

    // State (200-299)
    pub const ALREADY_INITIALIZED: u32 = 200;
    pub const NOT_INITIALIZED: u32 = 201;
    pub const LISTING_INACTIVE: u32 = 202;
    pub const LISTING_EXISTS: u32 = 203;
    pub const REENTRANCY: u32 = 204;
    pub const LISTING_PAUSED: u32 = 205;
    pub const LISTING_NOT_PAUSED: u32 = 206;
    pub const OFFER_INACTIVE: u32 = 207;
    pub const OFFER_EXPIRED: u32 = 208;
    pub const NOT_COMMIT_PHASE: u32 = 209;
    pub const NOT_REVEAL_PHASE: u32 = 210;
    pub const AUCTION_NOT_ENDED: u32 = 211;
    pub const AUCTION_FINALIZED: u32 = 212;
    pub const ALREADY_REVEALED: u32 = 213;
    pub const COMMITMENT_MISMATCH: u32 = 214;

    // Resource (300-399)
    pub const LISTING_NOT_FOUND: u32 = 300;
    pub const OFFER_NOT_FOUND: u32 = 301;
    pub const INSUFFICIENT_PAYMENT: u32 = 302;
    pub const BID_TOO_LOW: u32 = 303;
    pub const AUCTION_NOT_FOUND: u32 = 304;
    pub const COMMITMENT_NOT_FOUND: u32 = 305;
    pub const TOKEN_NOT_FOUND: u32 = 306;
    pub const INDEX_OUT_OF_BOUNDS: u32 = 307;

    // System (400-499)
    pub const STORAGE_ERROR: u32 = 400;
    pub const CONTRACT_CALL_FAILED: u32 = 401;
}

/// Returns a human-readable message for a given error code (for events/logging).
pub fn message_for_code(code: u32) -> &'static str {
    match code {
        1 => "Invalid price: must be greater than zero",
        2 => "Invalid amount: must be greater than zero",
        3 => "Invalid duration: must be greater than zero",
        4 => "Invalid expiration: must be in the future",
        5 => "Invalid fee: must not exceed 10000 basis points",
        6 => "At least one recipient is required",
        100 => "Unauthorized: caller not allowed",
        101 => "Caller is not the seller",
        102 => "Caller is not the admin",
        103 => "Caller does not own the token",
        104 => "Caller did not make this offer",
        105 => "Sellers cannot trade with themselves",
        106 => "Marketplace is not approved for this token",
        200 => "Contract already initialized",
        201 => "Contract not initialized",
        202 => "Listing is no longer active",
        203 => "Token is already listed",
        204 => "Reentrancy detected",
        205 => "Listing is paused",
        206 => "Listing is not paused",
        207 => "Offer is no longer active",
        208 => "Offer has expired",
        209 => "Commit phase is over",
        210 => "Auction is not in its reveal phase",
        211 => "Auction reveal phase has not ended",
        212 => "Auction already finalized",
        213 => "Bid already revealed",
        214 => "Revealed bid does not match the commitment",
        300 => "Listing not found",
        301 => "Offer not found",
        302 => "Insufficient payment",
        303 => "Bid below the minimum",
        304 => "Auction not found",
        305 => "No commitment found for this bidder",
        306 => "Token not found",
        307 => "Owner index out of bounds",
        400 => "Storage operation failed",
        401 => "Cross-contract call failed",
        _ => "Unknown error",
    }
}
