//! Client error taxonomy.
//!
//! Contract failures arrive as numeric codes (see `shared_utils::error_codes`)
//! and are decoded into [`MarketErrorKind`]; nothing is matched on message text.

use shared_utils::{code, message_for_code};
use thiserror::Error;

/// Failure reported by a [`crate::MarketplaceGateway`] or [`crate::CollectionGateway`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The contract rejected the invocation with this error code
    #[error("contract error #{0}")]
    Reverted(u32),
    /// The call never reached a verdict (network, signing, simulation)
    #[error("transport error: {0}")]
    Transport(String),
}

/// Structured contract failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketErrorKind {
    InvalidPrice,
    InvalidAmount,
    InvalidDuration,
    InvalidExpiration,
    NotSeller,
    NotTokenOwner,
    NotApproved,
    SelfTrade,
    ListingInactive,
    ListingExists,
    ListingPaused,
    OfferInactive,
    OfferExpired,
    NotCommitPhase,
    NotRevealPhase,
    AuctionNotEnded,
    AuctionFinalized,
    AlreadyRevealed,
    CommitmentMismatch,
    ListingNotFound,
    OfferNotFound,
    InsufficientPayment,
    BidTooLow,
    AuctionNotFound,
    CommitmentNotFound,
    /// Any code without a dedicated kind
    Other(u32),
}

impl MarketErrorKind {
    pub fn from_code(value: u32) -> Self {
        match value {
            code::INVALID_PRICE => Self::InvalidPrice,
            code::INVALID_AMOUNT => Self::InvalidAmount,
            code::INVALID_DURATION => Self::InvalidDuration,
            code::INVALID_EXPIRATION => Self::InvalidExpiration,
            code::NOT_SELLER => Self::NotSeller,
            code::NOT_TOKEN_OWNER => Self::NotTokenOwner,
            code::NOT_APPROVED => Self::NotApproved,
            code::SELF_TRADE => Self::SelfTrade,
            code::LISTING_INACTIVE => Self::ListingInactive,
            code::LISTING_EXISTS => Self::ListingExists,
            code::LISTING_PAUSED => Self::ListingPaused,
            code::OFFER_INACTIVE => Self::OfferInactive,
            code::OFFER_EXPIRED => Self::OfferExpired,
            code::NOT_COMMIT_PHASE => Self::NotCommitPhase,
            code::NOT_REVEAL_PHASE => Self::NotRevealPhase,
            code::AUCTION_NOT_ENDED => Self::AuctionNotEnded,
            code::AUCTION_FINALIZED => Self::AuctionFinalized,
            code::ALREADY_REVEALED => Self::AlreadyRevealed,
            code::COMMITMENT_MISMATCH => Self::CommitmentMismatch,
            code::LISTING_NOT_FOUND => Self::ListingNotFound,
            code::OFFER_NOT_FOUND => Self::OfferNotFound,
            code::INSUFFICIENT_PAYMENT => Self::InsufficientPayment,
            code::BID_TOO_LOW => Self::BidTooLow,
            code::AUCTION_NOT_FOUND => Self::AuctionNotFound,
            code::COMMITMENT_NOT_FOUND => Self::CommitmentNotFound,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidPrice => code::INVALID_PRICE,
            Self::InvalidAmount => code::INVALID_AMOUNT,
            Self::InvalidDuration => code::INVALID_DURATION,
            Self::InvalidExpiration => code::INVALID_EXPIRATION,
            Self::NotSeller => code::NOT_SELLER,
            Self::NotTokenOwner => code::NOT_TOKEN_OWNER,
            Self::NotApproved => code::NOT_APPROVED,
            Self::SelfTrade => code::SELF_TRADE,
            Self::ListingInactive => code::LISTING_INACTIVE,
            Self::ListingExists => code::LISTING_EXISTS,
            Self::ListingPaused => code::LISTING_PAUSED,
            Self::OfferInactive => code::OFFER_INACTIVE,
            Self::OfferExpired => code::OFFER_EXPIRED,
            Self::NotCommitPhase => code::NOT_COMMIT_PHASE,
            Self::NotRevealPhase => code::NOT_REVEAL_PHASE,
            Self::AuctionNotEnded => code::AUCTION_NOT_ENDED,
            Self::AuctionFinalized => code::AUCTION_FINALIZED,
            Self::AlreadyRevealed => code::ALREADY_REVEALED,
            Self::CommitmentMismatch => code::COMMITMENT_MISMATCH,
            Self::ListingNotFound => code::LISTING_NOT_FOUND,
            Self::OfferNotFound => code::OFFER_NOT_FOUND,
            Self::InsufficientPayment => code::INSUFFICIENT_PAYMENT,
            Self::BidTooLow => code::BID_TOO_LOW,
            Self::AuctionNotFound => code::AUCTION_NOT_FOUND,
            Self::CommitmentNotFound => code::COMMITMENT_NOT_FOUND,
            Self::Other(value) => *value,
        }
    }
}

impl std::fmt::Display for MarketErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {}", self.code(), message_for_code(self.code()))
    }
}

/// Errors raised by the IPFS pipeline
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("pinning service is not configured: {0}")]
    NotConfigured(String),
    #[error("invalid roster: {0}")]
    InvalidRoster(String),
    #[error("image file \"{wanted}\" not found; available files: {available}")]
    ImageNotFound { wanted: String, available: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("pinning service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upload task failed: {0}")]
    Task(String),
    #[error("upload failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Top-level client error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),
    /// The contract rejected the call
    #[error("contract rejected the call: {0}")]
    Contract(MarketErrorKind),
    #[error("transport error: {0}")]
    Transport(String),
    /// Durable client state could not be read or written
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// The contract failure kind, if this is one
    pub fn kind(&self) -> Option<MarketErrorKind> {
        match self {
            Self::Contract(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Text suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Contract(MarketErrorKind::InsufficientPayment) => {
                "Insufficient payment: the amount sent is below the listing price".to_string()
            }
            Self::Contract(MarketErrorKind::CommitmentMismatch) => {
                "The amount or secret does not match your sealed bid".to_string()
            }
            Self::Contract(kind) => message_for_code(kind.code()).to_string(),
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for ClientError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Reverted(value) => Self::Contract(MarketErrorKind::from_code(value)),
            GatewayError::Transport(message) => Self::Transport(message),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
