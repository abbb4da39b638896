//! Off-chain sealed-bid commitment derivation.
//!
//! Mirrors `shared_utils::BidCommitment` byte for byte:
//! `keccak256(word(amount) || keccak256(secret) || word(bidder))`.

use sha3::{Digest, Keccak256};
use shared_utils::BidCommitment;

/// `keccak256(utf8(secret))`
pub fn secret_hash(secret: &str) -> [u8; 32] {
    Keccak256::digest(secret.as_bytes()).into()
}

/// Big-endian two's complement 256-bit word of an amount
pub fn amount_word(amount: i128) -> [u8; 32] {
    BidCommitment::amount_word(amount)
}

/// Commitment for `(amount, secret_hash, bidder_key)`
///
/// `bidder_key` is the 32-byte account key (or contract hash) of the bidder.
pub fn derive_commitment(amount: i128, secret_hash: &[u8; 32], bidder_key: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(amount_word(amount));
    hasher.update(secret_hash);
    hasher.update(bidder_key);
    hasher.finalize().into()
}
