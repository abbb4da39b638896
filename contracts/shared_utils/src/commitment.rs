//! Sealed-bid commitment encoding
//!
//! A commitment is `keccak256(word(amount) || secret_hash || word(bidder))`,
//! three 32-byte words in that order (the ABI layout of
//! `(uint256, bytes32, address)`). Any change to the order or the width of a
//! word makes every outstanding commitment unrevealable, so off-chain
//! implementations must follow this layout exactly.

use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env};

/// Width of one encoded word
pub const WORD_LEN: u32 = 32;

/// Commitment helper functions
pub struct BidCommitment;

impl BidCommitment {
    /// Hash a plain-text secret: `keccak256(utf8(secret))`
    pub fn secret_hash(e: &Env, secret: &Bytes) -> BytesN<32> {
        e.crypto().keccak256(secret).into()
    }

    /// Encode an amount as a big-endian two's complement 256-bit word
    pub fn amount_word(amount: i128) -> [u8; 32] {
        let mut word = [0u8; 32];
        if amount < 0 {
            word[..16].fill(0xff);
        }
        word[16..].copy_from_slice(&amount.to_be_bytes());
        word
    }

    /// Encode an address as the 32-byte account key or contract hash
    ///
    /// Both address kinds end their XDR encoding with the 32 raw bytes that
    /// identify them, so the trailing word is taken.
    pub fn address_word(e: &Env, address: &Address) -> Bytes {
        let xdr = address.clone().to_xdr(e);
        let len = xdr.len();
        xdr.slice(len - WORD_LEN..len)
    }

    /// Build the 96-byte preimage of a commitment
    pub fn encode(e: &Env, amount: i128, secret_hash: &BytesN<32>, bidder: &Address) -> Bytes {
        let mut preimage = Bytes::from_array(e, &Self::amount_word(amount));
        preimage.append(&Bytes::from(secret_hash.clone()));
        preimage.append(&Self::address_word(e, bidder));
        preimage
    }

    /// Derive the commitment for `(amount, secret_hash, bidder)`
    pub fn derive(e: &Env, amount: i128, secret_hash: &BytesN<32>, bidder: &Address) -> BytesN<32> {
        let preimage = Self::encode(e, amount, secret_hash, bidder);
        e.crypto().keccak256(&preimage).into()
    }

    /// Check a reveal against a stored commitment
    pub fn matches(
        e: &Env,
        commitment: &BytesN<32>,
        amount: i128,
        secret_hash: &BytesN<32>,
        bidder: &Address,
    ) -> bool {
        Self::derive(e, amount, secret_hash, bidder) == *commitment
    }
}
