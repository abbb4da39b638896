//! Integration Test Suite for the NFT marketplace
//!
//! Deploys the collection, the marketplace and a payment token into one
//! environment and drives them the way the off-chain client does.
//!
//! # Test Organization
//! - `harness`: Reusable test harness and helpers
//! - `e2e_tests`: Listing, offer, auction and airdrop journeys
//! - `commitment_tests`: Off-chain and on-chain sealed-bid agreement
//! - `error_tests`: Error code decoding across contracts and client

#![cfg(test)]

pub mod harness;
pub mod e2e_tests;
pub mod commitment_tests;
pub mod error_tests;

pub use harness::*;
