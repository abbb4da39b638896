//! Cross-contract interface of the NFT collections the marketplace trades.

use soroban_sdk::{contractclient, Address, Env};

/// The subset of the collection contract the marketplace relies on
#[contractclient(name = "NftClient")]
pub trait NftInterface {
    fn owner_of(e: Env, token_id: u32) -> Address;
    fn get_approved(e: Env, token_id: u32) -> Option<Address>;
    fn is_approved_for_all(e: Env, owner: Address, operator: Address) -> bool;
    fn transfer_from(e: Env, spender: Address, from: Address, to: Address, token_id: u32);
}
