#![no_std]
use shared_utils::{ErrorHelper, Storage};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, Address, Env, String, Symbol, Vec,
};


// ============================================================================
// Error Types
// ============================================================================

/// Contract errors for structured error handling
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    /// Recipient list for an airdrop is empty
    EmptyRecipients = 6,
    /// Caller is not the owner of the NFT
    NotOwner = 103,
    /// Caller is not allowed to move the token
    NotApproved = 106,
    /// Contract has already been initialized
    AlreadyInitialized = 200,
    /// Contract has not been initialized
    NotInitialized = 201,
    /// Owner index is past the owner's balance
    IndexOutOfBounds = 307,
    /// NFT with the given token_id does not exist
    NFTNotFound = 306,
}

/// Storage keys for the contract
#[contracttype]
pub enum DataKey {
    /// Counter for generating unique token IDs
    TokenCounter,
    /// Owner mapping (token_id -> Address)
    Owner(u32),
    /// Token URI (token_id -> String)
    TokenUri(u32),
    /// Tokens held by an owner, in acquisition order
    OwnedTokens(Address),
    /// Single-token approval (token_id -> Address)
    Approved(u32),
    /// Operator approval (owner, operator) -> bool
    Operator(Address, Address),
}

// ============================================================================
// Storage Module
// ============================================================================

mod storage {
    use super::*;

    // --- Token Counter ---

    pub fn increment_token_counter(e: &Env) -> u32 {
        let count = get_token_counter(e);
        let new_count = count + 1;
        e.storage()
            .instance()
            .set(&DataKey::TokenCounter, &new_count);
        new_count
    }

    pub fn get_token_counter(e: &Env) -> u32 {
        e.storage()
            .instance()
            .get(&DataKey::TokenCounter)
            .unwrap_or(0)
    }

    // --- Owner Mapping ---

    pub fn set_owner(e: &Env, token_id: u32, owner: &Address) {
        e.storage()
            .persistent()
            .set(&DataKey::Owner(token_id), owner);
    }

    pub fn get_owner(e: &Env, token_id: u32) -> Option<Address> {
        e.storage().persistent().get(&DataKey::Owner(token_id))
    }

    // --- Token URI ---

    pub fn set_token_uri(e: &Env, token_id: u32, uri: &String) {
        e.storage()
            .persistent()
            .set(&DataKey::TokenUri(token_id), uri);
    }

    pub fn get_token_uri(e: &Env, token_id: u32) -> Option<String> {
        e.storage().persistent().get(&DataKey::TokenUri(token_id))
    }

    // --- Enumeration ---

    pub fn get_owned_tokens(e: &Env, owner: &Address) -> Vec<u32> {
        e.storage()
            .persistent()
            .get(&DataKey::OwnedTokens(owner.clone()))
            .unwrap_or(Vec::new(e))
    }

    pub fn add_owned_token(e: &Env, owner: &Address, token_id: u32) {
        let mut tokens = get_owned_tokens(e, owner);
        tokens.push_back(token_id);
        e.storage()
            .persistent()
            .set(&DataKey::OwnedTokens(owner.clone()), &tokens);
    }

    pub fn remove_owned_token(e: &Env, owner: &Address, token_id: u32) {
        let mut tokens = get_owned_tokens(e, owner);
        if let Some(index) = tokens.first_index_of(token_id) {
            tokens.remove(index);
        }
        e.storage()
            .persistent()
            .set(&DataKey::OwnedTokens(owner.clone()), &tokens);
    }

    // --- Approvals ---

    pub fn set_approved(e: &Env, token_id: u32, approved: &Address) {
        e.storage()
            .persistent()
            .set(&DataKey::Approved(token_id), approved);
    }

    pub fn get_approved(e: &Env, token_id: u32) -> Option<Address> {
        e.storage().persistent().get(&DataKey::Approved(token_id))
    }

    pub fn clear_approved(e: &Env, token_id: u32) {
        e.storage().persistent().remove(&DataKey::Approved(token_id));
    }

    pub fn set_operator(e: &Env, owner: &Address, operator: &Address, approved: bool) {
        e.storage().persistent().set(
            &DataKey::Operator(owner.clone(), operator.clone()),
            &approved,
        );
    }

    pub fn is_operator(e: &Env, owner: &Address, operator: &Address) -> bool {
        e.storage()
            .persistent()
            .get(&DataKey::Operator(owner.clone(), operator.clone()))
            .unwrap_or(false)
    }
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct CollectibleNFTContract;

impl CollectibleNFTContract {
    fn mint_one(e: &Env, to: &Address, uri: &String) -> u32 {
        let token_id = storage::increment_token_counter(e);

        storage::set_owner(e, token_id, to);
        storage::set_token_uri(e, token_id, uri);
        storage::add_owned_token(e, to, token_id);

        e.events().publish(
            (Symbol::new(e, "Mint"), token_id),
            (to.clone(), uri.clone(), e.ledger().timestamp()),
        );

        token_id
    }

    fn move_token(e: &Env, from: &Address, to: &Address, token_id: u32) {
        storage::set_owner(e, token_id, to);
        storage::clear_approved(e, token_id);
        storage::remove_owned_token(e, from, token_id);
        storage::add_owned_token(e, to, token_id);

        e.events().publish(
            (Symbol::new(e, "Transfer"), token_id),
            (from.clone(), to.clone(), e.ledger().timestamp()),
        );
    }
}

#[contractimpl]
impl CollectibleNFTContract {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the collection with an admin address
    ///
    /// # Errors
    /// * `AlreadyInitialized` - If the contract has already been initialized
    pub fn initialize(e: Env, admin: Address) -> Result<(), ContractError> {
        if Storage::is_initialized(&e) {
            return Err(ContractError::AlreadyInitialized);
        }

        Storage::set_admin(&e, &admin);
        Storage::set_initialized(&e);
        e.storage().instance().set(&DataKey::TokenCounter, &0u32);

        Ok(())
    }

    /// Get the admin address
    pub fn get_admin(e: Env) -> Result<Address, ContractError> {
        Storage::admin(&e).ok_or(ContractError::NotInitialized)
    }

    // ========================================================================
    // Minting
    // ========================================================================

    /// Mint a new collectible to `to` with metadata at `uri`
    ///
    /// Minting is open; the collection does not restrict who may create items.
    ///
    /// # Returns
    /// The token_id of the newly minted NFT (ids start at 1)
    pub fn mint_item(e: Env, to: Address, uri: String) -> Result<u32, ContractError> {
        if !Storage::is_initialized(&e) {
            return Err(ContractError::NotInitialized);
        }
        Ok(Self::mint_one(&e, &to, &uri))
    }

    /// Mint one token per recipient, all sharing the same metadata URI
    ///
    /// # Returns
    /// The minted token ids, in recipient order
    ///
    /// # Errors
    /// * `EmptyRecipients` - If `recipients` is empty
    pub fn airdrop_mint(
        e: Env,
        recipients: Vec<Address>,
        uri: String,
    ) -> Result<Vec<u32>, ContractError> {
        if !Storage::is_initialized(&e) {
            return Err(ContractError::NotInitialized);
        }
        if recipients.is_empty() {
            return Err(ErrorHelper::fail(
                &e,
                "nft::airdrop_mint",
                shared_utils::code::EMPTY_RECIPIENTS,
                ContractError::EmptyRecipients,
            ));
        }

        let mut minted = Vec::new(&e);
        for recipient in recipients.iter() {
            minted.push_back(Self::mint_one(&e, &recipient, &uri));
        }

        e.events().publish(
            (Symbol::new(&e, "Airdrop"),),
            (minted.len(), uri),
        );

        Ok(minted)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Metadata URI of a token
    pub fn token_uri(e: Env, token_id: u32) -> Result<String, ContractError> {
        storage::get_token_uri(&e, token_id).ok_or(ContractError::NFTNotFound)
    }

    /// Get owner of NFT
    pub fn owner_of(e: Env, token_id: u32) -> Result<Address, ContractError> {
        storage::get_owner(&e, token_id).ok_or(ContractError::NFTNotFound)
    }

    /// Number of tokens held by `owner`
    pub fn balance_of(e: Env, owner: Address) -> u32 {
        storage::get_owned_tokens(&e, &owner).len()
    }

    /// Token held by `owner` at position `index` (0-based)
    pub fn token_of_owner_by_index(
        e: Env,
        owner: Address,
        index: u32,
    ) -> Result<u32, ContractError> {
        storage::get_owned_tokens(&e, &owner)
            .get(index)
            .ok_or(ContractError::IndexOutOfBounds)
    }

    /// Get total supply of NFTs
    pub fn total_supply(e: Env) -> u32 {
        storage::get_token_counter(&e)
    }

    // ========================================================================
    // Approvals
    // ========================================================================

    /// Approve `approved` to transfer a single token
    pub fn approve(
        e: Env,
        owner: Address,
        approved: Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        owner.require_auth();

        let current_owner = storage::get_owner(&e, token_id).ok_or(ContractError::NFTNotFound)?;
        if current_owner != owner && !storage::is_operator(&e, &current_owner, &owner) {
            return Err(ContractError::NotOwner);
        }

        storage::set_approved(&e, token_id, &approved);

        e.events().publish(
            (Symbol::new(&e, "Approve"), token_id),
            (current_owner, approved),
        );

        Ok(())
    }

    pub fn get_approved(e: Env, token_id: u32) -> Option<Address> {
        storage::get_approved(&e, token_id)
    }

    /// Allow or revoke `operator` for every token of `owner`
    pub fn set_approval_for_all(e: Env, owner: Address, operator: Address, approved: bool) {
        owner.require_auth();
        storage::set_operator(&e, &owner, &operator, approved);

        e.events().publish(
            (Symbol::new(&e, "ApproveAll"), owner),
            (operator, approved),
        );
    }

    pub fn is_approved_for_all(e: Env, owner: Address, operator: Address) -> bool {
        storage::is_operator(&e, &owner, &operator)
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Transfer NFT to new owner
    ///
    /// # Errors
    /// * `NFTNotFound` - If the NFT does not exist
    /// * `NotOwner` - If `from` is not the owner
    pub fn transfer(e: Env, from: Address, to: Address, token_id: u32) -> Result<(), ContractError> {
        from.require_auth();

        let current_owner = storage::get_owner(&e, token_id).ok_or(ContractError::NFTNotFound)?;
        if current_owner != from {
            return Err(ContractError::NotOwner);
        }

        Self::move_token(&e, &from, &to, token_id);
        Ok(())
    }

    /// Transfer on behalf of the owner by an approved address or operator
    ///
    /// # Errors
    /// * `NFTNotFound` - If the NFT does not exist
    /// * `NotOwner` - If `from` is not the owner
    /// * `NotApproved` - If `spender` is neither owner, approved, nor operator
    pub fn transfer_from(
        e: Env,
        spender: Address,
        from: Address,
        to: Address,
        token_id: u32,
    ) -> Result<(), ContractError> {
        spender.require_auth();

        let current_owner = storage::get_owner(&e, token_id).ok_or(ContractError::NFTNotFound)?;
        if current_owner != from {
            return Err(ContractError::NotOwner);
        }

        let allowed = spender == from
            || storage::get_approved(&e, token_id) == Some(spender.clone())
            || storage::is_operator(&e, &from, &spender);
        if !allowed {
            return Err(ErrorHelper::fail(
                &e,
                "nft::transfer_from",
                shared_utils::code::NOT_APPROVED,
                ContractError::NotApproved,
            ));
        }

        Self::move_token(&e, &from, &to, token_id);
        Ok(())
    }
}
