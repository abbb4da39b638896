//! Storage helper utilities for common storage patterns

use soroban_sdk::{Address, Env};

/// Storage key constants
pub mod keys {
    use soroban_sdk::{symbol_short, Symbol};

    pub const ADMIN: Symbol = symbol_short!("ADMIN");
    pub const INITIALIZED: Symbol = symbol_short!("INIT");
    pub const GUARD: Symbol = symbol_short!("GUARD");
}

/// Storage helper functions
pub struct Storage;

impl Storage {
    /// Check if a contract has been initialized
    pub fn is_initialized(e: &Env) -> bool {
        e.storage().instance().has(&keys::INITIALIZED)
    }

    /// Mark contract as initialized
    pub fn set_initialized(e: &Env) {
        e.storage().instance().set(&keys::INITIALIZED, &true);
    }

    /// Get admin address from storage, if set
    pub fn admin(e: &Env) -> Option<Address> {
        e.storage().instance().get::<_, Address>(&keys::ADMIN)
    }

    /// Set admin address in storage
    pub fn set_admin(e: &Env, admin: &Address) {
        e.storage().instance().set(&keys::ADMIN, admin);
    }

    /// Try to take the reentrancy guard
    ///
    /// # Returns
    /// `false` if the guard is already held
    pub fn enter_guard(e: &Env) -> bool {
        let held: bool = e.storage().instance().get(&keys::GUARD).unwrap_or(false);
        if held {
            return false;
        }
        e.storage().instance().set(&keys::GUARD, &true);
        true
    }

    /// Release the reentrancy guard
    pub fn exit_guard(e: &Env) {
        e.storage().instance().set(&keys::GUARD, &false);
    }
}
