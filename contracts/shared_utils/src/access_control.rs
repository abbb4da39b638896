//! Access control patterns and utilities

use super::storage::Storage;
use soroban_sdk::{Address, Env};

/// Access control helper functions
pub struct AccessControl;

impl AccessControl {
    /// Require the stored admin's authorization
    ///
    /// # Returns
    /// The admin address, or `None` when no admin is stored
    pub fn require_admin(e: &Env) -> Option<Address> {
        let admin = Storage::admin(e)?;
        admin.require_auth();
        Some(admin)
    }
}
