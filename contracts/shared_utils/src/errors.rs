//! Error handling utilities and common error patterns

use super::error_codes::message_for_code;
use soroban_sdk::{log, Env};

/// Error helper functions
pub struct ErrorHelper;

impl ErrorHelper {
    /// Log a standardized error code with its message
    ///
    /// # Arguments
    /// * `e` - The environment
    /// * `context` - The error context
    /// * `code` - A code from [`crate::error_codes::code`]
    pub fn log_code(e: &Env, context: &str, code: u32) {
        log!(e, "Error [{}]: #{} {}", context, code, message_for_code(code));
    }

    /// Log an error code and hand the error back for `return Err(..)`
    ///
    /// # Arguments
    /// * `e` - The environment
    /// * `context` - The error context
    /// * `code` - Numeric code of `err`
    /// * `err` - The contract error to return
    pub fn fail<E>(e: &Env, context: &str, code: u32, err: E) -> E {
        Self::log_code(e, context, code);
        err
    }
}
