//! Event emission patterns and utilities

use soroban_sdk::{symbol_short, Address, Env, Symbol, Topics};

/// Event emission helper functions
pub struct Events;

impl Events {
    /// Emit an event with multiple topics
    ///
    /// # Arguments
    /// * `e` - The environment
    /// * `topics` - Tuple of topics (must implement Topics)
    /// * `data` - The event data (tuple)
    pub fn emit_with_topics<T, U>(e: &Env, topics: T, data: U)
    where
        T: Topics,
        U: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
    {
        e.events().publish(topics, data);
    }

    /// Emit an event keyed by a numeric id (listing, auction)
    ///
    /// # Arguments
    /// * `e` - The environment
    /// * `topic` - The event name
    /// * `id` - The listing or auction id
    /// * `data` - The event data
    pub fn emit_for_id<T>(e: &Env, topic: Symbol, id: u64, data: T)
    where
        T: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
    {
        Self::emit_with_topics(e, (topic, id), data);
    }

    /// Emit a payment event
    ///
    /// # Arguments
    /// * `e` - The environment
    /// * `from` - The payer (or the escrow holder)
    /// * `to` - The payee
    /// * `amount` - The amount moved
    pub fn emit_payment(e: &Env, from: &Address, to: &Address, amount: i128) {
        Self::emit_with_topics(
            e,
            (symbol_short!("Payment"), from.clone(), to.clone()),
            (amount, e.ledger().timestamp()),
        );
    }
}
