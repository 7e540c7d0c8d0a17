//! # aurora-bus
//!
//! In-process message bus for cross-context notifications.
//!
//! Publishing is fire-and-forget: no subscribers is fine, slow subscribers
//! queue, closed subscribers are pruned. Subscriptions are guard objects
//! carrying the exact registration id, so dropping the guard detaches the
//! subscriber that was registered and nothing else.

pub mod bus;

pub use bus::{MessageBus, Subscription};
