//! Core infrastructure shared by every toolgate crate.
//!
//! This crate provides shared functionality used across all resilience and
//! dispatch modules:
//! - `GatewayError`, the single error type crate boundaries convert into
//! - Event system for observability
//! - A typed `Value` used for audit details and discovered capabilities
//! - Fingerprinting used to key coalescing, permission cache, and token data

pub mod error;
pub mod events;
pub mod fingerprint;
pub mod value;

pub use error::GatewayError;
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent, SubscriptionId};
pub use fingerprint::{composite_fingerprint, fingerprint};
pub use value::{Value, ValueMap};
