//! Dispatch adapter, external contracts, and catalogue expansion.
//!
//! [`DispatchAdapter`] is the orchestration point spec §4.1 describes: it
//! wires [`toolgate_ratelimiter`], [`toolgate_bulkhead`],
//! [`toolgate_circuitbreaker`], [`toolgate_coalesce`],
//! [`toolgate_permissions`], and [`toolgate_security`] together around one
//! tool-operation request. [`ExpansionService`] is the separate, stateless
//! path that projects a tenant's tool instances into a flat operation
//! catalogue.
//!
//! Every external collaborator (repositories, the provider registry,
//! metrics/audit/event sinks) is a trait in [`contracts`] — this crate
//! implements none of them.

mod adapter;
mod canonical;
mod config;
pub mod contracts;
mod events;
mod expansion;
mod provider_cache;
pub mod types;

pub use adapter::{DispatchAdapter, DispatchDeps};
pub use config::{DispatchConfig, DispatchConfigBuilder};
pub use events::DispatchEvent;
pub use expansion::ExpansionService;
