//! The resilience and dispatch core of a multi-tenant tool-integration
//! gateway.
//!
//! [`GatewayCore`] is the single entry point an embedding service
//! constructs once at startup: it wires rate limiting, bulkheading,
//! circuit breaking, single-flight coalescing, permission discovery, and
//! the security suite (tokens, encryption, threat detection, audit)
//! around the dispatch path described in the architecture notes, and
//! registers their background maintenance workers on a
//! [`toolgate_executor::WorkerSupervisor`].
//!
//! This crate constructs and configures every resilience/security
//! component; it implements none of the external contracts in
//! [`toolgate_dispatch::contracts`] (tool/template repositories, the
//! provider registry, metrics/audit/event sinks) — those are supplied by
//! the embedding service through [`GatewayDeps`].
//!
//! # Example
//!
//! ```rust,no_run
//! use toolgate::{GatewayConfig, GatewayCore, GatewayDeps};
//!
//! # async fn example(deps: GatewayDeps) {
//! let config = GatewayConfig::builder()
//!     .max_concurrent_requests(50)
//!     .requests_per_minute(600.0)
//!     .build();
//!
//! let gateway = GatewayCore::with_current_runtime(config, deps);
//! // gateway.execute_operation(&ctx, tool_id, "list_repos", params).await?;
//! gateway.shutdown().await;
//! # }
//! ```

mod config;
mod core;

pub use config::{GatewayConfig, GatewayConfigBuilder};
pub use core::{GatewayCore, GatewayDeps};

pub use toolgate_dispatch::contracts;
pub use toolgate_dispatch::types;
