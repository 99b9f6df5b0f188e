//! Wires every resilience and security component into one
//! [`GatewayCore`], matching the component table in spec §2: rate
//! limiter, bulkhead, circuit breaker registry, coalescer, permission
//! service, and security suite are each built from [`GatewayConfig`] and
//! handed to a [`toolgate_dispatch::DispatchAdapter`]; background
//! maintenance (token rotation, key rotation, threat cleanup, rate-limit
//! bucket reclamation) runs on a [`toolgate_executor::WorkerSupervisor`].

use crate::config::GatewayConfig;
use std::collections::HashMap;
use std::sync::Arc;
use toolgate_bulkhead::BulkheadConfig;
use toolgate_circuitbreaker::{CircuitBreakerConfig, ProviderHealth};
use toolgate_coalesce::CoalesceConfig;
use toolgate_core::GatewayError;
use toolgate_dispatch::contracts::{
    AuditSink, EventQueue, MetricsSink, OperationContext, ProviderRegistry, TemplateRepository,
    ToolRepository,
};
use toolgate_dispatch::types::{CatalogueEntry, ToolInstance};
use toolgate_dispatch::{DispatchAdapter, DispatchConfig, DispatchDeps, ExpansionService};
use toolgate_executor::{CurrentRuntime, Executor, WorkerSupervisor};
use toolgate_permissions::{DiscoveryMode, PermissionConfig};
use toolgate_ratelimiter::RateLimiterConfig;
use toolgate_security::{SecurityConfig, SecuritySuite};
use uuid::Uuid;

/// The external collaborators [`GatewayCore::new`] needs. Mirrors
/// [`toolgate_dispatch::DispatchDeps`]'s repository/provider/sink fields,
/// but takes none of the already-built resilience components — those are
/// constructed from [`GatewayConfig`] instead.
pub struct GatewayDeps {
    pub tools: Arc<dyn ToolRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub providers: Arc<dyn ProviderRegistry>,
    pub metrics: Arc<dyn MetricsSink>,
    pub audit_sink: Option<Arc<dyn AuditSink>>,
    pub event_queue: Option<Arc<dyn EventQueue>>,
}

/// The assembled gateway: the dispatch path, the catalogue expansion
/// path, and the background worker supervisor behind them.
pub struct GatewayCore {
    dispatch: DispatchAdapter,
    expansion: ExpansionService,
    security: Arc<SecuritySuite>,
    rate_limiter: toolgate_ratelimiter::RateLimiterRegistry,
    supervisor: WorkerSupervisor,
    shutdown_join_timeout: std::time::Duration,
}

impl GatewayCore {
    /// Builds every component from `config`, wires them into a
    /// [`DispatchAdapter`], and registers the background maintenance
    /// workers on `executor`. Workers begin ticking immediately; the
    /// first tick of each fires after its own interval elapses.
    pub fn new<E: Executor>(config: GatewayConfig, deps: GatewayDeps, executor: &E) -> Self {
        let bulkhead = BulkheadConfig::builder()
            .max_concurrent(config.max_concurrent_requests)
            .queue_capacity(config.queue_size)
            .build();

        let breakers = CircuitBreakerConfig::builder()
            .max_requests(config.circuit_breaker_max_requests)
            .interval(config.circuit_breaker_interval)
            .timeout(config.circuit_breaker_timeout)
            .failure_ratio(config.circuit_breaker_ratio)
            .build();

        let coalescer = CoalesceConfig::builder().build::<serde_json::Value>();

        let rate_limiter = RateLimiterConfig::builder()
            .requests_per_minute(config.requests_per_minute)
            .burst_size(config.burst_size)
            .build();

        let discovery_mode = if config.enable_async_discovery {
            DiscoveryMode::Async
        } else {
            DiscoveryMode::Sync
        };
        let permissions = Arc::new(
            PermissionConfig::builder()
                .cache_ttl(config.permission_cache_ttl)
                .discovery_mode(discovery_mode)
                .discovery_timeout(config.discovery_timeout)
                .build(),
        );

        let security = Arc::new(
            SecurityConfig::builder()
                .max_tokens_per_user(config.max_tokens_per_user)
                .token_ttl(config.token_ttl)
                .token_rotation_interval(config.token_rotation_interval)
                .key_rotation_interval(config.key_rotation_interval)
                .anomaly_threshold(config.anomaly_threshold)
                .audit_capacity(config.audit_retention)
                .build(),
        );

        let mut dispatch_config_builder =
            DispatchConfig::builder().provider_cache_ttl(config.provider_cache_ttl);
        if config.enable_chaos {
            dispatch_config_builder = dispatch_config_builder.enable_chaos(config.chaos_probability);
        }
        let dispatch_config = dispatch_config_builder.build();

        let expansion = ExpansionService::new(Arc::clone(&deps.templates), Arc::clone(&deps.providers));

        let dispatch_deps = DispatchDeps {
            tools: deps.tools,
            templates: deps.templates,
            providers: deps.providers,
            metrics: deps.metrics,
            audit_sink: deps.audit_sink,
            event_queue: deps.event_queue,
            bulkhead,
            breakers,
            coalescer,
            rate_limiter: rate_limiter.clone(),
            permissions,
            security: Arc::clone(&security),
        };

        let dispatch = DispatchAdapter::new(dispatch_config, dispatch_deps);

        let supervisor = WorkerSupervisor::new();

        let maintenance_security = Arc::clone(&security);
        supervisor.spawn_periodic(
            executor,
            "security-maintenance",
            config.maintenance_interval,
            move || {
                let security = Arc::clone(&maintenance_security);
                async move { security.run_maintenance().await }
            },
        );

        let gc_rate_limiter = rate_limiter.clone();
        supervisor.spawn_periodic(
            executor,
            "rate-limiter-gc",
            config.rate_limit_gc_interval,
            move || {
                let rate_limiter = gc_rate_limiter.clone();
                async move {
                    rate_limiter.reclaim_idle();
                }
            },
        );

        Self {
            dispatch,
            expansion,
            security,
            rate_limiter,
            supervisor,
            shutdown_join_timeout: config.shutdown_join_timeout,
        }
    }

    /// Convenience constructor that spawns workers on the ambient tokio
    /// runtime. Panics if called from outside one.
    pub fn with_current_runtime(config: GatewayConfig, deps: GatewayDeps) -> Self {
        let executor = CurrentRuntime::new();
        Self::new(config, deps, &executor)
    }

    /// `ExecuteOperation`.
    pub async fn execute_operation(
        &self,
        ctx: &OperationContext,
        tool_id: Uuid,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        self.dispatch
            .execute_operation(ctx, tool_id, operation, params)
            .await
    }

    /// `GetOrganizationTools`.
    pub async fn list_organization_tools(
        &self,
        ctx: &OperationContext,
    ) -> Result<Vec<ToolInstance>, GatewayError> {
        self.dispatch.list_organization_tools(ctx).await
    }

    /// `ExpandToMCPTools`.
    pub async fn expand_to_mcp_tools(
        &self,
        instances: &[ToolInstance],
    ) -> Result<Vec<CatalogueEntry>, GatewayError> {
        self.expansion.expand_to_mcp_tools(instances).await
    }

    /// `GetHealthStatus`.
    pub fn health_status(&self) -> HashMap<String, ProviderHealth> {
        self.dispatch.health_status()
    }

    /// Direct access to the security suite, for an embedder that needs to
    /// issue tokens outside the dispatch path (e.g. at user login).
    pub fn security(&self) -> &SecuritySuite {
        &self.security
    }

    /// Runs the four-step shutdown sequence: (a) the embedder stops
    /// routing new calls to `execute_operation` — this core exposes no
    /// separate "stop admitting" switch of its own; (b)-(c) the bulkhead
    /// is closed, rejecting new `acquire` calls and waking every queued
    /// waiter with `Closed`; (d) every background worker is signalled and
    /// joined with a bound, aborting any that overrun it.
    ///
    /// `WorkerSupervisor::shutdown` signals and joins in one call, so the
    /// bulkhead is drained first to guarantee no new dispatch work is
    /// admitted while workers are still being given a chance to finish.
    pub async fn shutdown(self) {
        self.dispatch.close_bulkhead();
        self.supervisor.shutdown(self.shutdown_join_timeout).await;
        let _ = self.rate_limiter.reclaim_idle();
    }
}
