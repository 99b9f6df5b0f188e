//! The dispatch adapter: the request path spec §4.1 describes, wiring
//! rate limiting, the bulkhead, circuit breaking, single-flight
//! coalescing, permission discovery, and the security suite together for
//! one tool-operation call.

use crate::canonical::canonicalize;
use crate::config::DispatchConfig;
use crate::contracts::{
    AuditSink, EventQueue, MetricsSink, OperationContext, Provider, ProviderRegistry,
    TemplateRepository, ToolRepository,
};
use crate::events::DispatchEvent;
use crate::provider_cache::ProviderCache;
use crate::types::ToolInstance;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use toolgate_bulkhead::Bulkhead;
use toolgate_circuitbreaker::{CircuitBreakerRegistry, ProviderHealth};
use toolgate_coalesce::Coalescer;
use toolgate_core::events::EventListeners;
use toolgate_core::{composite_fingerprint, GatewayError};
use toolgate_permissions::PermissionService;
use toolgate_ratelimiter::RateLimiterRegistry;
use toolgate_security::SecuritySuite;
use uuid::Uuid;

#[cfg(feature = "tracing")]
use tracing::warn;

/// The external collaborators a [`DispatchAdapter`] is wired to at
/// construction. Every field is an implementation the embedding service
/// supplies or an already-built component from a sibling crate — this
/// crate constructs none of them itself.
pub struct DispatchDeps {
    pub tools: Arc<dyn ToolRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub providers: Arc<dyn ProviderRegistry>,
    pub metrics: Arc<dyn MetricsSink>,
    pub audit_sink: Option<Arc<dyn AuditSink>>,
    pub event_queue: Option<Arc<dyn EventQueue>>,
    pub bulkhead: Bulkhead,
    pub breakers: CircuitBreakerRegistry,
    pub coalescer: Coalescer<serde_json::Value>,
    pub rate_limiter: RateLimiterRegistry,
    pub permissions: Arc<PermissionService>,
    pub security: Arc<SecuritySuite>,
}

pub struct DispatchAdapter {
    tools: Arc<dyn ToolRepository>,
    templates: Arc<dyn TemplateRepository>,
    providers: Arc<dyn ProviderRegistry>,
    metrics: Arc<dyn MetricsSink>,
    event_queue: Option<Arc<dyn EventQueue>>,
    bulkhead: Bulkhead,
    breakers: CircuitBreakerRegistry,
    coalescer: Coalescer<serde_json::Value>,
    rate_limiter: RateLimiterRegistry,
    permissions: Arc<PermissionService>,
    security: Arc<SecuritySuite>,
    provider_cache: ProviderCache,
    config: DispatchConfig,
    event_listeners: EventListeners<DispatchEvent>,
}

impl DispatchAdapter {
    pub fn new(config: DispatchConfig, deps: DispatchDeps) -> Self {
        if let Some(sink) = deps.audit_sink.clone() {
            deps.security.audit().subscribe(move |event| {
                let sink = Arc::clone(&sink);
                tokio::spawn(async move { sink.record(event).await });
            });
        }

        Self {
            provider_cache: ProviderCache::new(config.provider_cache_ttl),
            tools: deps.tools,
            templates: deps.templates,
            providers: deps.providers,
            metrics: deps.metrics,
            event_queue: deps.event_queue,
            bulkhead: deps.bulkhead,
            breakers: deps.breakers,
            coalescer: deps.coalescer,
            rate_limiter: deps.rate_limiter,
            permissions: deps.permissions,
            security: deps.security,
            config,
            event_listeners: EventListeners::new(),
        }
    }

    pub fn event_listeners(&self) -> &EventListeners<DispatchEvent> {
        &self.event_listeners
    }

    /// Executes one tool operation end to end: rate limit, bulkhead,
    /// breaker, coalescing, provider call, audit — in that order, per
    /// spec §2's data-flow and §4.1's execute path.
    pub async fn execute_operation(
        &self,
        ctx: &OperationContext,
        tool_id: Uuid,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        if ctx.user_token.is_empty() {
            return Err(GatewayError::AuthenticationFailed(
                "user token required to execute an operation".to_string(),
            ));
        }
        let token = self.security.tokens().validate(&ctx.user_token).await?;

        if self.security.threats().is_blocked(&token.user_id) {
            return Err(GatewayError::Forbidden(format!(
                "user '{}' is blocked by threat detection",
                token.user_id
            )));
        }

        self.rate_limiter.check(&token.tenant_id)?;

        let permit = self.bulkhead.acquire(&ctx.cancel).await?;

        let outcome = self.dispatch_inner(ctx, tool_id, operation, &params).await;

        let is_error = outcome.is_err();
        let blocked_now = self
            .security
            .threats()
            .record_request(&token.user_id, operation, is_error);
        if blocked_now {
            #[cfg(feature = "tracing")]
            warn!(user_id = %token.user_id, "threat detector blocked user after this request");
        }

        let mut details = toolgate_core::ValueMap::new();
        details.insert(
            "tool_id".to_string(),
            toolgate_core::Value::String(tool_id.to_string()),
        );
        self.security.audit().record(
            "tool.executed",
            &token.user_id,
            &token.tenant_id,
            operation,
            tool_id.to_string(),
            if is_error { "failure" } else { "success" },
            details,
        );

        drop(permit);

        if let Some(queue) = &self.event_queue {
            if outcome.is_ok() {
                let queue = Arc::clone(queue);
                let payload = serde_json::json!({ "tool_id": tool_id, "operation": operation });
                tokio::spawn(async move {
                    let _ = queue.publish("dispatch.operation.completed", payload).await;
                });
            }
        }

        outcome
    }

    async fn dispatch_inner(
        &self,
        ctx: &OperationContext,
        tool_id: Uuid,
        operation: &str,
        params: &serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let tool = self
            .tools
            .get_by_id(tool_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("tool instance '{tool_id}'")))?;

        if tool.organization_id != ctx.organization_id {
            return Err(GatewayError::Forbidden(
                "tool instance belongs to a different organization".to_string(),
            ));
        }
        if !tool.is_dispatchable() {
            return Err(GatewayError::NotFound(format!(
                "tool instance '{tool_id}' is not active"
            )));
        }

        let provider_name = self.resolve_provider_name(&tool).await?;
        let provider = self
            .providers
            .get_provider(&provider_name)
            .ok_or_else(|| GatewayError::NotFound(format!("provider '{provider_name}'")))?;

        let key = composite_fingerprint([
            tool_id.to_string(),
            operation.to_string(),
            canonicalize(params),
        ]);

        let coalescer = self.coalescer.clone();
        let ctx_owned = ctx.clone();
        let ctx_for_provider = ctx.clone();
        let operation_owned = operation.to_string();
        let params_owned = params.clone();
        let provider = Arc::clone(&provider);
        let coalesced_flag = Arc::new(AtomicBool::new(false));
        let coalesced_flag_inner = Arc::clone(&coalesced_flag);

        let chaos_provider_name = provider_name.clone();
        let enable_chaos = self.config.enable_chaos;
        let chaos_probability = self.config.chaos_probability;

        let start = Instant::now();
        let result = self
            .breakers
            .execute(&provider_name, move || async move {
                let (value, shared) = coalescer
                    .coalesce(&key, &ctx_owned.cancel, move || async move {
                        if enable_chaos && rand::random::<f64>() < chaos_probability {
                            let source: Box<dyn std::error::Error + Send + Sync> =
                                "chaos: synthetic provider failure injected".into();
                            return Err(GatewayError::ProviderError {
                                provider: chaos_provider_name,
                                source,
                            });
                        }
                        provider
                            .execute_operation(&ctx_for_provider, &operation_owned, params_owned)
                            .await
                    })
                    .await
                    .map_err(|err| err.into_gateway_error())?;
                coalesced_flag_inner.store(shared, Ordering::Relaxed);
                Ok((*value).clone())
            })
            .await;
        let duration = start.elapsed();

        let outcome_label: &'static str = match &result {
            Ok(_) => "success",
            Err(GatewayError::CircuitOpen { .. }) => "circuit_open",
            Err(_) => "failure",
        };
        self.metrics
            .record_operation(&provider_name, operation, outcome_label);
        self.metrics.record_latency(
            "dispatch_operation_duration",
            duration,
            &[("provider", &provider_name), ("operation", operation)],
        );

        self.event_listeners.emit(&DispatchEvent::OperationCompleted {
            provider: provider_name,
            operation: operation.to_string(),
            outcome: outcome_label,
            coalesced: coalesced_flag.load(Ordering::Relaxed),
            duration,
            timestamp: Instant::now(),
        });

        result
    }

    async fn resolve_provider_name(&self, tool: &ToolInstance) -> Result<String, GatewayError> {
        if let Some(cached) = self.provider_cache.get(tool.template_id) {
            return Ok(cached);
        }
        let template = self
            .templates
            .get_by_id(tool.template_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("template '{}'", tool.template_id)))?;
        self.provider_cache
            .put(tool.template_id, template.provider_name.clone());
        Ok(template.provider_name)
    }

    /// `GetOrganizationTools`: lists a tenant's active tools, filtered by
    /// the caller's discovered permissions unless `user_token` is empty.
    pub async fn list_organization_tools(
        &self,
        ctx: &OperationContext,
    ) -> Result<Vec<ToolInstance>, GatewayError> {
        let instances = self.tools.list_by_organization(ctx.organization_id).await?;
        let active: Vec<ToolInstance> = instances
            .into_iter()
            .filter(|instance| instance.is_dispatchable())
            .collect();

        if ctx.user_token.is_empty() {
            return Ok(active);
        }

        let mut included = Vec::with_capacity(active.len());
        for instance in active {
            let provider_name = match self.resolve_provider_name(&instance).await {
                Ok(name) => name,
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    warn!(tool_id = %instance.id, "skipping tool with unresolvable provider");
                    continue;
                }
            };
            let Some(provider) = self.providers.get_provider(&provider_name) else {
                continue;
            };
            let base_url = provider.default_configuration().base_url;
            let resolution = self
                .permissions
                .resolve(&provider_name, &base_url, &ctx.user_token, &[])
                .await;
            if resolution.included {
                included.push(instance);
            }
        }
        Ok(included)
    }

    /// `GetHealthStatus`: a snapshot of every provider's circuit breaker
    /// health record.
    pub fn health_status(&self) -> HashMap<String, ProviderHealth> {
        self.breakers.health_status()
    }

    /// Stops admitting new dispatch calls and wakes every queued bulkhead
    /// waiter with `Closed`. Part of the shutdown sequence; the embedder
    /// is responsible for no longer routing new requests to
    /// [`DispatchAdapter::execute_operation`] afterward.
    pub fn close_bulkhead(&self) {
        self.bulkhead.close();
    }
}
