//! Shared fixtures for the boundary-scenario tests: a single tool instance
//! backed by a configurable provider, plus no-op sinks for the contracts
//! `GatewayCore` doesn't implement itself.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use toolgate::contracts::{
    AuditSink, EventQueue, MetricsSink, OperationContext, Provider, ProviderRegistry,
    TemplateRepository, ToolRepository,
};
use toolgate::types::{
    OperationDescriptor, OperationMappings, ProviderConfiguration, ToolInstance, ToolStatus,
    ToolTemplate,
};
use toolgate::GatewayDeps;
use toolgate_core::GatewayError;
use uuid::Uuid;

pub struct FixtureTools {
    pub instance: ToolInstance,
}

#[async_trait]
impl ToolRepository for FixtureTools {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ToolInstance>, GatewayError> {
        Ok(if id == self.instance.id {
            Some(self.instance.clone())
        } else {
            None
        })
    }

    async fn list_by_organization(&self, org_id: Uuid) -> Result<Vec<ToolInstance>, GatewayError> {
        Ok(if org_id == self.instance.organization_id {
            vec![self.instance.clone()]
        } else {
            vec![]
        })
    }

    async fn get_by_instance_name(
        &self,
        _org_id: Uuid,
        _name: &str,
    ) -> Result<Option<ToolInstance>, GatewayError> {
        Ok(None)
    }

    async fn update_status(&self, _id: Uuid, _status: ToolStatus) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn update_health_status(
        &self,
        _id: Uuid,
        _health: toolgate_circuitbreaker::ProviderHealth,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}

pub struct FixtureTemplates {
    pub template: ToolTemplate,
}

#[async_trait]
impl TemplateRepository for FixtureTemplates {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ToolTemplate>, GatewayError> {
        Ok(if id == self.template.id {
            Some(self.template.clone())
        } else {
            None
        })
    }

    async fn get_by_provider_name(&self, _name: &str) -> Result<Option<ToolTemplate>, GatewayError> {
        Ok(Some(self.template.clone()))
    }

    async fn list_by_category(&self, _category: &str) -> Result<Vec<ToolTemplate>, GatewayError> {
        Ok(vec![self.template.clone()])
    }
}

/// A provider whose latency and success/failure can be steered per test:
/// `fail` flips between success and `ProviderError`, `delay` simulates a
/// slow backend, and the two atomics track live/peak concurrency so tests
/// can assert the bulkhead's admission bound was respected.
pub struct ConfigurableProvider {
    pub base_url: String,
    pub calls: Arc<AtomicUsize>,
    pub active: Arc<AtomicUsize>,
    pub max_active_seen: Arc<AtomicUsize>,
    pub delay: Duration,
    pub fail: AtomicBool,
}

impl ConfigurableProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            base_url: "https://example.invalid".to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            max_active_seen: Arc::new(AtomicUsize::new(0)),
            delay,
            fail: AtomicBool::new(false),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Provider for ConfigurableProvider {
    fn default_configuration(&self) -> ProviderConfiguration {
        ProviderConfiguration {
            base_url: self.base_url.clone(),
            auth_type: "bearer".to_string(),
        }
    }

    async fn execute_operation(
        &self,
        _ctx: &OperationContext,
        _operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_seen.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            let source: Box<dyn std::error::Error + Send + Sync> = "synthetic failure".into();
            Err(GatewayError::ProviderError {
                provider: "fixture".to_string(),
                source,
            })
        } else {
            Ok(params)
        }
    }

    fn ai_optimized_definitions(&self) -> Vec<OperationDescriptor> {
        vec![OperationDescriptor {
            operation: "scan".to_string(),
            description: "run a scan".to_string(),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
            subcategory: None,
        }]
    }

    async fn validate_credentials(&self, _token: &str) -> Result<bool, GatewayError> {
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    fn operation_mappings(&self) -> OperationMappings {
        HashMap::new()
    }
}

pub struct FixtureRegistry {
    pub provider: Arc<dyn Provider>,
    pub name: String,
}

impl ProviderRegistry for FixtureRegistry {
    fn get_provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        if name == self.name {
            Some(Arc::clone(&self.provider))
        } else {
            None
        }
    }
}

pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_counter(&self, _name: &str, _value: u64, _labels: &[(&str, &str)]) {}
    fn record_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
    fn record_latency(&self, _name: &str, _duration: Duration, _labels: &[(&str, &str)]) {}
    fn record_operation(&self, _provider: &str, _operation: &str, _outcome: &str) {}
}

pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: toolgate_security::AuditEvent) {}
}

pub struct NoopEventQueue;

#[async_trait]
impl EventQueue for NoopEventQueue {
    async fn publish(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), GatewayError> {
        Ok(())
    }
}

/// One tool instance, its template, and a provider registered under the
/// template's provider name, wired into a ready-to-use `GatewayDeps`.
pub struct Fixture {
    pub organization_id: Uuid,
    pub instance: ToolInstance,
    pub provider: Arc<ConfigurableProvider>,
}

pub fn build_fixture(delay: Duration) -> (GatewayDeps, Fixture) {
    let organization_id = Uuid::new_v4();
    let template_id = Uuid::new_v4();
    let instance = ToolInstance {
        id: Uuid::new_v4(),
        organization_id,
        tenant_id: Uuid::new_v4(),
        template_id,
        instance_name: "primary".to_string(),
        display_name: "Primary".to_string(),
        status: ToolStatus::Active,
        is_active: true,
    };
    let template = ToolTemplate {
        id: template_id,
        provider_name: "fixture".to_string(),
        display_name: "Fixture Provider".to_string(),
        description: "test fixture".to_string(),
        category: "scanning".to_string(),
    };

    let provider = Arc::new(ConfigurableProvider::new(delay));

    let deps = GatewayDeps {
        tools: Arc::new(FixtureTools {
            instance: instance.clone(),
        }),
        templates: Arc::new(FixtureTemplates { template }),
        providers: Arc::new(FixtureRegistry {
            provider: Arc::clone(&provider) as Arc<dyn Provider>,
            name: "fixture".to_string(),
        }),
        metrics: Arc::new(NoopMetrics),
        audit_sink: Some(Arc::new(NoopAuditSink)),
        event_queue: Some(Arc::new(NoopEventQueue)),
    };

    (
        deps,
        Fixture {
            organization_id,
            instance,
            provider,
        },
    )
}
