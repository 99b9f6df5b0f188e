//! External collaborator contracts (spec §6): repositories, the provider
//! registry, and the best-effort sinks the dispatch adapter is handed at
//! construction. None of these are implemented in this crate — an embedding
//! service supplies concrete adapters (a database-backed repository, an HTTP
//! provider client, a Prometheus metrics sink, ...).

use crate::types::{
    OperationDescriptor, OperationMappings, ProviderConfiguration, ToolInstance, ToolStatus,
    ToolTemplate,
};
use std::time::Duration;
use toolgate_circuitbreaker::ProviderHealth;
use toolgate_core::GatewayError;
use uuid::Uuid;

/// Propagates cancellation and the caller's credential through a dispatch
/// call, mirroring spec §5's "every request carries a cancellation context".
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub cancel: tokio_util::sync::CancellationToken,
    pub organization_id: Uuid,
    pub user_token: String,
}

impl OperationContext {
    pub fn new(organization_id: Uuid, user_token: impl Into<String>) -> Self {
        Self {
            cancel: tokio_util::sync::CancellationToken::new(),
            organization_id,
            user_token: user_token.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait ToolRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ToolInstance>, GatewayError>;
    async fn list_by_organization(&self, org_id: Uuid) -> Result<Vec<ToolInstance>, GatewayError>;
    async fn get_by_instance_name(
        &self,
        org_id: Uuid,
        name: &str,
    ) -> Result<Option<ToolInstance>, GatewayError>;
    async fn update_status(&self, id: Uuid, status: ToolStatus) -> Result<(), GatewayError>;
    async fn update_health_status(
        &self,
        id: Uuid,
        health: ProviderHealth,
    ) -> Result<(), GatewayError>;
}

#[async_trait::async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ToolTemplate>, GatewayError>;
    async fn get_by_provider_name(&self, name: &str)
        -> Result<Option<ToolTemplate>, GatewayError>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<ToolTemplate>, GatewayError>;
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn default_configuration(&self) -> ProviderConfiguration;
    async fn execute_operation(
        &self,
        ctx: &OperationContext,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;
    fn ai_optimized_definitions(&self) -> Vec<OperationDescriptor>;
    async fn validate_credentials(&self, token: &str) -> Result<bool, GatewayError>;
    async fn health_check(&self) -> Result<(), GatewayError>;
    fn operation_mappings(&self) -> OperationMappings;
}

pub trait ProviderRegistry: Send + Sync {
    fn get_provider(&self, name: &str) -> Option<std::sync::Arc<dyn Provider>>;
}

pub trait MetricsSink: Send + Sync {
    fn record_counter(&self, name: &str, value: u64, labels: &[(&str, &str)]);
    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);
    fn record_latency(&self, name: &str, duration: Duration, labels: &[(&str, &str)]);
    fn record_operation(&self, provider: &str, operation: &str, outcome: &str);
}

#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: toolgate_security::AuditEvent);
}

#[async_trait::async_trait]
pub trait EventQueue: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), GatewayError>;
}
