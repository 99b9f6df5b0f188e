//! Data model for tool instances, templates, providers, and catalogue
//! entries. These types are the shapes the external repositories and
//! providers hand back across the contracts in [`crate::contracts`]; the
//! core never persists them itself.

use std::collections::HashMap;
use uuid::Uuid;

/// Lifecycle state of a tool instance, owned by the external repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Active,
    Inactive,
    Error,
}

/// A tenant's configured connection to a specific external tool.
///
/// Dispatch is only permitted when `status == Active && is_active`.
#[derive(Debug, Clone)]
pub struct ToolInstance {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub tenant_id: Uuid,
    pub template_id: Uuid,
    pub instance_name: String,
    pub display_name: String,
    pub status: ToolStatus,
    pub is_active: bool,
}

impl ToolInstance {
    pub fn is_dispatchable(&self) -> bool {
        self.status == ToolStatus::Active && self.is_active
    }
}

/// The catalogue definition shared across tenants; names the provider that
/// implements it.
#[derive(Debug, Clone)]
pub struct ToolTemplate {
    pub id: Uuid,
    pub provider_name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
}

/// A provider's default connection settings, returned by
/// `Provider::default_configuration`.
#[derive(Debug, Clone)]
pub struct ProviderConfiguration {
    pub base_url: String,
    pub auth_type: String,
}

/// One operation a provider exposes, in the shape its AI-oriented
/// definitions describe it.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub operation: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub subcategory: Option<String>,
}

/// The coarse capability that gates one operation, as named in a
/// provider's `operation_mappings()`. Matches the capability names
/// `toolgate_permissions::Capabilities` derives (`can_scan`,
/// `can_create_policy`, `can_create_watch`, `can_view_reports`, `is_admin`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationCapability(pub String);

impl OperationCapability {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Operation-to-capability mapping a provider declares, consumed by the
/// permission discoverer's `FilterOperationsByPermissions` step.
pub type OperationMappings = HashMap<String, OperationCapability>;

/// Metadata tying a catalogue entry back to its originating tool instance.
#[derive(Debug, Clone)]
pub struct CatalogueMetadata {
    pub provider: String,
    pub organization_id: Uuid,
    pub tool_id: Uuid,
    pub category: String,
    pub subcategory: Option<String>,
}

/// A projected, machine-readable description of one operation against one
/// tool instance, produced by the expansion service. Stateless — recomputed
/// on demand, never persisted.
#[derive(Debug, Clone)]
pub struct CatalogueEntry {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub metadata: CatalogueMetadata,
}
