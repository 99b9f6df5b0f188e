//! Expansion service (spec §4.12): projects a tenant's active tool
//! instances into a flat, stateless catalogue of operations an external
//! consumer (e.g. an MCP client) can call.

use crate::contracts::{ProviderRegistry, TemplateRepository};
use crate::types::{CatalogueEntry, CatalogueMetadata, ToolInstance};
use std::sync::Arc;
use toolgate_core::GatewayError;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Reads tool instances, their templates, and the provider's AI-oriented
/// operation descriptors, and renders one [`CatalogueEntry`] per
/// descriptor. Never touches the dispatch path — this is a read-only,
/// on-demand projection.
pub struct ExpansionService {
    templates: Arc<dyn TemplateRepository>,
    providers: Arc<dyn ProviderRegistry>,
}

impl ExpansionService {
    pub fn new(templates: Arc<dyn TemplateRepository>, providers: Arc<dyn ProviderRegistry>) -> Self {
        Self {
            templates,
            providers,
        }
    }

    /// Expands every active instance in `instances` into its catalogue
    /// entries. An instance whose template or provider cannot be resolved
    /// is skipped with a warning rather than failing the whole catalogue.
    pub async fn expand_to_mcp_tools(
        &self,
        instances: &[ToolInstance],
    ) -> Result<Vec<CatalogueEntry>, GatewayError> {
        let mut entries = Vec::new();

        for instance in instances {
            if !instance.is_dispatchable() {
                continue;
            }

            let Some(template) = self.templates.get_by_id(instance.template_id).await? else {
                #[cfg(feature = "tracing")]
                warn!(tool_id = %instance.id, "skipping instance: template not found");
                continue;
            };

            let Some(provider) = self.providers.get_provider(&template.provider_name) else {
                #[cfg(feature = "tracing")]
                warn!(provider = %template.provider_name, "skipping instance: provider not registered");
                continue;
            };

            for descriptor in provider.ai_optimized_definitions() {
                entries.push(CatalogueEntry {
                    name: format!("{}_{}", template.provider_name, descriptor.operation),
                    description: descriptor.description,
                    input_schema: project_schema(&descriptor.input_schema),
                    metadata: CatalogueMetadata {
                        provider: template.provider_name.clone(),
                        organization_id: instance.organization_id,
                        tool_id: instance.id,
                        category: template.category.clone(),
                        subcategory: descriptor.subcategory,
                    },
                });
            }
        }

        Ok(entries)
    }
}

/// Projects a JSON Schema down to the subset spec §4.12 names: `type`,
/// `properties` (each keeping only `type`, `description`, `examples`), and
/// `required`. Every other field (AI hints, vendor extensions) is dropped.
fn project_schema(schema: &serde_json::Value) -> serde_json::Value {
    let mut projected = serde_json::Map::new();

    if let Some(ty) = schema.get("type") {
        projected.insert("type".to_string(), ty.clone());
    }

    if let Some(serde_json::Value::Object(properties)) = schema.get("properties") {
        let mut projected_properties = serde_json::Map::new();
        for (name, property) in properties {
            let mut projected_property = serde_json::Map::new();
            for field in ["type", "description", "examples"] {
                if let Some(value) = property.get(field) {
                    projected_property.insert(field.to_string(), value.clone());
                }
            }
            projected_properties.insert(name.clone(), serde_json::Value::Object(projected_property));
        }
        projected.insert(
            "properties".to_string(),
            serde_json::Value::Object(projected_properties),
        );
    }

    if let Some(required) = schema.get("required") {
        projected.insert("required".to_string(), required.clone());
    }

    serde_json::Value::Object(projected)
}
