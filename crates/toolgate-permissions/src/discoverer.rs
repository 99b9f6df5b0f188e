//! Probes a provider's read-only endpoints with a caller's token and derives
//! a coarse capability set and scope list from the responses.

use crate::error::PermissionError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::warn;

/// One read-only endpoint probed during discovery, and what each outcome
/// means for the derived capability set.
struct Probe {
    path: &'static str,
    capability: &'static str,
}

const PROBES: &[Probe] = &[
    Probe {
        path: "policies",
        capability: "can_create_policy",
    },
    Probe {
        path: "watches",
        capability: "can_create_watch",
    },
    Probe {
        path: "reports/__toolgate_probe__",
        capability: "can_view_reports",
    },
    Probe {
        path: "admin/users",
        capability: "is_admin",
    },
];

/// Derived capability set from a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    pub can_scan: bool,
    pub can_create_policy: bool,
    pub can_create_watch: bool,
    pub can_view_reports: bool,
    pub is_admin: bool,
}

impl Capabilities {
    /// Flattens the capability set into a scope string list.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes = Vec::new();
        if self.can_scan {
            scopes.push("scan".to_string());
        }
        if self.can_create_policy {
            scopes.push("policy:write".to_string());
        }
        if self.can_create_watch {
            scopes.push("watch:write".to_string());
        }
        if self.can_view_reports {
            scopes.push("reports:read".to_string());
        }
        if self.is_admin {
            scopes.push("admin".to_string());
        }
        scopes
    }
}

/// Picks the auth header for a token, based on shape alone: a JWT (`ey`
/// prefix, three dot-separated segments) uses a bearer scheme; anything
/// else is treated as a provider-native API key. Never sends both.
pub fn auth_header(token: &str) -> (&'static str, String) {
    let looks_like_jwt = token.starts_with("ey") && token.splitn(4, '.').count() == 3;
    if looks_like_jwt {
        ("Authorization", format!("Bearer {token}"))
    } else {
        ("X-Api-Key", token.to_string())
    }
}

/// Probes a provider's read-only endpoints and derives a [`Capabilities`]
/// set. Never fails outright: classification-unknown responses are logged
/// and treated as "unknown", not propagated as errors.
pub struct PermissionDiscoverer {
    client: Client,
    timeout: Duration,
}

impl PermissionDiscoverer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    /// Runs the full probe sequence against `base_url` using `token`.
    /// `can_scan` reflects whether `version/info` returned success.
    ///
    /// Returns `Err` only when the provider could not be reached at all
    /// (the initial `version/info` call transport-errors) — that is a
    /// discovery failure the caller should default-allow on, distinct from
    /// a reachable provider whose probes classify the caller as
    /// unprivileged.
    pub async fn discover(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<Capabilities, PermissionError> {
        let (header_name, header_value) = auth_header(token);
        let mut capabilities = Capabilities::default();

        let info_url = format!("{}/version/info", base_url.trim_end_matches('/'));
        let info_response = self
            .client
            .get(&info_url)
            .header(header_name, &header_value)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| PermissionError::DiscoveryFailed {
                provider: base_url.to_string(),
                reason: err.to_string(),
            })?;
        capabilities.can_scan = info_response.status().is_success();

        for probe in PROBES {
            let url = format!("{}/{}", base_url.trim_end_matches('/'), probe.path);
            let outcome = self
                .client
                .get(&url)
                .header(header_name, &header_value)
                .timeout(self.timeout)
                .send()
                .await;

            let granted = match outcome {
                Ok(resp) => match resp.status() {
                    StatusCode::FORBIDDEN => false,
                    StatusCode::NOT_FOUND => true,
                    status if status.is_success() => true,
                    status => {
                        #[cfg(feature = "tracing")]
                        warn!(probe = probe.path, %status, "unrecognized probe response, treating as unknown");
                        false
                    }
                },
                Err(_) => false,
            };

            match probe.capability {
                "can_create_policy" => capabilities.can_create_policy = granted,
                "can_create_watch" => capabilities.can_create_watch = granted,
                "can_view_reports" => capabilities.can_view_reports = granted,
                "is_admin" => capabilities.is_admin = granted,
                _ => {}
            }
        }

        Ok(capabilities)
    }

    /// Filters `operations` (the provider's declared operation mapping:
    /// operation name → owning capability) down to those the caller's
    /// capability set grants. Operations with no declared owning capability
    /// default to allowed when `can_scan` (the base feature) is present.
    pub fn filter_operations(
        &self,
        capabilities: &Capabilities,
        operations: &[(String, Option<String>)],
    ) -> Vec<String> {
        operations
            .iter()
            .filter(|(_, owning_capability)| match owning_capability.as_deref() {
                Some("can_create_policy") => capabilities.can_create_policy,
                Some("can_create_watch") => capabilities.can_create_watch,
                Some("can_view_reports") => capabilities.can_view_reports,
                Some("is_admin") => capabilities.is_admin,
                Some(_) | None => capabilities.can_scan,
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_shaped_token_uses_bearer_scheme() {
        let (name, value) = auth_header("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.sig");
        assert_eq!(name, "Authorization");
        assert!(value.starts_with("Bearer "));
    }

    #[test]
    fn opaque_token_uses_api_key_header() {
        let (name, value) = auth_header("sk_live_abcdef1234567890");
        assert_eq!(name, "X-Api-Key");
        assert_eq!(value, "sk_live_abcdef1234567890");
    }

    #[test]
    fn capabilities_flatten_into_expected_scopes() {
        let capabilities = Capabilities {
            can_scan: true,
            can_create_policy: true,
            can_create_watch: false,
            can_view_reports: true,
            is_admin: false,
        };
        let scopes = capabilities.scopes();
        assert!(scopes.contains(&"scan".to_string()));
        assert!(scopes.contains(&"policy:write".to_string()));
        assert!(scopes.contains(&"reports:read".to_string()));
        assert!(!scopes.contains(&"watch:write".to_string()));
    }

    #[test]
    fn filter_operations_defaults_unknown_to_base_feature() {
        let discoverer = PermissionDiscoverer::new(Duration::from_secs(1));
        let capabilities = Capabilities {
            can_scan: true,
            can_create_policy: false,
            can_create_watch: false,
            can_view_reports: false,
            is_admin: false,
        };
        let operations = vec![
            ("list_repos".to_string(), None),
            ("create_policy".to_string(), Some("can_create_policy".to_string())),
        ];
        let allowed = discoverer.filter_operations(&capabilities, &operations);
        assert_eq!(allowed, vec!["list_repos".to_string()]);
    }

    #[test]
    fn filter_operations_denies_when_base_feature_absent() {
        let discoverer = PermissionDiscoverer::new(Duration::from_secs(1));
        let capabilities = Capabilities::default();
        let operations = vec![("list_repos".to_string(), None)];
        assert!(discoverer.filter_operations(&capabilities, &operations).is_empty());
    }
}
