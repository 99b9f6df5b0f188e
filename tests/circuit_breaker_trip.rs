//! Circuit trip and half-open recovery: a breaker with
//! `max_requests=2, failure_ratio=0.5` trips after two failures out of two
//! samples, rejects calls without reaching the provider while open, and
//! closes again after two consecutive half-open successes.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;
use toolgate::contracts::OperationContext;
use toolgate::{GatewayConfig, GatewayCore};
use toolgate_circuitbreaker::CircuitState;
use toolgate_core::GatewayError;

#[tokio::test]
async fn breaker_trips_rejects_then_recovers_on_half_open_successes() {
    let (deps, fixture) = common::build_fixture(Duration::ZERO);
    fixture.provider.fail.store(true, Ordering::SeqCst);

    let config = GatewayConfig::builder()
        .circuit_breaker_max_requests(2)
        .circuit_breaker_interval(Duration::from_secs(60))
        .circuit_breaker_timeout(Duration::from_millis(150))
        .circuit_breaker_ratio(0.5)
        .requests_per_minute(6000.0)
        .burst_size(200.0)
        .maintenance_interval(Duration::from_secs(3600))
        .rate_limit_gc_interval(Duration::from_secs(3600))
        .build();

    let gateway = GatewayCore::with_current_runtime(config, deps);
    let token = gateway
        .security()
        .tokens()
        .issue("user-1", "tenant-a", vec!["read".into()])
        .await;
    let ctx = OperationContext::new(fixture.organization_id, token.opaque_value.clone());

    for _ in 0..2 {
        let result = gateway
            .execute_operation(&ctx, fixture.instance.id, "scan", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(GatewayError::ProviderError { .. })));
    }

    let rejected = gateway
        .execute_operation(&ctx, fixture.instance.id, "scan", serde_json::json!({}))
        .await;
    assert!(
        matches!(rejected, Err(GatewayError::CircuitOpen { .. })),
        "breaker should be open after two failures out of a two-sample window"
    );
    assert_eq!(
        fixture.provider.calls.load(Ordering::SeqCst),
        2,
        "the open breaker must reject without ever calling the provider"
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    fixture.provider.fail.store(false, Ordering::SeqCst);

    for _ in 0..2 {
        let result = gateway
            .execute_operation(&ctx, fixture.instance.id, "scan", serde_json::json!({}))
            .await;
        assert!(result.is_ok(), "half-open probes should reach the now-healthy provider");
    }

    let health = gateway.health_status();
    let fixture_health = health.get("fixture").expect("fixture provider has a health record");
    assert_eq!(fixture_health.state, CircuitState::Closed);

    gateway.shutdown().await;
}
