//! Admission bound under load: a bulkhead with `max_concurrent_requests=2`
//! and `queue_size=1` can have at most 3 calls in flight (running or
//! queued) at once; the rest are rejected with `Overloaded`.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use toolgate::contracts::OperationContext;
use toolgate::{GatewayConfig, GatewayCore};
use toolgate_core::GatewayError;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn saturated_bulkhead_rejects_overflow_but_admits_its_bound() {
    let (deps, fixture) = common::build_fixture(Duration::from_millis(80));
    let config = GatewayConfig::builder()
        .max_concurrent_requests(2)
        .queue_size(1)
        .requests_per_minute(6000.0)
        .burst_size(200.0)
        .maintenance_interval(Duration::from_secs(3600))
        .rate_limit_gc_interval(Duration::from_secs(3600))
        .build();

    let gateway = Arc::new(GatewayCore::with_current_runtime(config, deps));
    let token = gateway
        .security()
        .tokens()
        .issue("user-1", "tenant-a", vec!["read".into()])
        .await;

    let mut handles = Vec::new();
    for i in 0..6u32 {
        let gateway = Arc::clone(&gateway);
        let organization_id = fixture.organization_id;
        let instance_id = fixture.instance.id;
        let opaque_value = token.opaque_value.clone();
        handles.push(tokio::spawn(async move {
            let ctx = OperationContext::new(organization_id, opaque_value);
            gateway
                .execute_operation(&ctx, instance_id, "scan", serde_json::json!({ "i": i }))
                .await
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.expect("spawned task panicked"));
    }

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let overloaded = results
        .iter()
        .filter(|r| matches!(r, Err(GatewayError::Overloaded)))
        .count();

    assert_eq!(succeeded + overloaded, 6, "every call resolves one way or the other");
    assert!(
        overloaded >= 1,
        "6 calls against a bound of 3 in flight (2 active + 1 queued) must reject at least one"
    );
    assert!(succeeded >= 1);

    let max_active = fixture.provider.max_active_seen.load(Ordering::SeqCst);
    assert!(
        max_active <= 2,
        "provider saw {max_active} concurrent calls but max_concurrent_requests was 2"
    );

    let gateway = Arc::try_unwrap(gateway)
        .unwrap_or_else(|_| panic!("gateway still shared after all calls completed"));
    gateway.shutdown().await;
}
