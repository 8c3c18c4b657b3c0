//! End-to-end tests for the sync pipeline.
//!
//! These tests exercise the full run using in-memory mocks:
//! MockStore (fetch) → WorkerPool → Enricher → BatchWriter → MockStore (write)
//!
//! The mocks implement the same port traits as the real adapters, so every
//! production code path runs except the actual network transport.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;

use pipeline::{BatchWriter, Enricher, SyncRunner, WorkerPool, WriterConfig};
use sync_core::{Port, ServiceDetail};

use integration_tests::fixtures;
use integration_tests::mocks::{MockSources, MockStore};

fn runner(
    store: Arc<MockStore>,
    sources: Arc<MockSources>,
    workers: usize,
    batch_size: usize,
) -> SyncRunner {
    let enricher = Arc::new(Enricher::new(
        sources.clone(),
        sources.clone(),
        sources,
    ));
    let pool = WorkerPool::new(NonZeroUsize::new(workers).unwrap(), enricher);
    let writer = BatchWriter::new(
        store.clone(),
        WriterConfig {
            batch_size,
            dry_run: false,
        },
    );
    SyncRunner::new(store, pool, writer)
}

/// Full run: 12 circuits, 3 workers, batches of 5.
#[tokio::test]
async fn full_run_writes_every_circuit_exactly_once() {
    let store = Arc::new(MockStore::with_circuits(fixtures::circuits(12)));
    let sources = Arc::new(MockSources::new());

    let stats = runner(store.clone(), sources.clone(), 3, 5)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 12);
    assert_eq!(stats.succeeded, 12);
    assert_eq!(stats.failed, 0);
    assert_eq!(store.batch_sizes(), vec![5, 5, 2]);

    let written = store.written_results();
    let cids: HashSet<&str> = written.iter().map(|r| r.circuit_id.as_str()).collect();
    assert_eq!(cids.len(), 12, "every circuit written exactly once");

    for result in &written {
        assert!(result.is_ok());
        assert_eq!(result.optical_status.as_deref(), Some("1"));
        assert_eq!(result.rx_power.as_deref(), Some("-21.3 dBm"));
        assert_eq!(
            result.pppoe_username.as_deref(),
            Some(format!("{}@isp.example", result.circuit_id).as_str())
        );
        assert_eq!(result.vlan.as_deref(), Some("120"));
    }

    // One call per circuit per source
    assert_eq!(sources.network_calls(), 12);
    assert_eq!(sources.service_calls(), 12);
    assert_eq!(sources.optical_calls(), 12);
}

/// Circuits that arrive with OLT host and ONT address skip the
/// network-info lookup entirely.
#[tokio::test]
async fn routing_hints_skip_network_lookup() {
    let circuits = vec![
        fixtures::circuit_with_hints("cid-a", "olt-west-01", "1/2/3"),
        fixtures::circuit_with_hints("cid-b", "olt-west-01", "1/2/4"),
    ];
    let store = Arc::new(MockStore::with_circuits(circuits));
    let sources = Arc::new(MockSources::new());

    let stats = runner(store.clone(), sources.clone(), 2, 100)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.succeeded, 2);
    assert_eq!(sources.network_calls(), 0);
    assert_eq!(sources.optical_calls(), 2);
}

/// Mixed outcomes across one run: a network-info failure still resolves
/// credentials, a service-detail failure still resolves optics, and the
/// healthy circuit resolves everything.
#[tokio::test]
async fn partial_failures_keep_partial_data() {
    let circuits = vec![
        fixtures::circuit("cid-net"),
        fixtures::circuit("cid-svc"),
        fixtures::circuit("cid-ok"),
    ];
    let store = Arc::new(MockStore::with_circuits(circuits));
    let sources = Arc::new(MockSources::new());
    sources.fail_network_for("cid-net");
    sources.fail_service_for("cid-svc");

    let stats = runner(store.clone(), sources.clone(), 2, 100)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.failed, 2);

    let written = store.written_results();
    assert_eq!(written.len(), 3);

    let by_cid = |cid: &str| written.iter().find(|r| r.circuit_id == cid).unwrap();

    // No location, so no optics; credentials still resolved
    let net = by_cid("cid-net");
    assert!(net.errors.from_port(Port::NetworkInfo));
    assert!(!net.errors.from_port(Port::OpticalInfo));
    assert!(net.optical_status.is_none());
    assert!(net.rx_power.is_none());
    assert_eq!(net.pppoe_username.as_deref(), Some("cid-net@isp.example"));

    // Credentials missing; optics still resolved
    let svc = by_cid("cid-svc");
    assert!(svc.errors.from_port(Port::ServiceDetail));
    assert!(svc.pppoe_username.is_none());
    assert_eq!(svc.optical_status.as_deref(), Some("1"));

    let ok = by_cid("cid-ok");
    assert!(ok.is_ok());

    // The optical lookup only ran for the two circuits with a location
    assert_eq!(sources.optical_calls(), 2);
}

/// A billing system that tracks no VLAN leaves the field unset rather than
/// writing an empty string downstream.
#[tokio::test]
async fn missing_vlan_stays_unset() {
    let store = Arc::new(MockStore::with_circuits(vec![fixtures::circuit("cid-1")]));
    let sources = Arc::new(MockSources::new());
    sources.set_detail(
        "cid-1",
        ServiceDetail {
            username: Some("user@isp.example".to_string()),
            password: Some("s3cret".to_string()),
            vlan: None,
        },
    );

    runner(store.clone(), sources, 1, 100).run_once().await.unwrap();

    let written = store.written_results();
    assert_eq!(written[0].pppoe_username.as_deref(), Some("user@isp.example"));
    assert!(written[0].vlan.is_none());
    assert!(written[0].is_ok());
}

/// Worker count never changes what gets written, only how it interleaves.
#[tokio::test]
async fn result_set_is_invariant_over_worker_count() {
    for workers in [1, 4, 16] {
        let store = Arc::new(MockStore::with_circuits(fixtures::circuits(9)));
        let sources = Arc::new(MockSources::new());

        let stats = runner(store.clone(), sources, workers, 4)
            .run_once()
            .await
            .unwrap();

        assert_eq!(stats.total, 9, "workers={workers}");
        let cids: HashSet<String> = store
            .written_results()
            .iter()
            .map(|r| r.circuit_id.clone())
            .collect();
        assert_eq!(cids.len(), 9, "workers={workers}");
    }
}
