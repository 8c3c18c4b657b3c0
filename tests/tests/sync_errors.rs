//! Failure-path tests for the sync pipeline.

use std::num::NonZeroUsize;
use std::sync::Arc;

use pipeline::{BatchWriter, Enricher, SyncRunner, WorkerPool, WriterConfig};
use sync_core::Error;

use integration_tests::fixtures;
use integration_tests::mocks::{MockSources, MockStore};

fn runner_with(
    store: Arc<MockStore>,
    sources: Arc<MockSources>,
    batch_size: usize,
    dry_run: bool,
) -> SyncRunner {
    let enricher = Arc::new(Enricher::new(
        sources.clone(),
        sources.clone(),
        sources,
    ));
    let pool = WorkerPool::new(NonZeroUsize::new(2).unwrap(), enricher);
    let writer = BatchWriter::new(store.clone(), WriterConfig { batch_size, dry_run });
    SyncRunner::new(store, pool, writer)
}

/// An unreachable store at fetch time aborts the run before any lookups.
#[tokio::test]
async fn fetch_failure_aborts_the_run() {
    let store = Arc::new(MockStore::with_circuits(fixtures::circuits(3)));
    store.set_fail_fetch(true);
    let sources = Arc::new(MockSources::new());

    let err = runner_with(store.clone(), sources.clone(), 100, false)
        .run_once()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Store(_)));
    assert_eq!(sources.network_calls(), 0);
    assert!(store.captured_batches().is_empty());
}

/// A write failure drops that batch but the run keeps flushing the rest.
#[tokio::test]
async fn batch_write_failure_does_not_abort_the_run() {
    let store = Arc::new(MockStore::with_circuits(fixtures::circuits(20)));
    store.fail_next_writes(1);
    let sources = Arc::new(MockSources::new());

    let stats = runner_with(store.clone(), sources, 10, false)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 20);
    assert_eq!(stats.batch_failures, 1);
    assert_eq!(stats.batches_written, 1);
    assert_eq!(store.batch_sizes(), vec![10]);
}

/// Nothing pending: the run is a no-op with zeroed stats.
#[tokio::test]
async fn empty_fetch_is_a_noop() {
    let store = Arc::new(MockStore::new());
    let sources = Arc::new(MockSources::new());

    let stats = runner_with(store.clone(), sources.clone(), 100, false)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 0);
    assert_eq!(stats.batches_written, 0);
    assert_eq!(sources.network_calls(), 0);
    assert!(store.captured_batches().is_empty());
}

/// Every lookup failing still produces a row per circuit, carrying the
/// accumulated errors, and the row is written back.
#[tokio::test]
async fn total_lookup_failure_still_writes_a_row() {
    let store = Arc::new(MockStore::with_circuits(vec![fixtures::circuit("cid-down")]));
    let sources = Arc::new(MockSources::new());
    sources.fail_network_for("cid-down");
    sources.fail_service_for("cid-down");

    let stats = runner_with(store.clone(), sources, 100, false)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 1);
    assert_eq!(stats.failed, 1);

    let written = store.written_results();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].circuit_id, "cid-down");
    assert_eq!(written[0].errors.len(), 2);
    assert!(!written[0].is_ok());
}

/// Dry run: batches are counted but never reach the store.
#[tokio::test]
async fn dry_run_never_touches_the_store() {
    let store = Arc::new(MockStore::with_circuits(fixtures::circuits(7)));
    let sources = Arc::new(MockSources::new());

    let stats = runner_with(store.clone(), sources, 3, true)
        .run_once()
        .await
        .unwrap();

    assert_eq!(stats.total, 7);
    assert_eq!(stats.batches_written, 3);
    assert!(store.captured_batches().is_empty());
}
