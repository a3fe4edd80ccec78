use dg_sync_core::status::StatusTopic;
use dg_sync_status::{
    AggregatorHandle, ApplyOutcome, LifecycleState, ScopeKind, SyncStatusAggregator,
    POLL_INTERVAL,
};
use dg_sync_tests::{chain_state, init_logger, wallet_state, MockBackend, MockController};
use std::sync::Arc;

async fn started(
    ctl: &mut MockController,
    aggregator: &mut SyncStatusAggregator<MockBackend>,
    local_height: u64,
    network_height: u64,
) {
    aggregator.start();
    let fetch = ctl.next_fetch().await;
    assert_eq!(fetch.topic, StatusTopic::Chain);
    fetch.chain(chain_state(local_height, network_height, true));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
}

#[tokio::test(start_paused = true)]
async fn test_caught_up_chain() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    started(&mut ctl, &mut aggregator, 100, 100).await;
    assert_eq!(aggregator.derived_metrics().blocks_behind, 0);
    assert_eq!(aggregator.derived_metrics().wallet_blocks_behind, None);
    assert!(aggregator.current_chain_sync_state().is_synced());
    assert_eq!(
        aggregator.chain_lifecycle().state(),
        LifecycleState::Active
    );
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_wallet_behind_chain() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    let snapshots = aggregator.subscribe();
    started(&mut ctl, &mut aggregator, 100, 100).await;

    aggregator.open_wallet("wallet-a");
    let fetch = ctl.next_fetch().await;
    assert_eq!(fetch.topic, StatusTopic::WalletSync);
    assert_eq!(fetch.wallet_id.as_deref(), Some("wallet-a"));
    fetch.wallet(wallet_state("wallet-a", 90));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));

    assert_eq!(aggregator.derived_metrics().wallet_blocks_behind, Some(10));
    let snapshot = snapshots.borrow().clone();
    assert_eq!(snapshot.active_wallet.as_deref(), Some("wallet-a"));
    assert_eq!(snapshot.view.wallet_blocks_behind, Some(10));
    assert_eq!(snapshot.wallet.map(|w| w.last_synced_block), Some(90));
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_push_then_poll_last_write_wins() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    started(&mut ctl, &mut aggregator, 100, 150).await;
    let feed = ctl.next_chain_feed().await;

    assert!(feed.push(chain_state(140, 150, true)).await);
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    assert_eq!(aggregator.current_chain_sync_state().local_height, 140);

    // A poll that reports a lower height still replaces the pushed record.
    ctl.next_fetch().await.chain(chain_state(90, 150, true));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    assert_eq!(aggregator.current_chain_sync_state().local_height, 90);
    assert_eq!(aggregator.derived_metrics().blocks_behind, 60);
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_repeated_failures_keep_last_state() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    let snapshots = aggregator.subscribe();
    started(&mut ctl, &mut aggregator, 100, 100).await;
    for attempt in 1..=3u32 {
        ctl.next_fetch().await.fail("connection refused");
        assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Failed));
        assert_eq!(
            aggregator.reconciler().consecutive_failures(ScopeKind::Chain),
            attempt
        );
    }
    let chain = aggregator.current_chain_sync_state();
    assert!(chain.connected);
    assert_eq!(chain.local_height, 100);
    let snapshot = snapshots.borrow().clone();
    assert_eq!(snapshot.chain_failures, 3);
    assert_eq!(snapshot.recent_errors.len(), 3);

    ctl.next_fetch().await.chain(chain_state(101, 101, true));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    assert_eq!(
        aggregator.reconciler().consecutive_failures(ScopeKind::Chain),
        0
    );
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_close_wallet_mid_fetch() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    started(&mut ctl, &mut aggregator, 100, 100).await;

    aggregator.open_wallet("wallet-a");
    let fetch = ctl.next_fetch().await;
    let feed = ctl.next_wallet_feed().await;
    aggregator.close_wallet();
    assert!(aggregator.current_wallet_sync_state().is_none());
    assert!(feed.wait_released().await);

    fetch.wallet(wallet_state("wallet-a", 95));
    assert_eq!(
        aggregator.process_next().await,
        Some(ApplyOutcome::StaleGeneration)
    );
    assert!(aggregator.current_wallet_sync_state().is_none());
    assert_eq!(aggregator.derived_metrics().wallet_blocks_behind, None);
    assert_eq!(
        aggregator.wallet_lifecycle().state(),
        LifecycleState::Inactive
    );
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_switch_wallet_discards_previous() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    started(&mut ctl, &mut aggregator, 100, 100).await;

    aggregator.open_wallet("wallet-a");
    ctl.next_fetch().await.wallet(wallet_state("wallet-a", 80));
    let feed_a = ctl.next_wallet_feed().await;
    let late_a = aggregator.next_delivery().await.unwrap();

    aggregator.open_wallet("wallet-b");
    assert!(feed_a.wait_released().await);
    assert_eq!(
        aggregator.handle_delivery(late_a),
        ApplyOutcome::StaleGeneration
    );
    assert!(aggregator.current_wallet_sync_state().is_none());

    let fetch = ctl.next_fetch().await;
    assert_eq!(fetch.wallet_id.as_deref(), Some("wallet-b"));
    fetch.wallet(wallet_state("wallet-b", 99));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    let wallet = aggregator.current_wallet_sync_state().cloned().unwrap();
    assert_eq!(wallet.wallet_id, "wallet-b");
    assert_eq!(aggregator.derived_metrics().wallet_blocks_behind, Some(1));

    // A push that names another wallet under the current generation is dropped.
    let feed_b = ctl.next_wallet_feed().await;
    assert!(feed_b.push(wallet_state("wallet-a", 10)).await);
    assert_eq!(
        aggregator.process_next().await,
        Some(ApplyOutcome::WalletMismatch)
    );
    assert_eq!(
        aggregator
            .current_wallet_sync_state()
            .map(|w| w.last_synced_block),
        Some(99)
    );
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_failure_keeps_polling() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    backend.refuse_subscriptions(true);
    let mut aggregator = SyncStatusAggregator::new(backend.clone());
    aggregator.start();
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Failed));
    ctl.next_fetch().await.chain(chain_state(10, 20, true));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));

    ctl.next_fetch().await.chain(chain_state(15, 20, true));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    assert_eq!(aggregator.current_chain_sync_state().local_height, 15);
    assert_eq!(backend.fetch_count(), 2);
    assert_eq!(aggregator.chain_lifecycle().state(), LifecycleState::Active);
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_absent_wallet_keeps_state() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend);
    started(&mut ctl, &mut aggregator, 100, 100).await;
    aggregator.open_wallet("wallet-a");
    ctl.next_fetch().await.wallet(wallet_state("wallet-a", 50));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));

    let mut fetch = ctl.next_fetch().await;
    if fetch.topic == StatusTopic::Chain {
        fetch.chain(chain_state(100, 100, true));
        assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
        fetch = ctl.next_fetch().await;
    }
    assert_eq!(fetch.topic, StatusTopic::WalletSync);
    fetch.absent();
    assert_eq!(
        aggregator.process_next().await,
        Some(ApplyOutcome::Unchanged)
    );
    assert_eq!(
        aggregator
            .current_wallet_sync_state()
            .map(|w| w.last_synced_block),
        Some(50)
    );
    aggregator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_everything() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let mut aggregator = SyncStatusAggregator::new(backend.clone());
    started(&mut ctl, &mut aggregator, 100, 100).await;
    let chain_feed = ctl.next_chain_feed().await;
    aggregator.open_wallet("wallet-a");
    ctl.next_fetch().await.wallet(wallet_state("wallet-a", 100));
    assert_eq!(aggregator.process_next().await, Some(ApplyOutcome::Applied));
    let wallet_feed = ctl.next_wallet_feed().await;

    aggregator.shutdown();
    assert!(chain_feed.wait_released().await);
    assert!(wallet_feed.wait_released().await);
    assert!(!aggregator.chain_lifecycle().is_running());
    assert!(!aggregator.wallet_lifecycle().is_running());
    assert!(aggregator.current_wallet_sync_state().is_none());

    let fetches = backend.fetch_count();
    tokio::time::sleep(POLL_INTERVAL * 3).await;
    assert_eq!(backend.fetch_count(), fetches);
    assert!(ctl.try_next_fetch().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_handle_end_to_end() {
    init_logger();
    let (backend, mut ctl) = MockBackend::new();
    let handle = AggregatorHandle::spawn(backend.clone());
    let mut snapshots = handle.subscribe();

    ctl.next_fetch().await.chain(chain_state(200, 210, true));
    snapshots
        .wait_for(|s| s.chain.local_height == 200)
        .await
        .unwrap();
    assert_eq!(handle.derived_metrics().blocks_behind, 10);

    handle.open_wallet("wallet-a").unwrap();
    let fetch = ctl.next_fetch().await;
    assert_eq!(fetch.wallet_id.as_deref(), Some("wallet-a"));
    fetch.wallet(wallet_state("wallet-a", 195));
    snapshots.wait_for(|s| s.wallet.is_some()).await.unwrap();
    assert_eq!(handle.derived_metrics().wallet_blocks_behind, Some(5));

    let wallet_feed = ctl.next_wallet_feed().await;
    assert!(wallet_feed.push(wallet_state("wallet-a", 200)).await);
    snapshots
        .wait_for(|s| s.view.wallet_blocks_behind == Some(0))
        .await
        .unwrap();

    handle.close_wallet().unwrap();
    snapshots.wait_for(|s| s.wallet.is_none()).await.unwrap();
    assert!(wallet_feed.wait_released().await);
    assert!(handle.current_wallet_sync_state().is_none());
    assert_eq!(handle.current_chain_sync_state().local_height, 200);

    handle.shutdown().await.unwrap();
}
