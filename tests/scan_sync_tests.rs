//! End-to-end behavior of the list synchronizer, detail tracker, and
//! console wiring against the in-memory API.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;

use common::{detail, scan, FakeScanApi};
use rankey_console::application::scan_detail::ScanDetailTracker;
use rankey_console::application::scan_list::ScanListSynchronizer;
use rankey_console::console::ScanConsole;
use rankey_console::domain::entities::{ScanState, ScanType, Selection};
use rankey_console::domain::events::RefreshSignal;
use rankey_console::domain::scan_config::ScanConfig;
use rankey_console::domain::value_objects::{Marketplace, ScanId};
use rankey_console::infrastructure::config::AppConfig;

fn many_scans(count: usize) -> Vec<rankey_console::domain::entities::Scan> {
    (0..count)
        .map(|n| scan(&format!("scan-{n}"), ScanState::Completed))
        .collect()
}

fn asin_config(tokens: &[&str]) -> ScanConfig {
    ScanConfig::Asins {
        marketplace: Marketplace::Com,
        asins: tokens
            .iter()
            .map(|t| t.parse().unwrap())
            .collect(),
        products_concurrent_requests: 100,
        max_rerequests: 3,
        min_rank: 1,
        max_rank: 10000,
        expires_at: None,
    }
}

#[tokio::test]
async fn fetch_page_replaces_contents_and_total() {
    let api = FakeScanApi::with_scans(many_scans(25));
    let list = ScanListSynchronizer::new(Arc::new(api));

    tokio_test::assert_ok!(list.fetch_page(1).await);
    let state = list.snapshot().await;
    assert_eq!(state.scans.len(), 10);
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.current_page, 1);
}

#[tokio::test]
async fn out_of_range_page_is_clamped_not_left_dangling() {
    let api = FakeScanApi::with_scans(many_scans(25));
    let list = ScanListSynchronizer::new(Arc::new(api));

    // The server reports 3 total pages; asking for page 5 must not leave
    // the current page dangling past the end.
    list.fetch_page(5).await.unwrap();
    let state = list.snapshot().await;
    assert_eq!(state.total_pages, 3);
    assert_eq!(state.current_page, 3);

    // The next refresh navigates with the clamped page and gets contents.
    list.refresh().await.unwrap();
    assert_eq!(list.snapshot().await.scans.len(), 5);
}

#[tokio::test]
async fn deleting_the_selected_scan_clears_the_selection() {
    let api = FakeScanApi::with_scans(many_scans(3));
    let list = ScanListSynchronizer::new(Arc::new(api));
    list.fetch_page(1).await.unwrap();

    let id = ScanId::from("scan-1");
    list.select(id.clone()).await;
    assert!(list.selected_scan().await.is_some());

    list.delete(&id).await.unwrap();
    assert_eq!(list.selection().await, Selection::None);
    assert_eq!(list.snapshot().await.scans.len(), 2);
}

#[tokio::test]
async fn deleting_another_scan_keeps_the_selection() {
    let api = FakeScanApi::with_scans(many_scans(3));
    let list = ScanListSynchronizer::new(Arc::new(api));
    list.fetch_page(1).await.unwrap();

    list.select(ScanId::from("scan-0")).await;
    list.delete(&ScanId::from("scan-2")).await.unwrap();
    assert!(list.selection().await.is_selected(&ScanId::from("scan-0")));
}

#[tokio::test]
async fn delete_all_clears_everything() {
    let api = FakeScanApi::with_scans(many_scans(12));
    let list = ScanListSynchronizer::new(Arc::new(api));
    list.fetch_page(2).await.unwrap();
    list.select(ScanId::from("scan-11")).await;

    tokio_test::assert_ok!(list.delete_all().await);
    let state = list.snapshot().await;
    assert!(state.scans.is_empty());
    assert_eq!(state.selection, Selection::None);
    assert_eq!(state.total_pages, 1);
    assert_eq!(state.current_page, 1);
}

#[tokio::test]
async fn lifecycle_actions_force_a_refetch() {
    let api = FakeScanApi::with_scans(vec![scan("a", ScanState::Active)]);
    let list = ScanListSynchronizer::new(Arc::new(api.clone()));
    list.fetch_page(1).await.unwrap();
    let before = api.list_fetches();

    list.halt().await.unwrap();
    assert_eq!(api.list_fetches(), before + 1);
    assert_eq!(list.snapshot().await.scans[0].state, ScanState::Paused);

    list.resume().await.unwrap();
    assert_eq!(api.list_fetches(), before + 2);
    assert_eq!(list.snapshot().await.scans[0].state, ScanState::Active);
}

#[tokio::test]
async fn created_scan_appears_enqueued_and_is_confirmed() {
    let api = FakeScanApi::new();
    let list = ScanListSynchronizer::new(Arc::new(api.clone()));
    list.fetch_page(1).await.unwrap();

    let created = list.create(&asin_config(&["B000000000"])).await.unwrap();
    assert_eq!(created.state, ScanState::Enqueued);
    assert_eq!(created.scan_type, ScanType::Asins);

    let state = list.snapshot().await;
    assert_eq!(state.scans.len(), 1);
    assert_eq!(state.scans[0].id, created.id);
}

#[tokio::test]
async fn submitted_payload_carries_each_asin_once() {
    // Wire-shape check: duplicate tokens collapse before the payload is
    // serialized because the identifier set is the only entry path.
    let api = FakeScanApi::new();
    let list = ScanListSynchronizer::new(Arc::new(api.clone()));
    list.fetch_page(1).await.unwrap();

    let mut builder =
        rankey_console::application::config_builder::ScanConfigBuilder::default();
    builder.set_scan_type(ScanType::Asins);
    builder.asins().add_one("B000000000").unwrap();
    assert!(builder.asins().add_one("B000000000").is_err());
    builder.submit(&list).await.unwrap();

    let payload = {
        let state = api.state();
        assert_eq!(state.enqueued.len(), 1);
        serde_json::to_value(&state.enqueued[0]).unwrap()
    };
    assert_eq!(payload["asins"], serde_json::json!(["B000000000"]));

    // Transient entry state cleared, structural settings intact.
    assert!(builder.asin_entries().is_empty());
    assert_eq!(builder.scan_type(), ScanType::Asins);
}

#[tokio::test(start_paused = true)]
async fn later_selection_wins_over_a_pending_fetch() {
    let api = FakeScanApi::with_scans(vec![
        scan("a", ScanState::Completed),
        scan("b", ScanState::Completed),
    ]);
    let id_a = ScanId::from("a");
    let id_b = ScanId::from("b");
    api.push_detail(&id_a, detail(ScanState::Completed, 111));
    api.push_detail(&id_b, detail(ScanState::Completed, 222));
    api.set_detail_delay(&id_a, Duration::from_secs(30));
    api.set_detail_delay(&id_b, Duration::from_secs(1));

    let tracker = ScanDetailTracker::new(Arc::new(api), Duration::from_secs(3));

    // Scan A's fetch is still pending when the operator switches to B.
    let pending = {
        let tracker = tracker.clone();
        let id_a = id_a.clone();
        tokio::spawn(async move { tracker.select(Selection::Selected(id_a)).await })
    };
    tokio::task::yield_now().await;

    tracker.select(Selection::Selected(id_b.clone())).await;
    pending.await.unwrap();

    let snapshot = tracker.snapshot().await.expect("detail for b");
    assert_eq!(snapshot.records_gathered, 222);
    assert_eq!(tracker.selection().await, Selection::Selected(id_b));
}

#[tokio::test(start_paused = true)]
async fn detail_polling_stops_when_the_scan_completes() {
    let api = FakeScanApi::new();
    let id = ScanId::from("live");
    api.push_detail(&id, detail(ScanState::Active, 10));
    api.push_detail(&id, detail(ScanState::Active, 20));
    api.push_detail(&id, detail(ScanState::Completed, 30));

    let tracker = ScanDetailTracker::new(Arc::new(api.clone()), Duration::from_secs(3));
    tracker.select(Selection::Selected(id.clone())).await;
    assert_eq!(api.detail_fetches(&id), 1);

    // Two poll ticks: the second observes the completed state.
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(api.detail_fetches(&id), 2);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(api.detail_fetches(&id), 3);

    // The next ticks schedule no further poll.
    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(api.detail_fetches(&id), 3);
    assert_eq!(
        tracker.snapshot().await.unwrap().state,
        ScanState::Completed
    );
}

#[tokio::test(start_paused = true)]
async fn changing_selection_tears_down_the_poll_interval() {
    let api = FakeScanApi::new();
    let id = ScanId::from("live");
    api.push_detail(&id, detail(ScanState::Active, 10));
    let done = ScanId::from("done");
    api.push_detail(&done, detail(ScanState::Completed, 99));

    let tracker = ScanDetailTracker::new(Arc::new(api.clone()), Duration::from_secs(3));
    tracker.select(Selection::Selected(id.clone())).await;
    tokio::time::sleep(Duration::from_secs(7)).await;
    let while_active = api.detail_fetches(&id);
    assert!(while_active >= 2);

    tracker.select(Selection::Selected(done.clone())).await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    // The old selection's interval is gone; no further fetches for it.
    assert_eq!(api.detail_fetches(&id), while_active);
    assert_eq!(tracker.snapshot().await.unwrap().records_gathered, 99);
}

#[tokio::test(start_paused = true)]
async fn console_surfaces_refresh_errors_on_the_banner() {
    let api = FakeScanApi::with_scans(many_scans(2));
    let config = AppConfig::default();
    let mut console = ScanConsole::new(Arc::new(api.clone()), &config);
    console.scans.fetch_page(1).await.unwrap();
    console.start();

    api.state().fail_list_fetches = true;
    console
        .refresh_handle()
        .send(RefreshSignal::Manual)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let banner = console.banner.current().expect("error banner");
    assert!(banner.contains("list unavailable"));
    console.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn console_delete_stops_detail_tracking_for_the_selected_scan() {
    let api = FakeScanApi::with_scans(vec![scan("x", ScanState::Active)]);
    let id = ScanId::from("x");
    api.push_detail(&id, detail(ScanState::Active, 1));

    let config = AppConfig::default();
    let mut console = ScanConsole::new(Arc::new(api.clone()), &config);
    console.scans.fetch_page(1).await.unwrap();

    console.select_scan(id.clone()).await;
    assert!(console.details.snapshot().await.is_some());

    console.delete_scan(&id).await.unwrap();
    assert_eq!(console.scans.selection().await, Selection::None);
    assert_eq!(console.details.selection().await, Selection::None);
    assert!(console.details.snapshot().await.is_none());

    let after_delete = api.detail_fetches(&id);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.detail_fetches(&id), after_delete);
    console.shutdown().await;
}
