#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `ScaffoldAppBuilder` and reload fan-in across controllers.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use common::{wait_for, work, works_fixture, RecordingNotifier};
use ledger_scaffold_app::ScaffoldApp;
use ledger_scaffold_core::config::ScaffoldConfig;
use ledger_scaffold_core::error::ScaffoldError;
use ledger_scaffold_core::services::{NavigationScope, ReloadOutcome};
use ledger_scaffold_core::types::{EntityType, NotificationKind};

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

#[tokio::test]
async fn test_builder_defaults() {
    let app = ScaffoldApp::builder().build().unwrap();
    assert_eq!(app.config(), &ScaffoldConfig::default());
    assert_eq!(app.publish_reload(EntityType::Work), 0);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = ScaffoldConfig {
        reload_channel_capacity: 0,
        ..ScaffoldConfig::default()
    };
    let result = ScaffoldApp::builder().config(config).build();
    assert!(matches!(result, Err(ScaffoldError::Config(_))));
}

#[tokio::test]
async fn test_config_file_sets_show_deleted_default() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"showDeletedByDefault": true, "notifyOnSuccess": false}}"#).unwrap();

    let notifier = Arc::new(RecordingNotifier::default());
    let app = ScaffoldApp::builder()
        .config_file(file.path())
        .unwrap()
        .notifier(notifier.clone())
        .build()
        .unwrap();

    let fixture = works_fixture(vec![work(1, "Salt", None)], &[]);
    let (page, _watchers) = app.page_controller(fixture.contract);
    assert!(page.show_deleted());

    page.list().reload().await;
    page.list().handle_delete(1).await.unwrap();
    assert_eq!(page.list().visible_items().len(), 1);
    assert!(notifier.kinds().is_empty());
}

#[test]
fn test_config_file_missing_is_error() {
    let result = ScaffoldApp::builder().config_file("/nonexistent/ledger/scaffold.json");
    assert!(matches!(result, Err(ScaffoldError::Config(_))));
}

#[tokio::test]
async fn test_shared_reload_bus_between_apps() {
    let first = ScaffoldApp::builder().build().unwrap();
    let second = ScaffoldApp::builder()
        .reload_bus(first.reload_bus().clone())
        .build()
        .unwrap();

    let mut works = second.reload_bus().subscribe(EntityType::Work);
    assert_eq!(first.publish_reload(EntityType::Work), 1);
    assert_eq!(works.recv().await, Some(()));
}

#[tokio::test]
async fn test_reload_event_triggers_exactly_one_list_call() {
    let app = ScaffoldApp::builder().build().unwrap();
    let fixture = works_fixture(vec![work(1, "Salt", None), work(2, "Tide", None)], &[]);
    let list = app.list_controller(Arc::clone(&fixture.contract), NavigationScope::new());
    let _watcher = list.watch_reloads();

    assert_eq!(list.reload().await, ReloadOutcome::Applied);
    assert_eq!(fixture.source.list_calls(), 1);

    let listed = fixture.source.listed.notified();
    app.publish_reload(EntityType::Work);
    tokio::time::timeout(Duration::from_secs(1), listed)
        .await
        .expect("reload signal should trigger list()");
    settle().await;
    assert_eq!(fixture.source.list_calls(), 2);

    app.publish_reload(EntityType::Submission);
    settle().await;
    assert_eq!(fixture.source.list_calls(), 2);
}

#[tokio::test]
async fn test_dropped_list_stops_reloading() {
    let app = ScaffoldApp::builder().build().unwrap();
    let fixture = works_fixture(vec![work(1, "Salt", None)], &[]);
    let list = app.list_controller(Arc::clone(&fixture.contract), NavigationScope::new());
    let watcher = list.watch_reloads();
    list.reload().await;

    drop(list);
    app.publish_reload(EntityType::Work);
    settle().await;
    assert!(watcher.is_finished());
    assert_eq!(fixture.source.list_calls(), 1);
}

#[tokio::test]
async fn test_detail_save_resyncs_sibling_page() {
    let notifier = Arc::new(RecordingNotifier::default());
    let app = ScaffoldApp::builder()
        .notifier(notifier.clone())
        .build()
        .unwrap();
    let fixture = works_fixture(vec![work(1, "Salt", None), work(2, "Tide", None)], &[]);

    let (editor, _editor_watch) = app.page_controller(Arc::clone(&fixture.contract));
    let (browser, _browser_watch) = app.page_controller(Arc::clone(&fixture.contract));
    editor.list().reload().await;
    browser.list().reload().await;
    let before = fixture.source.list_calls();

    editor.open_detail(1).await;
    editor.detail().set_editing(true);
    editor
        .detail()
        .edit_draft(|w| w.title = "Salt Road".to_string())
        .unwrap();
    editor.detail().handle_save().await;

    // both mounted lists reload on the signal
    wait_for(|| fixture.source.list_calls() == before + 2).await;
    settle().await;

    assert_eq!(fixture.source.list_calls(), before + 2);
    let titles: Vec<String> = browser
        .list()
        .items()
        .into_iter()
        .map(|w| w.title)
        .collect();
    assert_eq!(titles, vec!["Salt Road".to_string(), "Tide".to_string()]);
    assert_eq!(notifier.kinds(), vec![NotificationKind::Success]);
    assert!(!browser.navigation().same_scope(editor.navigation()));
}
