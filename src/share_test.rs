use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::sync::mock::MockTransport;
use crate::sync::remote::Method;

fn service(mock: &Arc<MockTransport>) -> ShareService {
    ShareService::new(RemoteStore::new(mock.clone()), "https://board.example/")
}

#[test]
fn share_url_trims_trailing_slash() {
    let mock = MockTransport::new();
    let id = Uuid::new_v4();
    assert_eq!(service(&mock).share_url(id), format!("https://board.example/share/{id}"));
}

#[tokio::test]
async fn existing_share_is_reused() {
    let mock = MockTransport::new();
    let board = Uuid::new_v4();
    let share = Uuid::new_v4();
    mock.respond(
        Method::Get,
        &format!("/whiteboard-shares?whiteboard_id={board}"),
        json!({ "shares": [{ "id": share, "whiteboard_id": board }] }),
    );

    let mut panel = SharePanel::new(true);
    service(&mock).open(&mut panel, board).await;

    assert!(panel.open);
    assert!(!panel.loading);
    assert_eq!(panel.url, Some(format!("https://board.example/share/{share}")));
    assert!(mock.calls_to(Method::Post, "/whiteboard-shares").is_empty());
}

#[tokio::test]
async fn missing_share_is_created() {
    let mock = MockTransport::new();
    let board = Uuid::new_v4();

    let id = service(&mock).ensure_share(board).await.unwrap();

    let posts = mock.calls_to(Method::Post, "/whiteboard-shares");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body, Some(json!({ "id": id, "whiteboard_id": board })));
}

#[tokio::test]
async fn failure_sets_dismissable_error() {
    let mock = MockTransport::new();
    mock.fail(Method::Post, "/whiteboard-shares");

    let mut panel = SharePanel::new(true);
    service(&mock).open(&mut panel, Uuid::new_v4()).await;
    assert!(panel.open);
    assert!(panel.url.is_none());
    assert_eq!(panel.error.as_deref(), Some(SHARE_FAILED_MESSAGE));

    panel.dismiss_error();
    assert!(panel.error.is_none());
}

#[tokio::test]
async fn disallowed_panel_stays_closed() {
    let mock = MockTransport::new();
    let mut panel = SharePanel::new(false);
    service(&mock).open(&mut panel, Uuid::new_v4()).await;
    assert_eq!(panel, SharePanel::new(false));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn reopening_keeps_the_url() {
    let mock = MockTransport::new();
    let svc = service(&mock);
    let mut panel = SharePanel::new(true);
    svc.open(&mut panel, Uuid::new_v4()).await;
    let url = panel.url.clone();
    panel.close();

    mock.clear();
    svc.open(&mut panel, Uuid::new_v4()).await;
    assert!(panel.open);
    assert_eq!(panel.url, url);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn resolve_returns_the_shared_board() {
    let mock = MockTransport::new();
    let board = Uuid::new_v4();
    let share = Uuid::new_v4();
    mock.respond(
        Method::Get,
        &format!("/whiteboard-shares/{share}"),
        json!({ "share": { "id": share, "whiteboard_id": board } }),
    );
    assert_eq!(service(&mock).resolve(&share.to_string()).await.unwrap(), board);
}

#[tokio::test]
async fn resolve_maps_failures() {
    let mock = MockTransport::new();
    let svc = service(&mock);

    assert!(matches!(svc.resolve("  ").await, Err(ShareError::Invalid)));
    assert!(matches!(svc.resolve("not-a-uuid").await, Err(ShareError::Invalid)));

    let missing = Uuid::new_v4();
    mock.respond(Method::Get, &format!("/whiteboard-shares/{missing}"), json!({ "share": null }));
    assert!(matches!(svc.resolve(&missing.to_string()).await, Err(ShareError::NotFound)));

    // No scripted response: the envelope lacks its key.
    let unknown = Uuid::new_v4();
    let err = svc.resolve(&unknown.to_string()).await.unwrap_err();
    assert!(matches!(err, ShareError::LoadFailed(SyncError::MissingField("share"))));
    assert_eq!(err.to_string(), "Failed to load share.");
}
