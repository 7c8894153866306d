//! Device poll path through the full router.

mod common;

use axum::http::{Method, StatusCode};

use common::{send, test_app, test_items};

#[tokio::test]
async fn config_snapshot_has_the_device_contract_shape() {
    let t = test_app();
    let playlist = t.store.add_playlist(1, 7, "lobby", false, test_items(7, 2));
    t.store.add_screen(101, 1, Some(7), None);

    let (status, body) = send(
        t.app.clone(),
        Method::GET,
        "/device/v1/screens/101/config",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content_version"], playlist.content_version);
    assert_eq!(body["poll_after_sec"], 60);
    assert!(body["updated_at"].is_string());

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "image");
    assert_eq!(items[0]["url"], "media/7/0.png");
    assert_eq!(items[0]["duration_sec"], 10);
}

#[tokio::test]
async fn empty_resolution_returns_the_sentinel_version() {
    let t = test_app();
    // No assignment, no override, no tenant default.
    t.store.add_screen(102, 1, None, None);

    let (status, body) = send(
        t.app.clone(),
        Method::GET,
        "/device/v1/screens/102/config",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content_version"], "pl-empty");
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_screen_is_a_404() {
    let t = test_app();

    let (status, body) = send(
        t.app.clone(),
        Method::GET,
        "/device/v1/screens/999/config",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
