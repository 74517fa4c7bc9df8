//! Integration tests for the access-token refresh flow
//!
//! The refresh callback identifier is the one persistent identifier in
//! the protocol: registered once, resolved every time the engine asks
//! for a fresh token, and replaced rather than consumed.

mod common;

use common::bridge_with_mock;

use serde_json::json;

use confbridge::{Bridge, Command, Reply, ReplyStatus, ReplyStream};

async fn marker(bridge: &Bridge, replies: &mut ReplyStream) -> Reply {
    bridge
        .submit(Command::new("isTelecomMode", "marker"))
        .unwrap();
    let reply = replies.next().await.expect("marker reply");
    assert_eq!(reply.callback_id, "marker", "unexpected reply before marker");
    reply
}

#[tokio::test]
async fn test_initialize_token_hands_refresher_to_engine() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();

    assert_eq!(replies.next().await.unwrap().status, ReplyStatus::Ok);
    assert_eq!(engine.calls(), vec!["initialize_token(tok-1)"]);
    assert!(engine.refresher().is_some());

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_initialize_token_without_token_still_replies_ok() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge.submit(Command::new("initializeToken", "cb-1")).unwrap();

    assert_eq!(replies.next().await.unwrap().status, ReplyStatus::Ok);
    assert!(engine.calls().is_empty());

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_refresh_callback_resolved_repeatedly_without_consumption() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();
    replies.next().await.unwrap();

    // Registration delivers nothing by itself.
    bridge
        .submit(Command::new("refreshAccessTokenCallback", "refresh-cb"))
        .unwrap();
    marker(&bridge, &mut replies).await;

    let refresher = engine.refresher().expect("refresher captured");

    // Every engine request pings the same identifier again.
    for _ in 0..2 {
        let pending = refresher.request();
        let reply = replies.next().await.unwrap();
        assert_eq!(reply.callback_id, "refresh-cb");
        assert_eq!(reply.status, ReplyStatus::Ok);
        assert!(reply.keep_callback);

        bridge
            .submit(Command::with_args("onAccessTokenOk", vec![json!("tok-2")], "cb-ok"))
            .unwrap();
        let reply = replies.next().await.unwrap();
        assert_eq!(reply.callback_id, "cb-ok");
        assert_eq!(reply.status, ReplyStatus::Ok);
        assert!(!reply.keep_callback);

        assert_eq!(pending.await.unwrap(), Some("tok-2".to_string()));
    }

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_access_token_ko_resolves_with_no_token() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();
    replies.next().await.unwrap();
    bridge
        .submit(Command::new("refreshAccessTokenCallback", "refresh-cb"))
        .unwrap();
    marker(&bridge, &mut replies).await;

    let refresher = engine.refresher().unwrap();
    let pending = refresher.request();
    assert_eq!(replies.next().await.unwrap().callback_id, "refresh-cb");

    bridge.submit(Command::new("onAccessTokenKo", "cb-ko")).unwrap();
    assert_eq!(replies.next().await.unwrap().callback_id, "cb-ko");

    assert_eq!(pending.await.unwrap(), None);

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_token_resolution_without_pending_request_is_dropped() {
    let (bridge, _engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("onAccessTokenOk", vec![json!("tok-2")], "cb-1"))
        .unwrap();
    bridge.submit(Command::new("onAccessTokenKo", "cb-2")).unwrap();

    marker(&bridge, &mut replies).await;

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_token_ok_without_token_argument_is_dropped() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();
    replies.next().await.unwrap();

    let refresher = engine.refresher().unwrap();
    let pending = refresher.request();

    // No refresh callback registered: the request is stored silently.
    marker(&bridge, &mut replies).await;

    // Malformed resolution leaves the pending request in place.
    bridge.submit(Command::new("onAccessTokenOk", "cb-2")).unwrap();
    marker(&bridge, &mut replies).await;

    bridge
        .submit(Command::with_args("onAccessTokenOk", vec![json!("tok-3")], "cb-3"))
        .unwrap();
    assert_eq!(replies.next().await.unwrap().callback_id, "cb-3");
    assert_eq!(pending.await.unwrap(), Some("tok-3".to_string()));

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_superseded_request_is_abandoned() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();
    replies.next().await.unwrap();
    bridge
        .submit(Command::new("refreshAccessTokenCallback", "refresh-cb"))
        .unwrap();
    marker(&bridge, &mut replies).await;

    let refresher = engine.refresher().unwrap();
    let first = refresher.request();
    assert_eq!(replies.next().await.unwrap().callback_id, "refresh-cb");
    let second = refresher.request();
    assert_eq!(replies.next().await.unwrap().callback_id, "refresh-cb");

    bridge
        .submit(Command::with_args("onAccessTokenOk", vec![json!("tok-9")], "cb-ok"))
        .unwrap();
    replies.next().await.unwrap();

    // Only the latest request is answered; the superseded one is dropped.
    assert!(first.await.is_err());
    assert_eq!(second.await.unwrap(), Some("tok-9".to_string()));

    bridge.shutdown().await;
}

#[tokio::test]
async fn test_replacing_refresh_callback() {
    let (bridge, engine, mut replies) = bridge_with_mock();

    bridge
        .submit(Command::with_args("initializeToken", vec![json!("tok-1")], "cb-1"))
        .unwrap();
    replies.next().await.unwrap();

    bridge
        .submit(Command::new("refreshAccessTokenCallback", "refresh-old"))
        .unwrap();
    bridge
        .submit(Command::new("refreshAccessTokenCallback", "refresh-new"))
        .unwrap();
    marker(&bridge, &mut replies).await;

    let refresher = engine.refresher().unwrap();
    let _pending = refresher.request();

    let reply = replies.next().await.unwrap();
    assert_eq!(reply.callback_id, "refresh-new");
    assert!(reply.keep_callback);

    bridge.shutdown().await;
}
