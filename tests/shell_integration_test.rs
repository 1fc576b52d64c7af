//! Integration tests for the shell event loop and message bridge.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RecordingContent, RecordingRegistry};
use serde_json::json;
use sharepush::host::HeadlessNotifications;
use sharepush::platform::{NotificationEvent, Presentation};
use sharepush::{OutboundMessage, RefreshOutcome, Shell};
use tokio::sync::mpsc;

struct Harness {
    shell: Shell,
    registry: Arc<RecordingRegistry>,
    content: Arc<RecordingContent>,
    notifications: Arc<HeadlessNotifications>,
}

fn harness(token: Option<&str>) -> Harness {
    let registry = Arc::new(RecordingRegistry::default());
    let content = Arc::new(RecordingContent::default());
    let notifications = common::notifications(token);
    let pipeline = common::pipeline(
        Arc::clone(&registry) as Arc<_>,
        Arc::clone(&notifications),
    );
    let shell = Shell::new(
        pipeline,
        Arc::clone(&content) as Arc<_>,
        Arc::clone(&notifications) as Arc<_>,
        Duration::from_secs(24 * 60 * 60),
    );
    Harness {
        shell,
        registry,
        content,
        notifications,
    }
}

async fn settle(outcome: Option<RefreshOutcome>) {
    let handle = outcome
        .and_then(RefreshOutcome::into_delivery)
        .expect("expected a delivery");
    assert!(handle.await.unwrap().is_delivered());
}

#[tokio::test(start_paused = true)]
async fn test_get_push_token_replies_without_http() {
    let mut h = harness(Some("xyz"));
    settle(h.shell.handle_inbound(r#"{"type":"SESSION_UPDATE","session":null}"#).await).await;
    assert_eq!(h.registry.requests().len(), 1);

    let outcome = h.shell.handle_inbound(r#"{"type":"GET_PUSH_TOKEN"}"#).await;

    assert!(outcome.is_none());
    assert_eq!(h.registry.requests().len(), 1, "no HTTP for token queries");
    assert_eq!(
        h.content.messages(),
        vec![OutboundMessage::PushToken {
            token: Some("xyz".to_string())
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_get_push_token_before_any_token_omits_field() {
    let mut h = harness(None);

    h.shell.handle_inbound(r#"{"type":"GET_PUSH_TOKEN"}"#).await;

    let messages = h.content.messages();
    assert_eq!(messages, vec![OutboundMessage::PushToken { token: None }]);
    assert_eq!(messages[0].encode().unwrap(), r#"{"type":"PUSH_TOKEN"}"#);
}

#[tokio::test(start_paused = true)]
async fn test_session_update_forces_delivery_each_time() {
    let mut h = harness(Some("xyz"));

    settle(
        h.shell
            .handle_inbound(r#"{"type":"SESSION_UPDATE","session":{"user":{"id":"u9"}}}"#)
            .await,
    )
    .await;
    settle(
        h.shell
            .handle_inbound(r#"{"type":"SESSION_UPDATE","session":{"user":{"id":"u9"}}}"#)
            .await,
    )
    .await;

    let requests = h.registry.requests();
    assert_eq!(requests.len(), 2, "same token, still delivered per update");
    assert!(requests.iter().all(|r| r.token == "xyz"));
    assert_eq!(
        h.shell.pipeline().session().and_then(|s| s.user_id()),
        Some("u9")
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_and_malformed_messages_are_ignored() {
    let mut h = harness(Some("xyz"));

    assert!(h.shell.handle_inbound(r#"{"type":"SOMETHING_NEW"}"#).await.is_none());
    assert!(h.shell.handle_inbound("not json").await.is_none());
    assert!(h.shell.handle_inbound(r#"{"session":{}}"#).await.is_none());

    assert!(h.registry.requests().is_empty());
    assert!(h.content.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_refreshes_at_startup_and_stops_when_inbound_closes() {
    let h = harness(Some("abc123"));
    let (tx, rx) = mpsc::channel(8);
    tx.send(r#"{"type":"GET_PUSH_TOKEN"}"#.to_string())
        .await
        .unwrap();
    drop(tx);

    let shell = h.shell.run(rx, std::future::pending()).await;
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(h.registry.requests().len(), 1);
    assert_eq!(
        shell.pipeline().current_token().map(|t| t.as_str()),
        Some("abc123")
    );
    assert_eq!(
        h.content.messages(),
        vec![OutboundMessage::PushToken {
            token: Some("abc123".to_string())
        }]
    );
    assert_eq!(
        h.notifications.presentation(),
        Some(Presentation::foreground())
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_forwards_notification_events() {
    let h = harness(Some("abc123"));
    let (_tx, rx) = mpsc::channel::<String>(8);
    let notifications = Arc::clone(&h.notifications);

    let driver = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        notifications.emit(NotificationEvent::Received(json!({"title": "hi"})));
        notifications.emit(NotificationEvent::Response(json!({"action": "open"})));
    };
    let shutdown = tokio::time::sleep(Duration::from_secs(1));

    let (_shell, ()) = tokio::join!(h.shell.run(rx, shutdown), driver);

    assert_eq!(
        h.content.messages(),
        vec![
            OutboundMessage::NotificationReceived {
                notification: json!({"title": "hi"})
            },
            OutboundMessage::NotificationResponse {
                response: json!({"action": "open"})
            },
        ]
    );
    assert_eq!(h.notifications.emit(NotificationEvent::Received(json!({}))), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timer_redelivers_only_changed_token() {
    let registry = Arc::new(RecordingRegistry::default());
    let content = Arc::new(RecordingContent::default());
    let notifications = common::notifications(Some("t1"));
    let shell = Shell::new(
        common::pipeline(Arc::clone(&registry) as Arc<_>, Arc::clone(&notifications)),
        content as Arc<_>,
        Arc::clone(&notifications) as Arc<_>,
        Duration::from_secs(60),
    );
    let (_tx, rx) = mpsc::channel::<String>(8);

    let driver = {
        let notifications = Arc::clone(&notifications);
        async move {
            // Startup plus one unchanged tick, then a new token.
            tokio::time::sleep(Duration::from_secs(90)).await;
            notifications.set_token(Some("t2".into()));
        }
    };
    let shutdown = tokio::time::sleep(Duration::from_secs(150));

    tokio::join!(shell.run(rx, shutdown), driver);
    tokio::time::sleep(Duration::from_millis(1)).await;

    let tokens: Vec<String> = registry.requests().into_iter().map(|r| r.token).collect();
    assert_eq!(tokens, vec!["t1".to_string(), "t2".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_pending_retries_running() {
    let registry = Arc::new(RecordingRegistry::failing(2));
    let notifications = common::notifications(Some("abc123"));
    let shell = Shell::new(
        common::pipeline(Arc::clone(&registry) as Arc<_>, Arc::clone(&notifications)),
        Arc::new(RecordingContent::default()) as Arc<_>,
        Arc::clone(&notifications) as Arc<_>,
        Duration::from_secs(24 * 60 * 60),
    );
    let (_tx, rx) = mpsc::channel::<String>(8);

    // Retries are 20 ms apart; stop the shell before the first one.
    shell.run(rx, tokio::time::sleep(Duration::from_millis(5))).await;
    assert_eq!(registry.requests().len(), 1, "first attempt failed before shutdown");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(registry.requests().len(), 3, "both retries ran after shutdown");
}
