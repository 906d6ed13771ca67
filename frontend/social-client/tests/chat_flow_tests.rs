//! Direct message flows against a mocked REST backend

use std::time::Duration;

use serde_json::json;
use social_client::api::ApiClient;
use social_client::realtime::EventDispatcher;
use social_client::services::ChatService;
use social_client::store::{Action, Store};
use social_client::{ClientError, Message, Session};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn chat_for(server: &MockServer, user_id: &str) -> (ChatService, Store) {
    let api = ApiClient::with_origin(&server.uri(), Some("tok"), Duration::from_secs(5)).unwrap();
    let store = Store::new();
    store.dispatch(Action::SetSession(Some(Session {
        user_id: user_id.into(),
        username: "alice".into(),
        profile_picture: None,
    })));
    (ChatService::new(api, store.clone()), store)
}

fn record(id: &str, from: &str, to: &str, text: &str) -> serde_json::Value {
    json!({"_id": id, "senderId": from, "receiverId": to, "message": text})
}

fn conversation(store: &Store, counterpart: &str) -> Vec<Message> {
    store.select(|s| {
        s.chat
            .conversation(counterpart)
            .map(|c| c.messages().to_vec())
            .unwrap_or_default()
    })
}

#[tokio::test]
async fn test_send_appends_confirmed_message_and_clears_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/message/send/u2"))
        .and(header("cookie", "token=tok"))
        .and(body_json(json!({"textMessage": "hi"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "newMessage": record("m1", "u1", "u2", "hi"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    chat.set_draft("  hi ");

    let sent = chat.send_draft("u2").await.unwrap().unwrap();

    assert_eq!(sent.id, "m1");
    let messages = conversation(&store, "u2");
    assert_eq!(messages.last().map(|m| m.id.as_str()), Some("m1"));
    assert!(chat.draft().is_empty());
}

#[tokio::test]
async fn test_blank_text_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;

    assert!(chat.send_message("u2", "").await.unwrap().is_none());
    assert!(chat.send_message("u2", " \n\t ").await.unwrap().is_none());
    assert!(conversation(&store, "u2").is_empty());
}

#[tokio::test]
async fn test_failed_send_keeps_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/message/send/u2"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"success": false, "message": "Internal server error"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    chat.set_draft("hello?");

    let err = chat.send_draft("u2").await.unwrap_err();

    match err {
        ClientError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(chat.draft(), "hello?");
    assert!(conversation(&store, "u2").is_empty());
}

#[tokio::test]
async fn test_unsuccessful_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/message/send/u2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "User not found"})),
        )
        .mount(&server)
        .await;

    let (chat, _store) = chat_for(&server, "u1").await;
    let err = chat.send_message("u2", "hi").await.unwrap_err();

    assert!(!err.is_retryable());
    assert_eq!(err.user_message(), "User not found");
}

#[tokio::test]
async fn test_send_requires_session() {
    let server = MockServer::start().await;
    let api = ApiClient::with_origin(&server.uri(), None, Duration::from_secs(5)).unwrap();
    let chat = ChatService::new(api, Store::new());

    let err = chat.send_message("u2", "hi").await.unwrap_err();
    assert!(matches!(err, ClientError::NoSession));
}

#[tokio::test]
async fn test_confirmed_send_and_realtime_echo_do_not_duplicate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/message/send/u2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "newMessage": record("m1", "u1", "u2", "hi"),
        })))
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    chat.send_message("u2", "hi").await.unwrap();

    // Same message delivered again over the realtime channel
    let echo = Message {
        id: "m1".into(),
        sender_id: "u1".into(),
        receiver_id: "u2".into(),
        text: "hi".into(),
        created_at: None,
    };
    assert!(store.dispatch(Action::MessageAppended(echo)).is_none());
    assert_eq!(conversation(&store, "u2").len(), 1);
}

#[tokio::test]
async fn test_load_conversation_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/message/all/u2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/message/all/u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "messages": [
                record("m1", "u1", "u2", "hi"),
                record("m2", "u2", "u1", "hey"),
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    let count = chat.load_conversation("u2").await.unwrap();

    assert_eq!(count, 2);
    let ids: Vec<_> = conversation(&store, "u2").into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[tokio::test]
async fn test_load_conversation_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/message/all/u2"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "User not authenticated",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (chat, _store) = chat_for(&server, "u1").await;
    let err = chat.load_conversation("u2").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 401, .. }));
}

#[tokio::test]
async fn test_suggested_users_and_selection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/suggested"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": [
                {"_id": "u2", "username": "bob", "profilePicture": "https://cdn/bob.png"},
                {"_id": "u3", "username": "carol"},
            ],
        })))
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    assert_eq!(chat.load_suggested_users().await.unwrap(), 2);

    let bob = store.select(|s| s.auth.suggested_users[0].clone());
    assert_eq!(bob.username, "bob");

    chat.select_user(Some(bob));
    assert!(store.select(|s| s.auth.selected_user.is_some()));

    chat.leave_chat();
    assert!(store.select(|s| s.auth.selected_user.is_none()));
}

#[tokio::test]
async fn test_message_arriving_during_history_load_survives() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/message/all/u2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "success": true,
                    "messages": [record("m1", "u1", "u2", "hi")],
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let (chat, store) = chat_for(&server, "u1").await;
    let dispatcher = EventDispatcher::new(store.clone());

    let live = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        dispatcher.on_message_received(Message {
            id: "m2".into(),
            sender_id: "u2".into(),
            receiver_id: "u1".into(),
            text: "you there?".into(),
            created_at: None,
        })
    };
    let (loaded, appended) = tokio::join!(chat.load_conversation("u2"), live);

    assert_eq!(loaded.unwrap(), 1);
    assert!(appended);
    let ids: Vec<_> = conversation(&store, "u2").into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
}

#[test]
fn test_interleaved_senders_keep_separate_ordered_conversations() {
    let store = Store::new();
    store.dispatch(Action::SetSession(Some(Session {
        user_id: "u1".into(),
        username: "alice".into(),
        profile_picture: None,
    })));
    let dispatcher = EventDispatcher::new(store.clone());

    let deliveries = [("a", "u2"), ("b", "u3"), ("c", "u2"), ("d", "u4"), ("e", "u3")];
    for (id, from) in deliveries {
        let frame = json!({"event": "newMessage", "data": record(id, from, "u1", id)});
        dispatcher.handle_frame(&frame.to_string());
    }

    let ids = |who: &str| -> Vec<String> {
        conversation(&store, who).into_iter().map(|m| m.id).collect()
    };
    assert_eq!(ids("u2"), vec!["a", "c"]);
    assert_eq!(ids("u3"), vec!["b", "e"]);
    assert_eq!(ids("u4"), vec!["d"]);

    for who in ["u2", "u3", "u4"] {
        assert!(conversation(&store, who).iter().all(|m| m.sender_id == who));
    }
    assert_eq!(store.select(|s| s.chat.conversations.len()), 3);
}
