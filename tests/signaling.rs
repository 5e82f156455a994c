use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use signaling_relay::{api, AppState, Config};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (String, AppState) {
    let state = AppState::new(Config::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::create_router(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("ws://{}/ws", addr), state)
}

async fn connect(url: &str) -> Client {
    let (client, _) = connect_async(url).await.expect("Should connect");
    client
}

async fn send(client: &mut Client, msg: Value) {
    client.send(Message::text(msg.to_string())).await.unwrap();
}

async fn recv(client: &mut Client) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Skip everything (mostly room list broadcasts) until a `msg_type` event.
async fn recv_type(client: &mut Client, msg_type: &str) -> Value {
    loop {
        let msg = recv(client).await;
        if msg["type"] == msg_type {
            return msg;
        }
    }
}

#[tokio::test]
async fn test_create_join_and_relay() {
    let (url, state) = spawn_server().await;
    let mut host = connect(&url).await;
    let mut guest = connect(&url).await;

    send(
        &mut host,
        json!({
            "type": "create_room",
            "request_id": "create-1",
            "payload": {
                "name": "Test",
                "iceAddress": "stun:x",
                "username": "",
                "password": ""
            }
        }),
    )
    .await;
    let created = recv_type(&mut host, "created").await;
    assert_eq!(created["payload"], "1");
    assert_eq!(created["request_id"], "create-1");
    assert_eq!(state.registry.len().await, 1);

    send(&mut guest, json!({ "type": "join", "payload": "1" })).await;
    let joined = recv_type(&mut guest, "joined").await;
    assert_eq!(joined["payload"], "1");
    recv_type(&mut guest, "ready").await;
    recv_type(&mut host, "ready").await;
    assert!(state.registry.is_empty().await);

    let offer = json!({ "type": "offer", "sdp": "v=0\r\ns=-\r\n" });
    send(
        &mut guest,
        json!({
            "type": "send_message",
            "payload": { "room_id": "1", "message": offer.clone() }
        }),
    )
    .await;
    let relayed = recv_type(&mut host, "message").await;
    assert_eq!(relayed["payload"], offer);
}

#[tokio::test]
async fn test_host_disconnect_clears_room_for_listeners() {
    let (url, state) = spawn_server().await;
    let mut host = connect(&url).await;
    let mut listener = connect(&url).await;

    send(
        &mut host,
        json!({ "type": "create_room", "payload": "{\"name\":\"Lonely\"}" }),
    )
    .await;
    recv_type(&mut host, "created").await;

    send(
        &mut listener,
        json!({ "type": "get_room_info", "request_id": "list" }),
    )
    .await;
    let listing = loop {
        let msg = recv_type(&mut listener, "updateRoom").await;
        if msg["request_id"] == "list" {
            break msg;
        }
    };
    let rooms: Value = serde_json::from_str(listing["payload"].as_str().unwrap()).unwrap();
    assert_eq!(rooms[0]["Name"], "Lonely");

    host.close(None).await.unwrap();

    loop {
        let msg = recv_type(&mut listener, "updateRoom").await;
        if msg["payload"] == "[]" {
            break;
        }
    }
    assert!(state.registry.is_empty().await);
}

#[tokio::test]
async fn test_bad_request_keeps_connection_open() {
    let (url, _state) = spawn_server().await;
    let mut client = connect(&url).await;

    client.send(Message::text("{oops")).await.unwrap();
    let error = recv_type(&mut client, "error").await;
    assert!(error["payload"].is_string());

    send(&mut client, json!({ "type": "ping", "request_id": "p" })).await;
    let pong = recv_type(&mut client, "pong").await;
    assert_eq!(pong["request_id"], "p");
}
