use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::models::{ConnectionId, RoomId};
use crate::state::AppState;
use crate::ws::{
    msg_types, room_ref, ClientHandle, CreateRoomPayload, SendMessagePayload, SignalingMessage,
    WsSessionState,
};

/// WebSocket routes
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// WebSocket upgrade handler
async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = ConnectionId::generate();

    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Create message channel for sending to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalingMessage>();
    let mut session = connect(&state, conn_id.clone(), tx);

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Task for sending messages to client
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "Failed to encode outbound message"),
            }
        }
    });

    // Process incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                dispatch(text.as_str(), &mut session, &state).await;
            }
            Ok(Message::Binary(_)) => {
                send_to_client(
                    SignalingMessage::error("Binary frames are not supported", None),
                    &session,
                    &state,
                );
            }
            Ok(Message::Ping(_data)) => {
                // Respond with pong automatically handled by axum
                tracing::trace!(conn_id = %conn_id, "Ping received");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close received");
                break;
            }
            Err(e) => {
                tracing::error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(&mut session, &state).await;

    // Cancel send task
    send_task.abort();
}

/// Register a new connection with the hub and start its session.
pub fn connect(
    state: &AppState,
    conn_id: ConnectionId,
    sender: mpsc::UnboundedSender<SignalingMessage>,
) -> WsSessionState {
    state
        .hub
        .register(ClientHandle::new(conn_id.clone(), sender));
    WsSessionState::new(conn_id)
}

/// Drop any room this connection hosts and tell everyone what is left.
pub async fn handle_disconnect(session: &mut WsSessionState, state: &AppState) {
    tracing::info!(
        conn_id = %session.conn_id,
        state = ?session.state(),
        "WebSocket disconnected, cleaning up"
    );

    if let Some(room) = state.registry.delete_room_by_host(&session.conn_id).await {
        tracing::info!(room_id = %room.id, "Removed room of disconnected host");
    }

    state.hub.unregister(&session.conn_id);
    session.disconnect();

    broadcast_room_list(state).await;
}

/// Handle one inbound text frame. Failures become an `error` event for the
/// caller and never end the connection.
pub async fn dispatch(text: &str, session: &mut WsSessionState, state: &AppState) {
    let msg: SignalingMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!(conn_id = %session.conn_id, error = %e, "Malformed message");
            send_error(&AppError::from(e).to_string(), None, session, state);
            return;
        }
    };
    let request_id = msg.request_id.clone();

    if let Err(e) = handle_message(msg, session, state).await {
        tracing::warn!(conn_id = %session.conn_id, error = %e, "Error handling message");
        send_error(&e.to_string(), request_id, session, state);
    }
}

/// Handle incoming signaling message
async fn handle_message(
    msg: SignalingMessage,
    session: &mut WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let request_id = msg.request_id;

    tracing::debug!(
        msg_type = %msg.msg_type,
        conn_id = %session.conn_id,
        "Received message"
    );

    match msg.msg_type.as_str() {
        msg_types::CREATE_ROOM => {
            handle_create_room(msg.payload, request_id, session, state).await?;
        }
        msg_types::JOIN => {
            handle_join(msg.payload, request_id, session, state).await?;
        }
        msg_types::LEAVE_ROOM => {
            handle_leave_room(msg.payload, session, state)?;
        }
        msg_types::GET_ROOM_INFO => {
            handle_get_room_info(request_id, session, state).await;
        }
        msg_types::SEND_MESSAGE => {
            handle_send_message(msg.payload, session, state)?;
        }
        msg_types::PING => {
            let response = SignalingMessage::new(msg_types::PONG, serde_json::json!({}))
                .with_request_id(request_id);
            send_to_client(response, session, state);
        }
        other => {
            tracing::warn!(msg_type = %other, "Unknown message type");
            return Err(AppError::BadRequest(format!(
                "Unknown message type: {}",
                other
            )));
        }
    }

    Ok(())
}

/// Handle create_room message
async fn handle_create_room(
    payload: serde_json::Value,
    request_id: Option<String>,
    session: &mut WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let request = CreateRoomPayload::parse(payload)?;

    if request.name.chars().count() > state.config.max_room_name_len {
        return Err(AppError::BadRequest(format!(
            "Room name must be at most {} characters",
            state.config.max_room_name_len
        )));
    }

    if let Some(pending) = state.registry.hosted_by(&session.conn_id).await {
        return Err(AppError::BadRequest(format!(
            "Already hosting room {}",
            pending.id
        )));
    }

    let room = state
        .registry
        .create_room(&session.conn_id, request.name.clone(), request.ice_config())
        .await?;
    let group = room.id.to_string();

    state.hub.add_to_group(&group, &session.conn_id);
    session.host(room.id);

    broadcast_room_list(state).await;

    let response = SignalingMessage::new(msg_types::CREATED, serde_json::Value::String(group))
        .with_request_id(request_id);
    send_to_client(response, session, state);

    tracing::info!(
        room_id = %room.id,
        conn_id = %session.conn_id,
        "Room hosted"
    );

    Ok(())
}

/// Handle join message
///
/// The first join consumes the room: it leaves the public list right away.
/// Later joins on the same id still reach the group.
async fn handle_join(
    payload: serde_json::Value,
    request_id: Option<String>,
    session: &mut WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let group = room_ref(payload)?;

    state.hub.add_to_group(&group, &session.conn_id);

    let response =
        SignalingMessage::new(msg_types::JOINED, serde_json::Value::String(group.clone()))
            .with_request_id(request_id);
    send_to_client(response, session, state);

    state.hub.broadcast_to_group(
        &group,
        SignalingMessage::new(msg_types::READY, serde_json::Value::Null),
        None,
    );

    session.join(group.clone());

    if let Ok(room_id) = group.parse::<RoomId>() {
        state.registry.delete_room(room_id).await;
        broadcast_room_list(state).await;
    }

    tracing::info!(
        room_id = %group,
        conn_id = %session.conn_id,
        "Joined room"
    );

    Ok(())
}

/// Handle leave_room message
fn handle_leave_room(
    payload: serde_json::Value,
    session: &mut WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let group = room_ref(payload)?;

    state.hub.broadcast_to_group(
        &group,
        SignalingMessage::new(msg_types::BYE, serde_json::Value::Null),
        Some(&session.conn_id),
    );
    session.leave();

    tracing::info!(
        room_id = %group,
        conn_id = %session.conn_id,
        "User requested leave"
    );

    Ok(())
}

/// Handle get_room_info message
async fn handle_get_room_info(
    request_id: Option<String>,
    session: &WsSessionState,
    state: &AppState,
) {
    let rooms = state.registry.list_rooms().await;
    let response = SignalingMessage::room_list(&rooms, &state.config.room_action_html)
        .with_request_id(request_id);
    send_to_client(response, session, state);
}

/// Handle send_message message
fn handle_send_message(
    payload: serde_json::Value,
    session: &WsSessionState,
    state: &AppState,
) -> Result<(), AppError> {
    let (group, message) = SendMessagePayload::parse(payload)?;

    if !session.is_in_group(&group) {
        tracing::debug!(
            room_id = %group,
            conn_id = %session.conn_id,
            "Relaying for a room this session is not paired in"
        );
    }

    state.hub.broadcast_to_group(
        &group,
        SignalingMessage::new(msg_types::MESSAGE, message.into_value()),
        Some(&session.conn_id),
    );

    Ok(())
}

/// Push the current room list to every connection.
async fn broadcast_room_list(state: &AppState) {
    let rooms = state.registry.list_rooms().await;
    state.hub.broadcast_all(SignalingMessage::room_list(
        &rooms,
        &state.config.room_action_html,
    ));
}

/// Send a message to the current client
fn send_to_client(msg: SignalingMessage, session: &WsSessionState, state: &AppState) {
    state.hub.send_to(&session.conn_id, msg);
}

/// Send an error message to the current client
fn send_error(
    message: &str,
    request_id: Option<String>,
    session: &WsSessionState,
    state: &AppState,
) {
    send_to_client(SignalingMessage::error(message, request_id), session, state);
}
