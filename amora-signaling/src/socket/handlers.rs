use std::sync::Arc;

use serde::{Deserialize, Serialize};
use socketioxide::extract::{Data, SocketRef, State};
use uuid::Uuid;

use amora_shared::errors::AppError;

use crate::events::{user_channel, CallType, EndReason};
use crate::AppState;

// ---------------------------------------------------------------------------
// Payload types for Socket.IO events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CallRequestPayload {
    pub receiver_id: Uuid,
    pub call_type: CallType,
}

#[derive(Debug, Deserialize)]
pub struct SessionPayload {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CallRequestedAck {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Connection handler
// ---------------------------------------------------------------------------

pub async fn on_connect(socket: SocketRef, state: State<Arc<AppState>>) {
    // Identity is resolved upstream (gateway); the transport receives the
    // user id as a query parameter.
    let user_id = match resolve_user(&socket) {
        Ok(id) => id,
        Err(msg) => {
            tracing::warn!(sid = %socket.id, error = %msg, "socket identity missing");
            let _ = socket.emit(
                "error",
                &ErrorPayload {
                    code: "IDENTITY_MISSING".into(),
                    message: msg,
                },
            );
            socket.disconnect().ok();
            return;
        }
    };

    socket.extensions.insert(user_id);

    // Handlers must be registered before anything awaits: the client may
    // emit as soon as it sees the connect ack, and unregistered events are
    // silently dropped.
    socket.on("call-request", on_call_request);
    socket.on("call-accept", on_call_accept);
    socket.on("call-reject", on_call_reject);
    socket.on("call-end", on_call_end);
    socket.on_disconnect(on_disconnect);

    // The per-user room is the routing address for every signaling event.
    socket.join(user_channel(user_id)).ok();

    let connections = state.presence.connect(user_id);
    tracing::info!(user_id = %user_id, sid = %socket.id, connections, "socket connected");

    let _ = socket.emit("connected", &serde_json::json!({ "user_id": user_id }));
}

// ---------------------------------------------------------------------------
// Event: call-request
// ---------------------------------------------------------------------------

async fn on_call_request(
    socket: SocketRef,
    state: State<Arc<AppState>>,
    Data(payload): Data<CallRequestPayload>,
) {
    let Some(user_id) = get_user_id(&socket) else {
        return;
    };

    match state
        .relay
        .request_call(user_id, payload.receiver_id, payload.call_type)
    {
        Ok(session) => {
            let _ = socket.emit(
                "call-requested",
                &CallRequestedAck {
                    session_id: session.session_id,
                },
            );
        }
        Err(err) => emit_error(&socket, &err),
    }
}

// ---------------------------------------------------------------------------
// Event: call-accept
// ---------------------------------------------------------------------------

async fn on_call_accept(
    socket: SocketRef,
    state: State<Arc<AppState>>,
    Data(payload): Data<SessionPayload>,
) {
    if get_user_id(&socket).is_none() {
        return;
    }

    if let Err(err) = state.relay.accept_call(payload.session_id) {
        emit_error(&socket, &err);
    }
}

// ---------------------------------------------------------------------------
// Event: call-reject
// ---------------------------------------------------------------------------

async fn on_call_reject(
    socket: SocketRef,
    state: State<Arc<AppState>>,
    Data(payload): Data<SessionPayload>,
) {
    if get_user_id(&socket).is_none() {
        return;
    }

    if let Err(err) = state.relay.reject_call(payload.session_id) {
        emit_error(&socket, &err);
    }
}

// ---------------------------------------------------------------------------
// Event: call-end
// ---------------------------------------------------------------------------

async fn on_call_end(
    socket: SocketRef,
    state: State<Arc<AppState>>,
    Data(payload): Data<SessionPayload>,
) {
    let Some(user_id) = get_user_id(&socket) else {
        return;
    };

    match state
        .relay
        .end_call(payload.session_id, user_id, EndReason::Hangup)
    {
        Ok(session) => {
            let _ = socket.emit(
                "call-ended",
                &serde_json::json!({ "session_id": session.session_id }),
            );
        }
        Err(err) => emit_error(&socket, &err),
    }
}

// ---------------------------------------------------------------------------
// Disconnect handler
// ---------------------------------------------------------------------------

async fn on_disconnect(socket: SocketRef, state: State<Arc<AppState>>) {
    let Some(user_id) = get_user_id(&socket) else {
        return;
    };

    let remaining = state.presence.disconnect(user_id);
    tracing::info!(user_id = %user_id, sid = %socket.id, remaining, "socket disconnected");

    // Only the last connection going away takes the user out of their calls.
    if remaining == 0 {
        let ended = state.relay.end_all_for(user_id, EndReason::Disconnect);
        if ended > 0 {
            tracing::info!(user_id = %user_id, ended, "ended live calls after disconnect");
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_user(socket: &SocketRef) -> Result<Uuid, String> {
    let query = socket.req_parts().uri.query().unwrap_or_default();
    let raw = query
        .split('&')
        .find_map(|pair| {
            let mut split = pair.splitn(2, '=');
            let key = split.next()?;
            let value = split.next()?;
            (key == "user_id").then(|| value.to_string())
        })
        .ok_or_else(|| "missing user_id query parameter".to_string())?;

    raw.parse::<Uuid>()
        .map_err(|e| format!("invalid user_id: {e}"))
}

fn get_user_id(socket: &SocketRef) -> Option<Uuid> {
    socket.extensions.get::<Uuid>()
}

fn emit_error(socket: &SocketRef, err: &AppError) {
    let _ = socket.emit(
        "error",
        &ErrorPayload {
            code: err.code_str().to_string(),
            message: err.to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_request_payload_parses() {
        let payload: CallRequestPayload = serde_json::from_value(serde_json::json!({
            "receiver_id": Uuid::new_v4(),
            "call_type": "voice",
        }))
        .unwrap();
        assert_eq!(payload.call_type, CallType::Voice);
    }
}
