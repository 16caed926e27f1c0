// Routed signaling events.
//
// Every state transition in the relay produces a `SignalEvent` addressed to
// a per-user logical channel. A single broadcast bus fans events out to
// whatever transport is attached (the Socket.IO adapter in production, a
// plain subscriber in tests); the relay itself never touches a connection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Video,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Hangup,
    Disconnect,
    Timeout,
}

/// Canonical signal name, used verbatim as the transport event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalType {
    #[serde(rename = "incoming-call")]
    IncomingCall,
    #[serde(rename = "call-accepted")]
    CallAccepted,
    #[serde(rename = "call-rejected")]
    CallRejected,
    #[serde(rename = "call-ended")]
    CallEnded,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IncomingCall => "incoming-call",
            Self::CallAccepted => "call-accepted",
            Self::CallRejected => "call-rejected",
            Self::CallEnded => "call-ended",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingCallPayload {
    pub session_id: Uuid,
    pub caller_id: Uuid,
    pub call_type: CallType,
}

/// Shared by `call-accepted` and `call-rejected`: both report the
/// receiver's decision back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallAnsweredPayload {
    pub session_id: Uuid,
    pub receiver_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEndedPayload {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub reason: EndReason,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SignalPayload {
    Incoming(IncomingCallPayload),
    Answered(CallAnsweredPayload),
    Ended(CallEndedPayload),
}

/// A fully routed signaling event. `to` addresses the per-user channel:
/// every live connection of that user receives the event, never a single
/// connection.
#[derive(Debug, Clone, Serialize)]
pub struct SignalEvent {
    pub to: Uuid,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub created_at: DateTime<Utc>,
    pub data: SignalPayload,
}

impl SignalEvent {
    pub fn incoming_call(to: Uuid, session_id: Uuid, caller_id: Uuid, call_type: CallType) -> Self {
        Self::new(
            to,
            SignalType::IncomingCall,
            SignalPayload::Incoming(IncomingCallPayload {
                session_id,
                caller_id,
                call_type,
            }),
        )
    }

    pub fn call_accepted(to: Uuid, session_id: Uuid, receiver_id: Uuid) -> Self {
        Self::new(
            to,
            SignalType::CallAccepted,
            SignalPayload::Answered(CallAnsweredPayload {
                session_id,
                receiver_id,
            }),
        )
    }

    pub fn call_rejected(to: Uuid, session_id: Uuid, receiver_id: Uuid) -> Self {
        Self::new(
            to,
            SignalType::CallRejected,
            SignalPayload::Answered(CallAnsweredPayload {
                session_id,
                receiver_id,
            }),
        )
    }

    pub fn call_ended(to: Uuid, session_id: Uuid, user_id: Uuid, reason: EndReason) -> Self {
        Self::new(
            to,
            SignalType::CallEnded,
            SignalPayload::Ended(CallEndedPayload {
                session_id,
                user_id,
                reason,
            }),
        )
    }

    fn new(to: Uuid, signal_type: SignalType, data: SignalPayload) -> Self {
        Self {
            to,
            signal_type,
            created_at: Utc::now(),
            data,
        }
    }
}

/// Room name for a user's logical channel.
pub fn user_channel(user_id: Uuid) -> String {
    format!("user-{user_id}")
}

/// Broadcast fan-out for `SignalEvent`s. Cheap to clone; emitting with no
/// subscribers attached is fine (events are simply dropped).
#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<SignalEvent>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    pub fn with_capacity(cap: usize) -> Self {
        let (tx, _) = broadcast::channel(cap);
        Self { tx }
    }

    /// Publish an event, returning the number of subscribers that will see it.
    pub fn emit(&self, event: SignalEvent) -> usize {
        tracing::debug!(signal = %event.signal_type, to = %event.to, "signal emitted");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SignalEvent> {
        self.tx.subscribe()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}
