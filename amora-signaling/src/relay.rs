use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use amora_shared::errors::{AppError, AppResult, ErrorCode};

use crate::events::{CallType, EndReason, SignalBus, SignalEvent};
use crate::presence::PresenceTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Ringing,
    Accepted,
    Rejected,
    Ended,
}

impl CallState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Ended)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ringing => "ringing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// One call attempt between exactly two users.
#[derive(Debug, Clone, Serialize)]
pub struct CallSession {
    pub session_id: Uuid,
    pub caller_id: Uuid,
    pub receiver_id: Uuid,
    pub call_type: CallType,
    pub state: CallState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl CallSession {
    fn new(caller_id: Uuid, receiver_id: Uuid, call_type: CallType) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            caller_id,
            receiver_id,
            call_type,
            state: CallState::Ringing,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn other_party(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.caller_id {
            Some(self.receiver_id)
        } else if user_id == self.receiver_id {
            Some(self.caller_id)
        } else {
            None
        }
    }
}

/// Call-session state machine and event router.
///
/// Sessions live in memory only. The map lock is held just to resolve a
/// session; transitions run under the session's own mutex, and the
/// corresponding event is published before that mutex is released, so
/// per-session event order always matches transition order. Unrelated calls
/// never contend.
pub struct SignalingRelay {
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<CallSession>>>>,
    presence: Arc<PresenceTracker>,
    bus: SignalBus,
    require_reachable_peer: bool,
}

impl SignalingRelay {
    pub fn new(presence: Arc<PresenceTracker>, bus: SignalBus, require_reachable_peer: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            presence,
            bus,
            require_reachable_peer,
        }
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn session_snapshot(&self, session_id: Uuid) -> AppResult<CallSession> {
        Ok(self.session(session_id)?.lock().unwrap().clone())
    }

    /// Open a new call attempt in `Ringing` and route `incoming-call` to the
    /// receiver's channel.
    pub fn request_call(
        &self,
        caller_id: Uuid,
        receiver_id: Uuid,
        call_type: CallType,
    ) -> AppResult<CallSession> {
        if caller_id == receiver_id {
            return Err(AppError::new(ErrorCode::SelfCall, "cannot call yourself"));
        }
        if self.require_reachable_peer && !self.presence.is_reachable(receiver_id) {
            return Err(AppError::new(
                ErrorCode::PeerUnreachable,
                format!("user {receiver_id} is not reachable"),
            ));
        }

        let entry = Arc::new(Mutex::new(CallSession::new(caller_id, receiver_id, call_type)));
        let session = entry.lock().unwrap();
        self.sessions
            .write()
            .unwrap()
            .insert(session.session_id, entry.clone());

        self.presence.set_active_session(caller_id, session.session_id);
        self.presence.set_active_session(receiver_id, session.session_id);

        self.bus.emit(SignalEvent::incoming_call(
            receiver_id,
            session.session_id,
            caller_id,
            call_type,
        ));

        tracing::info!(
            session_id = %session.session_id,
            caller = %caller_id,
            receiver = %receiver_id,
            call_type = ?call_type,
            "call requested"
        );

        Ok(session.clone())
    }

    /// Receiver picked up. Valid only while ringing; routes `call-accepted`
    /// to the caller.
    pub fn accept_call(&self, session_id: Uuid) -> AppResult<CallSession> {
        let entry = self.session(session_id)?;
        let mut session = entry.lock().unwrap();

        if session.state != CallState::Ringing {
            return Err(Self::invalid_transition("accept", session.state));
        }
        session.state = CallState::Accepted;

        self.bus.emit(SignalEvent::call_accepted(
            session.caller_id,
            session.session_id,
            session.receiver_id,
        ));

        tracing::info!(session_id = %session.session_id, "call accepted");
        Ok(session.clone())
    }

    /// Receiver declined. Valid only while ringing; terminal.
    pub fn reject_call(&self, session_id: Uuid) -> AppResult<CallSession> {
        let entry = self.session(session_id)?;
        let mut session = entry.lock().unwrap();

        if session.state != CallState::Ringing {
            return Err(Self::invalid_transition("reject", session.state));
        }
        self.close(&mut session, CallState::Rejected);

        self.bus.emit(SignalEvent::call_rejected(
            session.caller_id,
            session.session_id,
            session.receiver_id,
        ));

        tracing::info!(session_id = %session.session_id, "call rejected");
        Ok(session.clone())
    }

    /// Hang up from either side, ringing or mid-call. Routes `call-ended`
    /// to the *other* party. Ending an already-terminal session is a no-op
    /// (idempotent hangup), not an error.
    pub fn end_call(
        &self,
        session_id: Uuid,
        ended_by: Uuid,
        reason: EndReason,
    ) -> AppResult<CallSession> {
        let entry = self.session(session_id)?;
        let mut session = entry.lock().unwrap();

        let other = session.other_party(ended_by).ok_or_else(|| {
            AppError::new(
                ErrorCode::NotCallParticipant,
                format!("user {ended_by} is not part of session {session_id}"),
            )
        })?;

        if session.state.is_terminal() {
            return Ok(session.clone());
        }
        self.close(&mut session, CallState::Ended);

        self.bus.emit(SignalEvent::call_ended(
            other,
            session.session_id,
            ended_by,
            reason,
        ));

        tracing::info!(session_id = %session.session_id, ended_by = %ended_by, reason = ?reason, "call ended");
        Ok(session.clone())
    }

    /// End every live session `user_id` takes part in (used when their last
    /// connection drops). Returns how many were ended.
    pub fn end_all_for(&self, user_id: Uuid, reason: EndReason) -> usize {
        let entries: Vec<Arc<Mutex<CallSession>>> =
            self.sessions.read().unwrap().values().cloned().collect();

        let mut ended = 0;
        for entry in entries {
            let mut session = entry.lock().unwrap();
            if session.state.is_terminal() {
                continue;
            }
            let Some(other) = session.other_party(user_id) else {
                continue;
            };
            self.close(&mut session, CallState::Ended);
            self.bus.emit(SignalEvent::call_ended(
                other,
                session.session_id,
                user_id,
                reason,
            ));
            ended += 1;
        }
        ended
    }

    /// Ring-timeout sweep: unanswered sessions ringing since before
    /// `now - ring_timeout` are ended and both parties are told. Returns the
    /// number of sessions expired.
    pub fn expire_stale_ringing(&self, now: DateTime<Utc>, ring_timeout: Duration) -> usize {
        let entries: Vec<Arc<Mutex<CallSession>>> =
            self.sessions.read().unwrap().values().cloned().collect();

        let mut expired = 0;
        for entry in entries {
            let mut session = entry.lock().unwrap();
            if session.state != CallState::Ringing {
                continue;
            }
            if now - session.started_at < ring_timeout {
                continue;
            }
            self.close(&mut session, CallState::Ended);
            for party in [session.receiver_id, session.caller_id] {
                self.bus.emit(SignalEvent::call_ended(
                    party,
                    session.session_id,
                    session.caller_id,
                    EndReason::Timeout,
                ));
            }
            expired += 1;
        }

        if expired > 0 {
            tracing::info!(expired, "expired unanswered calls");
        }
        expired
    }

    /// Drop terminal sessions that ended before `now - retention`.
    pub fn prune_terminal(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let session = entry.lock().unwrap();
            match session.ended_at {
                Some(ended_at) => now - ended_at < retention,
                None => true,
            }
        });
        before - sessions.len()
    }

    fn session(&self, session_id: Uuid) -> AppResult<Arc<Mutex<CallSession>>> {
        self.sessions
            .read()
            .unwrap()
            .get(&session_id)
            .cloned()
            .ok_or_else(|| {
                AppError::new(
                    ErrorCode::SessionNotFound,
                    format!("call session {session_id} not found"),
                )
            })
    }

    fn close(&self, session: &mut CallSession, state: CallState) {
        session.state = state;
        session.ended_at = Some(Utc::now());
        self.presence
            .clear_active_session(session.caller_id, session.session_id);
        self.presence
            .clear_active_session(session.receiver_id, session.session_id);
    }

    fn invalid_transition(action: &str, state: CallState) -> AppError {
        AppError::new(
            ErrorCode::InvalidCallTransition,
            format!("cannot {action} a call in state '{state}'"),
        )
    }
}
