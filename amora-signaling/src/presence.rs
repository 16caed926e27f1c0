use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Point-in-time view of a user's presence.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceState {
    pub is_online: bool,
    pub connections: u32,
    pub last_seen_at: DateTime<Utc>,
    pub active_session_id: Option<Uuid>,
}

#[derive(Debug)]
struct PresenceEntry {
    connections: u32,
    last_seen_at: DateTime<Utc>,
    active_session_id: Option<Uuid>,
}

impl PresenceEntry {
    fn new() -> Self {
        Self {
            connections: 0,
            last_seen_at: Utc::now(),
            active_session_id: None,
        }
    }
}

/// Per-user online/offline state, fed by transport connect/disconnect.
///
/// A user may hold several simultaneous connections (tabs, devices); the
/// tracker counts them, so dropping one connection while another is open
/// does not mark the user offline. Entries are created on first contact and
/// never destroyed - `last_seen_at` stays meaningful across sessions. The
/// outer map lock only resolves the entry; updates run under the per-user
/// mutex.
#[derive(Default)]
pub struct PresenceTracker {
    entries: RwLock<HashMap<Uuid, Arc<Mutex<PresenceEntry>>>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, user_id: Uuid) -> Arc<Mutex<PresenceEntry>> {
        let mut entries = self.entries.write().unwrap();
        entries
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(PresenceEntry::new())))
            .clone()
    }

    /// Register one more live connection; returns the new count.
    pub fn connect(&self, user_id: Uuid) -> u32 {
        let entry = self.entry(user_id);
        let mut e = entry.lock().unwrap();
        e.connections += 1;
        e.last_seen_at = Utc::now();
        e.connections
    }

    /// Drop one connection; returns how many remain. Going below zero is
    /// clamped (a stray disconnect is not an error).
    pub fn disconnect(&self, user_id: Uuid) -> u32 {
        let entry = self.entry(user_id);
        let mut e = entry.lock().unwrap();
        e.connections = e.connections.saturating_sub(1);
        e.last_seen_at = Utc::now();
        e.connections
    }

    pub fn is_reachable(&self, user_id: Uuid) -> bool {
        let entries = self.entries.read().unwrap();
        entries
            .get(&user_id)
            .map(|entry| entry.lock().unwrap().connections > 0)
            .unwrap_or(false)
    }

    pub fn set_active_session(&self, user_id: Uuid, session_id: Uuid) {
        let entry = self.entry(user_id);
        entry.lock().unwrap().active_session_id = Some(session_id);
    }

    /// Clear the active session, but only if it still is `session_id`; a
    /// newer call is left untouched.
    pub fn clear_active_session(&self, user_id: Uuid, session_id: Uuid) {
        let entry = self.entry(user_id);
        let mut e = entry.lock().unwrap();
        if e.active_session_id == Some(session_id) {
            e.active_session_id = None;
        }
    }

    pub fn active_session(&self, user_id: Uuid) -> Option<Uuid> {
        let entries = self.entries.read().unwrap();
        entries
            .get(&user_id)
            .and_then(|entry| entry.lock().unwrap().active_session_id)
    }

    /// None for users that never connected.
    pub fn snapshot(&self, user_id: Uuid) -> Option<PresenceState> {
        let entries = self.entries.read().unwrap();
        entries.get(&user_id).map(|entry| {
            let e = entry.lock().unwrap();
            PresenceState {
                is_online: e.connections > 0,
                connections: e.connections,
                last_seen_at: e.last_seen_at,
                active_session_id: e.active_session_id,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_marks_online() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        assert!(!tracker.is_reachable(user));

        tracker.connect(user);
        assert!(tracker.is_reachable(user));
    }

    #[test]
    fn second_connection_survives_first_disconnect() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        tracker.connect(user);
        tracker.connect(user);

        assert_eq!(tracker.disconnect(user), 1);
        assert!(tracker.is_reachable(user));

        assert_eq!(tracker.disconnect(user), 0);
        assert!(!tracker.is_reachable(user));
    }

    #[test]
    fn stray_disconnect_is_clamped() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        assert_eq!(tracker.disconnect(user), 0);
        assert!(!tracker.is_reachable(user));
    }

    #[test]
    fn entry_persists_after_going_offline() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        tracker.connect(user);
        tracker.disconnect(user);

        let state = tracker.snapshot(user).unwrap();
        assert!(!state.is_online);
        assert_eq!(state.connections, 0);
    }

    #[test]
    fn last_seen_moves_forward() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        tracker.connect(user);
        let first = tracker.snapshot(user).unwrap().last_seen_at;

        tracker.disconnect(user);
        let second = tracker.snapshot(user).unwrap().last_seen_at;
        assert!(second >= first);
    }

    #[test]
    fn unknown_user_has_no_snapshot() {
        let tracker = PresenceTracker::new();
        assert!(tracker.snapshot(Uuid::new_v4()).is_none());
    }

    #[test]
    fn active_session_clear_only_matches_same_call() {
        let tracker = PresenceTracker::new();
        let user = Uuid::new_v4();
        let old_call = Uuid::new_v4();
        let new_call = Uuid::new_v4();

        tracker.set_active_session(user, old_call);
        tracker.set_active_session(user, new_call);

        // Late teardown of the old call must not clobber the new one.
        tracker.clear_active_session(user, old_call);
        assert_eq!(tracker.active_session(user), Some(new_call));

        tracker.clear_active_session(user, new_call);
        assert_eq!(tracker.active_session(user), None);
    }
}
