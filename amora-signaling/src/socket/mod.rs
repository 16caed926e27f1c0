pub mod handlers;

use socketioxide::SocketIo;
use tokio::sync::broadcast;

use crate::events::{user_channel, SignalBus};

/// Bridge the relay's bus onto Socket.IO rooms: every event lands in the
/// target user's `user-<id>` room, reaching all of their connections.
pub fn spawn_forwarder(io: SocketIo, bus: &SignalBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let room = user_channel(event.to);
                    let _ = io.to(room).emit(event.signal_type.as_str(), &event.data);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "signal forwarder lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
