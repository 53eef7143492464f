use crate::application::ports::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Push-fed connectivity state. Platform network-change callbacks (or the
/// probe loop) report the current status; subscribers only see transitions.
pub struct NetworkStatusMonitor {
    reachable: AtomicBool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl NetworkStatusMonitor {
    pub fn new(initially_reachable: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            reachable: AtomicBool::new(initially_reachable),
            events,
        }
    }

    /// Records the latest observation and returns the transition it caused, if any.
    pub fn report(&self, reachable: bool) -> Option<ConnectivityEvent> {
        let previous = self.reachable.swap(reachable, Ordering::SeqCst);
        if previous == reachable {
            return None;
        }

        let event = if reachable {
            ConnectivityEvent::BecameReachable
        } else {
            ConnectivityEvent::BecameUnreachable
        };
        tracing::info!(
            target: "offline::connectivity",
            event = ?event,
            "connectivity changed"
        );
        // No subscribers is fine; the state itself is already updated.
        let _ = self.events.send(event);
        Some(event)
    }
}

impl ConnectivityMonitor for NetworkStatusMonitor {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}
