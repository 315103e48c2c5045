//! Event channel built on crossbeam-channel.
//!
//! Scans can run on worker threads while a UI thread drains the
//! receiver, so both halves are `Send`.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::{Event, ScanEvent};

/// Sending half handed to the scanner.
///
/// Cheap to clone. A sender without a channel behind it drops every
/// event, which is what [`null_sender`] returns.
#[derive(Clone, Debug, Default)]
pub struct EventSender {
    inner: Option<Sender<Event>>,
}

impl EventSender {
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            inner: Some(sender),
        }
    }

    /// Send an event. Events for a dropped receiver are discarded.
    pub fn send(&self, event: Event) {
        if let Some(sender) = &self.inner {
            let _ = sender.send(event);
        }
    }

    /// Shorthand for `send(Event::Scan(..))`
    pub fn scan(&self, event: ScanEvent) {
        self.send(Event::Scan(event));
    }

    /// Whether anybody can still observe events from this sender
    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }
}

/// Receiving half, held by the UI layer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Collect whatever is already queued without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Factory for connected sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel. Scan events are small and infrequent.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }

    /// Bounded channel; the scanner blocks when a slow UI falls behind.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

/// A sender that discards everything.
pub fn null_sender() -> EventSender {
    EventSender::default()
}
