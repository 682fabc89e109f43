//! src/eventbus/mod.rs
//!
//! In-process event bus: bounded MPSC queue per subscriber plus a shared
//! shutdown flag.

pub mod audit_logger;

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use chrono::{DateTime, Utc};

/// Events published by the survey service and the process lifecycle.
#[derive(Debug, Clone)]
pub enum BotEvent {
    /// A session entered the first question (start, restart or continue).
    SurveyStarted {
        user_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// A finished survey was handed to the sink. `stored` is false when the
    /// row went to the local backup instead.
    SubmissionPersisted {
        user_id: i64,
        applicant: String,
        stored: bool,
        timestamp: DateTime<Utc>,
    },

    /// `/cancel` dropped a session.
    SessionCancelled { user_id: i64 },

    SystemMessage(String),
}

impl BotEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BotEvent::SurveyStarted { .. } => "survey.started",
            BotEvent::SubmissionPersisted { .. } => "submission.persisted",
            BotEvent::SessionCancelled { .. } => "session.cancelled",
            BotEvent::SystemMessage(_) => "system_message",
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            BotEvent::SurveyStarted { user_id, .. }
            | BotEvent::SubmissionPersisted { user_id, .. }
            | BotEvent::SessionCancelled { user_id } => Some(*user_id),
            BotEvent::SystemMessage(_) => None,
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<BotEvent>` for guaranteed delivery.
///
/// - If the subscriber's channel buffer fills, `publish` awaits until there's
///   space (backpressure).
/// - If the subscriber has dropped the `Receiver`, sends to it are ignored.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BotEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

const DEFAULT_BUFFER_SIZE: usize = 1024;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Resolves once [`EventBus::shutdown`] has been called.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_rx.clone();
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BotEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: BotEvent) {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();

        let mut rx1 = bus.subscribe(Some(5)).await;
        let mut rx2 = bus.subscribe(Some(5)).await;

        bus.publish(BotEvent::SessionCancelled { user_id: 7 }).await;

        let evt1 = rx1.recv().await.expect("rx1 should get event");
        let evt2 = rx2.recv().await.expect("rx2 should get event");
        assert_eq!(evt1.user_id(), Some(7));
        assert_eq!(evt2.event_type(), "session.cancelled");
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_stall_submissions() {
        let bus = EventBus::new();
        let gone = bus.subscribe(Some(1)).await;
        drop(gone);
        let mut rx = bus.subscribe(Some(4)).await;

        let published = timeout(
            Duration::from_millis(200),
            bus.publish(BotEvent::SubmissionPersisted {
                user_id: 3,
                applicant: "Ivanov".into(),
                stored: false,
                timestamp: Utc::now(),
            }),
        )
        .await;
        assert!(published.is_ok(), "publish should not wait on a closed subscriber");

        match rx.recv().await {
            Some(evt @ BotEvent::SubmissionPersisted { stored: false, .. }) => {
                assert_eq!(evt.event_type(), "submission.persisted");
                assert_eq!(evt.user_id(), Some(3));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(BotEvent::SystemMessage("bot started".into()).user_id(), None);
    }

    #[tokio::test]
    async fn test_shutdown_flag() {
        let bus = EventBus::new();
        assert!(!bus.is_shutdown());

        let waiter = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.wait_for_shutdown().await })
        };
        bus.shutdown();

        timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
        assert!(bus.is_shutdown());
    }
}
