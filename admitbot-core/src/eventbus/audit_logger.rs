//! src/eventbus/audit_logger.rs
//!
//! Spawns a task that subscribes to the EventBus and logs every survey event.
//! Drains the queue on shutdown and returns the totals it saw.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::eventbus::{BotEvent, EventBus};

/// Totals collected by the audit task over its lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub started: u64,
    pub stored: u64,
    pub saved_locally: u64,
    pub cancelled: u64,
}

impl AuditSummary {
    fn record(&mut self, event: &BotEvent) {
        match event {
            BotEvent::SurveyStarted { user_id, .. } => {
                self.started += 1;
                info!("[audit] user={} started a survey", user_id);
            }
            BotEvent::SubmissionPersisted {
                user_id,
                applicant,
                stored: true,
                ..
            } => {
                self.stored += 1;
                info!("[audit] user={} submitted '{}' to the spreadsheet", user_id, applicant);
            }
            BotEvent::SubmissionPersisted {
                user_id, applicant, ..
            } => {
                self.saved_locally += 1;
                warn!("[audit] user={} submission '{}' kept in local backup", user_id, applicant);
            }
            BotEvent::SessionCancelled { user_id } => {
                self.cancelled += 1;
                info!("[audit] user={} cancelled", user_id);
            }
            BotEvent::SystemMessage(msg) => info!("[audit] {}", msg),
        }
    }
}

/// Spawns the audit task. The handle resolves with the final totals after
/// shutdown (or once every publisher is gone).
pub async fn spawn_audit_logger(event_bus: &EventBus, buffer_size: usize) -> JoinHandle<AuditSummary> {
    let mut rx = event_bus.subscribe(Some(buffer_size)).await;
    let mut shutdown_rx = event_bus.shutdown_rx.clone();

    tokio::spawn(async move {
        let mut summary = AuditSummary::default();
        info!("Audit logger started with buffer_size={}", buffer_size);

        loop {
            tokio::select! {
                biased;
                maybe_event = rx.recv() => {
                    match maybe_event {
                        Some(event) => summary.record(&event),
                        None => {
                            info!("Audit logger channel closed => break from loop.");
                            break;
                        }
                    }
                },
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Audit logger shutting down => break from loop.");
                        break;
                    }
                },
            }
        }

        while let Ok(event) = rx.try_recv() {
            summary.record(&event);
        }

        info!(
            "Audit logger exited: started={} stored={} saved_locally={} cancelled={}",
            summary.started, summary.stored, summary.saved_locally, summary.cancelled
        );
        summary
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn counts_events_until_shutdown() {
        let bus = EventBus::new();
        let handle = spawn_audit_logger(&bus, 16).await;

        bus.publish(BotEvent::SurveyStarted { user_id: 1, timestamp: Utc::now() }).await;
        bus.publish(BotEvent::SubmissionPersisted {
            user_id: 1,
            applicant: "Ivanov".into(),
            stored: true,
            timestamp: Utc::now(),
        })
        .await;
        bus.publish(BotEvent::SubmissionPersisted {
            user_id: 2,
            applicant: "Petrov".into(),
            stored: false,
            timestamp: Utc::now(),
        })
        .await;
        bus.publish(BotEvent::SessionCancelled { user_id: 2 }).await;
        bus.shutdown();

        let summary = handle.await.unwrap();
        assert_eq!(
            summary,
            AuditSummary { started: 1, stored: 1, saved_locally: 1, cancelled: 1 }
        );
    }
}
