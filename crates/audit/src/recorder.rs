use std::time::Duration;

use common::CorrelationId;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{AuditError, AuditEvent, EntityType, EventSink, EventType, Result};

/// Attempts per event before the retry worker gives up.
const MAX_RETRY_ATTEMPTS: u32 = 5;

/// Base delay for the retry backoff; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Records audit events for business mutations.
///
/// `record` derives the composite key and expiry, then appends through
/// the sink. The append is best-effort with respect to the caller's
/// business operation: on failure the event is handed to the
/// [`RetryWorker`] and the error is returned so the caller can log it,
/// but the caller must not fail its own operation over it.
#[derive(Clone)]
pub struct EventRecorder<E: EventSink + Clone> {
    sink: E,
    retry_tx: mpsc::UnboundedSender<AuditEvent>,
}

impl<E: EventSink + Clone> EventRecorder<E> {
    /// Creates a recorder and its retry worker.
    ///
    /// The worker owns the receiving end of the retry queue; spawn
    /// [`RetryWorker::run`] on the runtime. It exits once every recorder
    /// clone has been dropped and the queue has drained.
    pub fn with_retry(sink: E) -> (Self, RetryWorker<E>) {
        let (retry_tx, retry_rx) = mpsc::unbounded_channel();
        let recorder = Self {
            sink: sink.clone(),
            retry_tx,
        };
        let worker = RetryWorker {
            sink,
            retry_rx,
        };
        (recorder, worker)
    }

    /// Records one audit event for a completed mutation.
    ///
    /// Computes `created_at` as the current time, derives the
    /// partition/sort keys, stamps the five-minute expiry, and appends.
    #[tracing::instrument(skip(self, payload), fields(entity = %entity_code, event = %event_type))]
    pub async fn record<P: Serialize>(
        &self,
        entity_type: EntityType,
        entity_code: &str,
        event_type: EventType,
        actor_email: &str,
        correlation_id: CorrelationId,
        payload: &P,
    ) -> Result<()> {
        let payload = serde_json::to_value(payload)?;
        let event = AuditEvent::new(
            entity_type,
            entity_code,
            event_type,
            actor_email,
            correlation_id,
            payload,
        );

        match self.sink.append(event.clone()).await {
            Ok(()) => {
                metrics::counter!("audit_events_recorded").increment(1);
                Ok(())
            }
            Err(err) => {
                metrics::counter!("audit_events_failed").increment(1);
                tracing::warn!(
                    partition_key = %event.partition_key,
                    sort_key = %event.sort_key,
                    error = %err,
                    "audit append failed, queued for retry"
                );
                self.retry_tx
                    .send(event)
                    .map_err(|_| AuditError::QueueClosed)?;
                Err(err)
            }
        }
    }
}

/// Background task that re-appends audit events whose first write failed.
///
/// Each attempt restamps the event (the trail requires at least one
/// record per mutation, not exactly one) and waits with doubling delay
/// between attempts. An event is dropped only after the attempt budget
/// is exhausted.
pub struct RetryWorker<E: EventSink> {
    sink: E,
    retry_rx: mpsc::UnboundedReceiver<AuditEvent>,
}

impl<E: EventSink> RetryWorker<E> {
    /// Consumes the retry queue until all senders are gone.
    pub async fn run(mut self) {
        while let Some(event) = self.retry_rx.recv().await {
            self.retry(event).await;
        }
        tracing::debug!("audit retry queue closed, worker exiting");
    }

    async fn retry(&self, event: AuditEvent) {
        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt - 1)).await;

            let restamped = event.refreshed();
            match self.sink.append(restamped).await {
                Ok(()) => {
                    metrics::counter!("audit_events_retried").increment(1);
                    tracing::debug!(
                        partition_key = %event.partition_key,
                        attempt,
                        "audit event recorded on retry"
                    );
                    return;
                }
                Err(err) => {
                    tracing::warn!(
                        partition_key = %event.partition_key,
                        attempt,
                        error = %err,
                        "audit retry failed"
                    );
                }
            }
        }

        tracing::error!(
            partition_key = %event.partition_key,
            sort_key = %event.sort_key,
            "audit event dropped after exhausting retries"
        );
    }
}
