use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{KiremeError, Result};
use crate::merge::MergeStatus;
use crate::workflow::{CutOutcome, MergeReport};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal result of one worker invocation.
#[derive(Debug)]
pub enum OperationOutcome {
    Cut(Result<CutOutcome>),
    Merge(Result<MergeReport>),
}

#[derive(Debug)]
pub struct OperationEvent {
    pub base_name: String,
    pub outcome: OperationOutcome,
}

/// Runs each cut or merge invocation on its own worker task and hands the
/// results back over a channel drained by a non-blocking polling loop.
///
/// Invocations are serialized per base name: submitting while an operation
/// for the same base name is in flight is rejected. There is no
/// cancellation once a worker starts.
pub struct EngineRunner {
    in_flight: Arc<Mutex<HashSet<String>>>,
    tx: mpsc::UnboundedSender<OperationEvent>,
    rx: mpsc::UnboundedReceiver<OperationEvent>,
}

impl Default for EngineRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRunner {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            tx,
            rx,
        }
    }

    /// Spawn one invocation on a dedicated worker task.
    pub fn submit<F>(&self, base_name: &str, operation: F) -> Result<()>
    where
        F: Future<Output = OperationOutcome> + Send + 'static,
    {
        {
            let mut in_flight = self
                .in_flight
                .lock()
                .map_err(|_| KiremeError::Busy(base_name.to_string()))?;
            if !in_flight.insert(base_name.to_string()) {
                return Err(KiremeError::Busy(base_name.to_string()));
            }
        }

        let base_name = base_name.to_string();
        let tx = self.tx.clone();
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            debug!("Worker started for '{}'", base_name);
            let outcome = operation.await;
            // Send before releasing the slot so the polling loop never sees
            // an idle runner with an undelivered event.
            let _ = tx.send(OperationEvent {
                base_name: base_name.clone(),
                outcome,
            });
            if let Ok(mut set) = in_flight.lock() {
                set.remove(&base_name);
            }
            debug!("Worker finished for '{}'", base_name);
        });

        Ok(())
    }

    pub fn is_busy(&self, base_name: &str) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(base_name))
            .unwrap_or(false)
    }

    /// Drain the next finished invocation without ever blocking on a
    /// worker: checks the channel on a fixed ~100ms tick. Returns `None`
    /// once nothing is in flight and the channel is empty.
    pub async fn next_event(&mut self) -> Option<OperationEvent> {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            if let Ok(event) = self.rx.try_recv() {
                return Some(event);
            }
            let idle = self
                .in_flight
                .lock()
                .map(|set| set.is_empty())
                .unwrap_or(true);
            if idle {
                // Workers deliver before releasing their slot; one final
                // drain catches an event that raced the idle check.
                return self.rx.try_recv().ok();
            }
            ticker.tick().await;
        }
    }
}

/// Log a finished invocation in consolidated form: counts of succeeded and
/// failed items with reasons, never a silent failure.
pub fn log_outcome(event: &OperationEvent) {
    match &event.outcome {
        OperationOutcome::Cut(Ok(outcome)) => {
            info!(
                "Cut '{}' finished: {} new files, {} deleted, {} delete failures",
                event.base_name,
                outcome.new_files.len(),
                outcome.deleted_files.len(),
                outcome.failed_deletes.len()
            );
        }
        OperationOutcome::Cut(Err(e)) => {
            warn!("Cut '{}' failed: {}", event.base_name, e);
        }
        OperationOutcome::Merge(Ok(report)) => {
            info!(
                "Merge '{}' finished: {} succeeded, {} failed",
                event.base_name,
                report.succeeded(),
                report.failed()
            );
            for (language, status) in &report.results {
                if let MergeStatus::Failed { reason } = status {
                    info!("  {}: {}", language, reason);
                }
            }
        }
        OperationOutcome::Merge(Err(e)) => {
            warn!("Merge '{}' failed: {}", event.base_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_worker_result_arrives_via_polling() {
        let mut runner = EngineRunner::new();
        runner
            .submit("talk", async {
                OperationOutcome::Cut(Ok(CutOutcome::default()))
            })
            .unwrap();

        let event = runner.next_event().await.unwrap();
        assert_eq!(event.base_name, "talk");
        assert!(matches!(event.outcome, OperationOutcome::Cut(Ok(_))));
        assert!(!runner.is_busy("talk"));
    }

    #[tokio::test]
    async fn test_same_base_name_is_rejected_while_in_flight() {
        let mut runner = EngineRunner::new();
        runner
            .submit("talk", async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                OperationOutcome::Merge(Ok(MergeReport::default()))
            })
            .unwrap();

        let second = runner.submit("talk", async {
            OperationOutcome::Merge(Ok(MergeReport::default()))
        });
        assert!(matches!(second, Err(KiremeError::Busy(_))));

        // A different base name is fine concurrently.
        runner
            .submit("other", async {
                OperationOutcome::Merge(Ok(MergeReport::default()))
            })
            .unwrap();

        let mut seen = Vec::new();
        while let Some(event) = runner.next_event().await {
            seen.push(event.base_name);
        }
        seen.sort();
        assert_eq!(seen, vec!["other".to_string(), "talk".to_string()]);
    }

    #[tokio::test]
    async fn test_idle_runner_returns_none() {
        let mut runner = EngineRunner::new();
        assert!(runner.next_event().await.is_none());
    }
}
