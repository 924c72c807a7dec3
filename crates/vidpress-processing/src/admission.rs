//! Admission control for transcode requests.
//!
//! Only a bounded number of pipelines run at once. A request that cannot get
//! a slot within the queue timeout is rejected instead of piling up.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("All {slots} transcode slots are busy")]
    Saturated { slots: usize },

    #[error("Timed out after {}s waiting for a transcode slot", .waited.as_secs())]
    QueueTimeout { waited: Duration },
}

/// Held for the duration of one pipeline run.
#[derive(Debug)]
pub struct TranscodePermit {
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug, Clone)]
pub struct TranscodeLimiter {
    semaphore: Arc<Semaphore>,
    slots: usize,
    queue_timeout: Duration,
}

impl TranscodeLimiter {
    /// `queue_timeout` of zero rejects immediately when every slot is taken.
    pub fn new(slots: usize, queue_timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(slots)),
            slots,
            queue_timeout,
        }
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub async fn acquire(&self) -> Result<TranscodePermit, AdmissionError> {
        if self.queue_timeout.is_zero() {
            return self
                .semaphore
                .clone()
                .try_acquire_owned()
                .map(|permit| TranscodePermit { _permit: permit })
                .map_err(|_| AdmissionError::Saturated { slots: self.slots });
        }

        match tokio::time::timeout(self.queue_timeout, self.semaphore.clone().acquire_owned())
            .await
        {
            Ok(Ok(permit)) => Ok(TranscodePermit { _permit: permit }),
            // The semaphore is never closed; treat it like saturation if it ever is.
            Ok(Err(_)) => Err(AdmissionError::Saturated { slots: self.slots }),
            Err(_) => {
                tracing::warn!(
                    slots = self.slots,
                    waited_secs = self.queue_timeout.as_secs(),
                    "No transcode slot became free in time"
                );
                Err(AdmissionError::QueueTimeout {
                    waited: self.queue_timeout,
                })
            }
        }
    }
}
