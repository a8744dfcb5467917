//! A backend stub that answers every request with the same batch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use qfence_hal::{Backend, Executable, HalError, HalResult, ShotBatch};
use qfence_ir::ParameterBindings;

/// Returns a fixed [`ShotBatch`] for every request.
///
/// Useful for exercising sweep drivers without simulating anything. The
/// stub can be told to fail one request and to hold each request open for
/// a while, and it records how many requests were dispatched and the peak
/// number in flight.
#[derive(Debug)]
pub struct FixedBatchBackend {
    batch: ShotBatch,
    max_concurrent: usize,
    fail_at: Option<usize>,
    latency: Option<Duration>,
    dispatched: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FixedBatchBackend {
    pub fn new(batch: ShotBatch) -> Self {
        Self {
            batch,
            max_concurrent: 1,
            fail_at: None,
            latency: None,
            dispatched: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Report `max_concurrent` as the accepted concurrency.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Fail the request dispatched `index`-th (zero-based).
    #[must_use]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Hold every request open for `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests dispatched so far.
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FixedBatchBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent
    }

    async fn run(
        &self,
        _executable: &Executable,
        _bindings: &ParameterBindings,
        _shots: u32,
    ) -> HalResult<ShotBatch> {
        let index = self.dispatched.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_at == Some(index) {
            debug!(index, "failing request");
            return Err(HalError::Dispatch(format!("request {index} rejected")));
        }
        Ok(self.batch.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfence_hal::NativeProgram;

    #[tokio::test]
    async fn test_fails_only_the_chosen_request() {
        let backend =
            FixedBatchBackend::new(ShotBatch::repeated(vec![1, 0], 3).unwrap()).failing_at(1);
        let exe = Executable::new(NativeProgram::new("p"), "");
        let bindings = ParameterBindings::default();

        assert!(backend.run(&exe, &bindings, 3).await.is_ok());
        assert!(matches!(
            backend.run(&exe, &bindings, 3).await,
            Err(HalError::Dispatch(_))
        ));
        assert_eq!(backend.run(&exe, &bindings, 3).await.unwrap().shots(), 3);
        assert_eq!(backend.dispatched(), 3);
        assert_eq!(backend.peak_in_flight(), 1);
    }
}
