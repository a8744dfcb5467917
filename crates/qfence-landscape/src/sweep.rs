//! Landscape sweep driver.
//!
//! Each grid point is one backend request with `beta` and `gamma` bound;
//! the returned batch is reduced to the mean graph score. Points are
//! independent, so the driver either walks them in order or fans them out
//! to at most `concurrency` requests in flight:
//!
//! ```text
//!   concurrency = 1   point 0 ──→ point 1 ──→ ... ──→ point n-1
//!   concurrency = k   buffer_unordered(k) over points, results by index
//! ```
//!
//! The first failed request ends the sweep. In-flight requests are dropped
//! and no further points are dispatched.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt, TryStreamExt};
use qfence_hal::{Backend, Executable};
use tracing::{debug, info, instrument, warn};

use crate::error::{LandscapeError, LandscapeResult};
use crate::graph::WeightedGraph;
use crate::grid::{GridPoint, ParameterGrid};
use crate::landscape::ScoreLandscape;

/// Callback invoked once per completed grid point.
pub type PointObserver = Arc<dyn Fn(&GridPoint, f64) + Send + Sync>;

/// Drives a backend over a parameter grid.
pub struct SweepDriver<B> {
    backend: B,
    shots: u32,
    concurrency: usize,
    observer: Option<PointObserver>,
}

impl<B: Backend> SweepDriver<B> {
    /// Sequential driver requesting 1000 shots per point.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            shots: 1000,
            concurrency: 1,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Allow up to `concurrency` requests in flight. Values above the
    /// backend's limit are clamped to it.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Register a callback run after each point completes.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&GridPoint, f64) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    /// Concurrency actually used against this backend.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .min(self.backend.max_concurrent_requests().max(1))
    }

    /// Evaluate `executable` at every point of `grid`.
    #[instrument(skip_all, fields(
        backend = %self.backend.name(),
        program = %executable.program().name,
        width = grid.width(),
        shots = self.shots,
    ))]
    pub async fn sweep(
        &self,
        executable: &Executable,
        graph: &WeightedGraph,
        grid: &ParameterGrid,
    ) -> LandscapeResult<ScoreLandscape> {
        if self.shots == 0 {
            return Err(LandscapeError::Config("shots must be positive".into()));
        }
        let start = Instant::now();

        let concurrency = self.effective_concurrency();
        if concurrency < self.concurrency {
            warn!(
                requested = self.concurrency,
                allowed = concurrency,
                "clamping sweep concurrency to backend limit"
            );
        }

        let mut scores = vec![0.0; grid.len()];
        if concurrency == 1 {
            for point in grid.points() {
                scores[point.index] = self.evaluate(executable, graph, point).await?;
            }
        } else {
            let mut results = stream::iter(grid.points())
                .map(|point| async move {
                    self.evaluate(executable, graph, point)
                        .await
                        .map(|score| (point.index, score))
                })
                .buffer_unordered(concurrency);
            while let Some((index, score)) = results.try_next().await? {
                scores[index] = score;
            }
        }

        let landscape = ScoreLandscape::from_row_major(grid.clone(), scores)
            .ok_or_else(|| LandscapeError::InvalidGrid("score count does not match grid".into()))?;
        info!(
            points = grid.len(),
            concurrency,
            elapsed = ?start.elapsed(),
            mean = landscape.mean().unwrap_or(0.0),
            "sweep completed"
        );
        Ok(landscape)
    }

    async fn evaluate(
        &self,
        executable: &Executable,
        graph: &WeightedGraph,
        point: GridPoint,
    ) -> LandscapeResult<f64> {
        let batch = self
            .backend
            .run(executable, &point.bindings(), self.shots)
            .await
            .map_err(|source| LandscapeError::BackendDispatch {
                index: point.index,
                source,
            })?;
        if batch.is_empty() {
            return Err(LandscapeError::EmptyBatch { index: point.index });
        }

        let mut total = 0.0;
        for row in batch.iter() {
            total += graph.score_bits(row)?;
        }
        let score = total / batch.shots() as f64;

        debug!(
            index = point.index,
            beta = point.beta,
            gamma = point.gamma,
            score,
            "evaluated grid point"
        );
        if let Some(observer) = &self.observer {
            observer(&point, score);
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfence_hal::{HalError, NativeProgram, ShotBatch};
    use qfence_ir::{ParameterBindings, QubitPair};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fail;

    #[async_trait::async_trait]
    impl Backend for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        async fn run(
            &self,
            _executable: &Executable,
            _bindings: &ParameterBindings,
            _shots: u32,
        ) -> qfence_hal::HalResult<ShotBatch> {
            Err(HalError::Dispatch("offline".into()))
        }
    }

    struct Empty;

    #[async_trait::async_trait]
    impl Backend for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        async fn run(
            &self,
            _executable: &Executable,
            _bindings: &ParameterBindings,
            _shots: u32,
        ) -> qfence_hal::HalResult<ShotBatch> {
            ShotBatch::new(2, vec![])
        }
    }

    fn graph() -> WeightedGraph {
        WeightedGraph::with_weights([(QubitPair::new(0u32, 1u32).unwrap(), 0.5)]).unwrap()
    }

    fn executable() -> Executable {
        Executable::new(NativeProgram::new("p"), "")
    }

    #[tokio::test]
    async fn test_dispatch_failure_reports_first_index() {
        let grid = ParameterGrid::new(2).unwrap();
        let err = SweepDriver::new(Fail)
            .sweep(&executable(), &graph(), &grid)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LandscapeError::BackendDispatch { index: 0, source: HalError::Dispatch(_) }
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_is_an_error() {
        let grid = ParameterGrid::new(1).unwrap();
        let err = SweepDriver::new(Empty)
            .sweep(&executable(), &graph(), &grid)
            .await
            .unwrap_err();
        assert!(matches!(err, LandscapeError::EmptyBatch { index: 0 }));
    }

    #[tokio::test]
    async fn test_concurrency_clamped_to_backend() {
        let driver = SweepDriver::new(Empty).with_concurrency(16);
        assert_eq!(driver.effective_concurrency(), 1);
    }

    #[tokio::test]
    async fn test_zero_shots_rejected() {
        let grid = ParameterGrid::new(1).unwrap();
        let err = SweepDriver::new(Empty)
            .with_shots(0)
            .sweep(&executable(), &graph(), &grid)
            .await
            .unwrap_err();
        assert!(matches!(err, LandscapeError::Config(_)));
    }

    #[tokio::test]
    async fn test_observer_sees_every_point() {
        struct Agree;

        #[async_trait::async_trait]
        impl Backend for Agree {
            fn name(&self) -> &str {
                "agree"
            }

            async fn run(
                &self,
                _executable: &Executable,
                _bindings: &ParameterBindings,
                shots: u32,
            ) -> qfence_hal::HalResult<ShotBatch> {
                ShotBatch::repeated(vec![1, 1], shots as usize)
            }
        }

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let grid = ParameterGrid::new(3).unwrap();
        let landscape = SweepDriver::new(Agree)
            .with_shots(4)
            .with_observer(move |_, score| {
                assert_eq!(score, 0.5);
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .sweep(&executable(), &graph(), &grid)
            .await
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 9);
        assert!(landscape.scores().iter().all(|s| *s == 0.5));
    }
}
