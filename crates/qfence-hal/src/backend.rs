//! Backend trait.
//!
//! A backend runs an [`Executable`] with concrete parameter values and
//! returns one row of output bits per repetition:
//!
//! ```text
//!   run(executable, bindings, shots) ──→ ShotBatch
//! ```
//!
//! Backends are passed to callers explicitly; there is no ambient session.

use std::sync::Arc;

use async_trait::async_trait;
use qfence_ir::ParameterBindings;

use crate::error::HalResult;
use crate::program::Executable;
use crate::result::ShotBatch;

/// Trait for execution backends.
///
/// # Contract
///
/// - Row `i` of every returned shot has one entry per declared output
///   bit, entry `j` being the value measured into `ro[j]`.
/// - `run` returns exactly `shots` rows or an error.
/// - `max_concurrent_requests()` reports how many `run` calls may be in
///   flight at once. The default of 1 means requests must be serialized.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Number of requests this backend accepts concurrently.
    fn max_concurrent_requests(&self) -> usize {
        1
    }

    /// Execute `executable` with `bindings` for `shots` repetitions.
    async fn run(
        &self,
        executable: &Executable,
        bindings: &ParameterBindings,
        shots: u32,
    ) -> HalResult<ShotBatch>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn max_concurrent_requests(&self) -> usize {
        (**self).max_concurrent_requests()
    }

    async fn run(
        &self,
        executable: &Executable,
        bindings: &ParameterBindings,
        shots: u32,
    ) -> HalResult<ShotBatch> {
        (**self).run(executable, bindings, shots).await
    }
}
