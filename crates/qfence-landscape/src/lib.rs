//! Fencing experiments over a two-parameter landscape.
//!
//! ```text
//!   WeightedGraph ──→ build_circuit ──→ prepare_executable ──→ SweepDriver ──→ ScoreLandscape
//!                                        │
//!                                        ├─ restrict catalog to one operator
//!                                        ├─ compile
//!                                        ├─ Local: compose rewritten fences
//!                                        └─ assemble
//! ```
//!
//! # Example
//!
//! ```ignore
//! use qfence_landscape::{Experiment, FencingPolicy, ParameterGrid, SweepDriver, WeightedGraph};
//!
//! let graph = WeightedGraph::build(edges, 42)?;
//! let experiment = Experiment { snapshot: &snapshot, compiler: &compiler, assembler: &assembler, operator: "CZ" };
//! let driver = SweepDriver::new(backend).with_shots(1000).with_concurrency(4);
//! let landscapes = experiment
//!     .compare_policies(&driver, &graph, &ParameterGrid::new(10)?)
//!     .await?;
//! println!("{}", landscapes.local);
//! ```

pub mod ansatz;
pub mod config;
pub mod error;
pub mod graph;
pub mod grid;
pub mod landscape;
pub mod pipeline;
pub mod sweep;

pub use ansatz::{BETA, GAMMA, build_circuit};
pub use config::SweepConfig;
pub use error::{LandscapeError, LandscapeResult};
pub use graph::{Assignment, WeightedGraph};
pub use grid::{GridPoint, ParameterGrid};
pub use landscape::{Cell, ScoreLandscape};
pub use pipeline::{Experiment, FencingPolicy, PolicyComparison, prepare_executable};
pub use sweep::{PointObserver, SweepDriver};
