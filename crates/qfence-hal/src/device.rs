//! Point-in-time device snapshots.

use qfence_isa::{CalibrationSet, OperationCatalog, parse_calibrations};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HalResult;

/// An immutable view of a device: its operation catalog and the
/// calibration program it was retrieved with.
///
/// A snapshot is taken fresh for each session and is not refreshed while
/// a sweep is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    name: String,
    catalog: OperationCatalog,
    calibrations: CalibrationSet,
}

impl DeviceSnapshot {
    /// Create a snapshot from parsed parts.
    pub fn new(
        name: impl Into<String>,
        catalog: OperationCatalog,
        calibrations: CalibrationSet,
    ) -> Self {
        Self {
            name: name.into(),
            catalog,
            calibrations,
        }
    }

    /// Create a snapshot from a raw ISA document and calibration program text.
    pub fn from_raw(
        name: impl Into<String>,
        isa: &serde_json::Value,
        calibration_program: &str,
    ) -> HalResult<Self> {
        let name = name.into();
        let catalog = OperationCatalog::from_json(isa)?;
        let calibrations = parse_calibrations(calibration_program)?;
        debug!(
            device = %name,
            sites = catalog.sites().count(),
            pairs = catalog.pairs().count(),
            calibrations = calibrations.len(),
            "loaded device snapshot"
        );
        Ok(Self::new(name, catalog, calibrations))
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-site and per-pair operation catalog.
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Device calibration program.
    pub fn calibrations(&self) -> &CalibrationSet {
        &self.calibrations
    }
}
