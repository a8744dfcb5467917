//! Calibration definitions and the fence rewriter.
//!
//! A calibration definition is the instruction body implementing one native
//! operator at one specific list of operand sites. Bodies are sequences of
//! control directives ([`Fence`]) and pulse-level instructions whose payload
//! is carried through untouched: only fences are ever rewritten.

use std::collections::BTreeMap;
use std::fmt;

use qfence_ir::QubitId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{IsaError, IsaResult};

/// A synchronization barrier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fence {
    /// Serializes against all activity on the device.
    Global,
    /// Serializes only against activity on the listed sites.
    Scoped(Vec<QubitId>),
}

impl Fence {
    /// Check whether this fence spans the whole device.
    pub fn is_global(&self) -> bool {
        matches!(self, Fence::Global)
    }
}

/// Frame-manipulating instruction kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameOpKind {
    SetFrequency,
    ShiftFrequency,
    SetPhase,
    ShiftPhase,
    SetScale,
    SwapPhases,
}

impl FrameOpKind {
    /// Keyword as written in a calibration program.
    pub fn keyword(self) -> &'static str {
        match self {
            FrameOpKind::SetFrequency => "SET-FREQUENCY",
            FrameOpKind::ShiftFrequency => "SHIFT-FREQUENCY",
            FrameOpKind::SetPhase => "SET-PHASE",
            FrameOpKind::ShiftPhase => "SHIFT-PHASE",
            FrameOpKind::SetScale => "SET-SCALE",
            FrameOpKind::SwapPhases => "SWAP-PHASES",
        }
    }
}

/// One instruction of a calibration body.
///
/// Argument strings are the verbatim text following the keyword and are
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalInstruction {
    /// Synchronization barrier.
    Fence(Fence),
    /// Pulse emission on a frame.
    Pulse { nonblocking: bool, args: String },
    /// Frame update.
    Frame { op: FrameOpKind, args: String },
    /// Idle for a duration.
    Delay { args: String },
    /// Readout capture.
    Capture { raw: bool, args: String },
    /// Anything else, kept as written.
    Other(String),
}

impl CalInstruction {
    /// The fence, if this instruction is one.
    pub fn as_fence(&self) -> Option<&Fence> {
        match self {
            CalInstruction::Fence(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for CalInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn with_args(f: &mut fmt::Formatter<'_>, keyword: &str, args: &str) -> fmt::Result {
            if args.is_empty() {
                write!(f, "{keyword}")
            } else {
                write!(f, "{keyword} {args}")
            }
        }

        match self {
            CalInstruction::Fence(Fence::Global) => write!(f, "FENCE"),
            CalInstruction::Fence(Fence::Scoped(sites)) => {
                write!(f, "FENCE")?;
                for site in sites {
                    write!(f, " {site}")?;
                }
                Ok(())
            }
            CalInstruction::Pulse { nonblocking, args } => {
                let keyword = if *nonblocking { "NONBLOCKING PULSE" } else { "PULSE" };
                with_args(f, keyword, args)
            }
            CalInstruction::Frame { op, args } => with_args(f, op.keyword(), args),
            CalInstruction::Delay { args } => with_args(f, "DELAY", args),
            CalInstruction::Capture { raw, args } => {
                with_args(f, if *raw { "RAW-CAPTURE" } else { "CAPTURE" }, args)
            }
            CalInstruction::Other(text) => write!(f, "{text}"),
        }
    }
}

/// Known operator arities, used to validate parsed headers.
pub fn operator_arity(name: &str) -> Option<usize> {
    match name {
        "RX" | "RZ" | "I" | "MEASURE" => Some(1),
        "CZ" | "CPHASE" | "XY" | "ISWAP" | "CNOT" => Some(2),
        _ => None,
    }
}

/// Lookup key of a calibration: operator name and operand sites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalibrationKey {
    pub name: String,
    pub operands: Vec<QubitId>,
}

/// The body implementing one operator at one list of operand sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDefinition {
    /// Operator name.
    pub name: String,
    /// Declared parameters, without the `%` sigil.
    pub parameters: Vec<String>,
    /// Operand sites in declared order.
    pub operands: Vec<QubitId>,
    /// Instruction body.
    pub body: Vec<CalInstruction>,
}

impl CalibrationDefinition {
    /// Create a validated definition.
    ///
    /// Rejects repeated parameters, repeated operands, scoped fences with no
    /// sites and, for operators of known arity, an operand count that does
    /// not match.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<String>,
        operands: Vec<QubitId>,
        body: Vec<CalInstruction>,
    ) -> IsaResult<Self> {
        let name = name.into();

        for (i, p) in parameters.iter().enumerate() {
            if parameters[..i].contains(p) {
                return Err(IsaError::DuplicateParameter {
                    name,
                    parameter: p.clone(),
                });
            }
        }
        for (i, site) in operands.iter().enumerate() {
            if operands[..i].contains(site) {
                return Err(IsaError::DuplicateOperand { name, site: *site });
            }
        }
        if body
            .iter()
            .any(|inst| matches!(inst.as_fence(), Some(Fence::Scoped(sites)) if sites.is_empty()))
        {
            return Err(IsaError::EmptyScopedFence { name });
        }
        if let Some(expected) = operator_arity(&name) {
            if expected != operands.len() {
                return Err(IsaError::ArityMismatch {
                    name,
                    expected,
                    got: operands.len(),
                });
            }
        }

        Ok(Self {
            name,
            parameters,
            operands,
            body,
        })
    }

    /// Lookup key of this definition.
    pub fn key(&self) -> CalibrationKey {
        CalibrationKey {
            name: self.name.clone(),
            operands: self.operands.clone(),
        }
    }

    /// Number of global fences in the body.
    pub fn global_fence_count(&self) -> usize {
        self.body
            .iter()
            .filter(|inst| inst.as_fence().is_some_and(Fence::is_global))
            .count()
    }

    /// Copy of this definition with every global fence scoped to the
    /// operands. Everything else, scoped fences included, is copied as is.
    pub fn with_scoped_fences(&self) -> IsaResult<Self> {
        if self.operands.is_empty() {
            return Err(IsaError::InvalidOperands {
                name: self.name.clone(),
            });
        }

        let body = self
            .body
            .iter()
            .map(|inst| match inst {
                CalInstruction::Fence(Fence::Global) => {
                    CalInstruction::Fence(Fence::Scoped(self.operands.clone()))
                }
                other => other.clone(),
            })
            .collect();

        Ok(Self {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            operands: self.operands.clone(),
            body,
        })
    }
}

/// A collection of calibrations with at most one definition per key.
///
/// Serializes as a list of definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<CalibrationDefinition>", from = "Vec<CalibrationDefinition>")]
pub struct CalibrationSet {
    definitions: BTreeMap<CalibrationKey, CalibrationDefinition>,
}

impl CalibrationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, returning the one it overrides.
    pub fn insert(&mut self, definition: CalibrationDefinition) -> Option<CalibrationDefinition> {
        self.definitions.insert(definition.key(), definition)
    }

    /// Add every definition of `other`; later definitions win.
    pub fn extend(&mut self, other: &CalibrationSet) {
        for definition in other.iter() {
            self.insert(definition.clone());
        }
    }

    /// Look up the definition for `name` at `operands`.
    pub fn get(&self, name: &str, operands: &[QubitId]) -> Option<&CalibrationDefinition> {
        self.definitions.get(&CalibrationKey {
            name: name.to_string(),
            operands: operands.to_vec(),
        })
    }

    /// Iterate over definitions in key order.
    pub fn iter(&self) -> impl Iterator<Item = &CalibrationDefinition> {
        self.definitions.values()
    }

    /// Definitions for one operator.
    pub fn for_operator<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a CalibrationDefinition> + 'a {
        self.iter().filter(move |d| d.name == name)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Scope the global fences of every `operator` calibration.
    ///
    /// Returns only the rewritten definitions; the input is left as is. The
    /// result is meant to be composed onto a program that already carries
    /// the full calibration set, overriding the matching keys.
    #[instrument(skip(self), fields(definitions = self.len()))]
    pub fn rewrite(&self, operator: &str) -> IsaResult<CalibrationSet> {
        let mut rewritten = CalibrationSet::new();
        let mut scoped_total = 0;

        for definition in self.for_operator(operator) {
            let scoped = definition.global_fence_count();
            debug!(
                operator,
                operands = ?definition.operands,
                scoped,
                "scoping fences"
            );
            scoped_total += scoped;
            rewritten.insert(definition.with_scoped_fences()?);
        }

        info!(
            operator,
            definitions = rewritten.len(),
            fences = scoped_total,
            "rewrote calibrations"
        );
        Ok(rewritten)
    }
}

impl FromIterator<CalibrationDefinition> for CalibrationSet {
    fn from_iter<T: IntoIterator<Item = CalibrationDefinition>>(iter: T) -> Self {
        let mut set = CalibrationSet::new();
        for definition in iter {
            set.insert(definition);
        }
        set
    }
}

impl From<Vec<CalibrationDefinition>> for CalibrationSet {
    fn from(definitions: Vec<CalibrationDefinition>) -> Self {
        definitions.into_iter().collect()
    }
}

impl From<CalibrationSet> for Vec<CalibrationDefinition> {
    fn from(set: CalibrationSet) -> Self {
        set.definitions.into_values().collect()
    }
}
