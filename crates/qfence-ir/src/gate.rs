//! Gate types.
//!
//! Gate names follow the device catalog convention (upper case, e.g. `RX`,
//! `CZ`, `CPHASE`) so that a gate can be looked up in an operation catalog
//! by [`Gate::name`] without translation.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Controlled-Z gate.
    CZ,
    /// Controlled phase gate.
    CPhase(ParameterExpression),
    /// ZZ interaction, `exp(-i θ/2 Z⊗Z)`.
    Rzz(ParameterExpression),
}

impl StandardGate {
    /// Get the catalog name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "H",
            StandardGate::X => "X",
            StandardGate::Rx(_) => "RX",
            StandardGate::Rz(_) => "RZ",
            StandardGate::CZ => "CZ",
            StandardGate::CPhase(_) => "CPHASE",
            StandardGate::Rzz(_) => "RZZ",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::H | StandardGate::X | StandardGate::Rx(_) | StandardGate::Rz(_) => 1,
            StandardGate::CZ | StandardGate::CPhase(_) | StandardGate::Rzz(_) => 2,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Rz(p)
            | StandardGate::CPhase(p)
            | StandardGate::Rzz(p) => vec![p],
            StandardGate::H | StandardGate::X | StandardGate::CZ => vec![],
        }
    }

    /// Rebuild the gate with every parameter mapped through `f`.
    #[must_use]
    pub fn map_parameters(&self, f: impl Fn(&ParameterExpression) -> ParameterExpression) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(f(p)),
            StandardGate::Rz(p) => StandardGate::Rz(f(p)),
            StandardGate::CPhase(p) => StandardGate::CPhase(f(p)),
            StandardGate::Rzz(p) => StandardGate::Rzz(f(p)),
            StandardGate::H | StandardGate::X | StandardGate::CZ => self.clone(),
        }
    }
}

/// A device-specific gate known only by name, e.g. `XY` or `ISWAP`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<ParameterExpression>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }
}

/// A quantum gate, either standard or custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// A gate with known semantics.
    Standard(StandardGate),
    /// A device-specific gate.
    Custom(CustomGate),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Gate::Standard(g) => g.name(),
            Gate::Custom(g) => &g.name,
        }
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            Gate::Standard(g) => g.num_qubits(),
            Gate::Custom(g) => g.num_qubits,
        }
    }

    /// Get the parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            Gate::Standard(g) => g.parameters(),
            Gate::Custom(g) => g.params.iter().collect(),
        }
    }

    /// Rebuild the gate with every parameter mapped through `f`.
    #[must_use]
    pub fn map_parameters(&self, f: impl Fn(&ParameterExpression) -> ParameterExpression) -> Self {
        match self {
            Gate::Standard(g) => Gate::Standard(g.map_parameters(f)),
            Gate::Custom(g) => Gate::Custom(CustomGate {
                name: g.name.clone(),
                num_qubits: g.num_qubits,
                params: g.params.iter().map(f).collect(),
            }),
        }
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::Standard(gate)
    }
}

impl From<CustomGate> for Gate {
    fn from(gate: CustomGate) -> Self {
        Gate::Custom(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CZ.num_qubits(), 2);
        assert_eq!(StandardGate::CPhase(0.1.into()).name(), "CPHASE");
        assert!(StandardGate::CZ.parameters().is_empty());
    }

    #[test]
    fn test_custom_gate() {
        let xy = Gate::from(CustomGate::new("XY", 2).with_params(vec![0.5.into()]));
        assert_eq!(xy.name(), "XY");
        assert_eq!(xy.num_qubits(), 2);
        assert_eq!(xy.parameters().len(), 1);
    }

    #[test]
    fn test_map_parameters() {
        let gate = Gate::from(StandardGate::Rx(ParameterExpression::symbol("beta")));
        let doubled = gate.map_parameters(|p| p.scaled(2.0));
        assert_eq!(
            doubled,
            Gate::from(StandardGate::Rx(ParameterExpression::symbol("beta").scaled(2.0)))
        );
    }
}
