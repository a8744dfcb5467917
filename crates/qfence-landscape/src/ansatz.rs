//! Two-parameter variational circuit for a weighted graph.

use qfence_ir::{Circuit, QubitId};
use tracing::debug;

use crate::error::LandscapeResult;
use crate::graph::WeightedGraph;

/// Name of the mixing-layer parameter.
pub const BETA: &str = "beta";
/// Name of the interaction-layer parameter.
pub const GAMMA: &str = "gamma";

/// Build the one-layer circuit for `graph`:
///
/// ```text
///   RESET
///   H                 on every site
///   RZZ(2·γ·w)        on every edge (u, v, w)
///   RX(2·β)           on every site
///   MEASURE site i → ro[i]
/// ```
///
/// Sites follow [`WeightedGraph::sites`] throughout, so `ro[i]` always holds
/// site `i` of that enumeration.
pub fn build_circuit(graph: &WeightedGraph) -> LandscapeResult<Circuit> {
    let mut circuit = Circuit::new("maxcut");
    let sites: Vec<QubitId> = graph.sites().collect();
    for &site in &sites {
        circuit.add_qubit(site)?;
    }
    let ro = circuit.add_creg(sites.len() as u32);
    let beta = circuit.declare_parameter(BETA)?;
    let gamma = circuit.declare_parameter(GAMMA)?;

    circuit.reset_all()?;
    for &site in &sites {
        circuit.h(site)?;
    }
    for (u, v, w) in graph.edges() {
        circuit.rzz(gamma.scaled(2.0 * w), u, v)?;
    }
    for &site in &sites {
        circuit.rx(beta.scaled(2.0), site)?;
    }
    for (&site, clbit) in sites.iter().zip(ro) {
        circuit.measure(site, clbit)?;
    }

    debug!(
        sites = sites.len(),
        edges = graph.num_edges(),
        instructions = circuit.instructions().len(),
        "built circuit"
    );
    Ok(circuit)
}
