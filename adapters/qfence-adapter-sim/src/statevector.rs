//! Statevector simulation engine.
//!
//! Sites are addressed by dense local indices; the caller maps device
//! labels onto `0..n` before applying gates.

use num_complex::Complex64;
use rand::Rng;

/// A statevector over `n` dense qubits.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Return every qubit to |0⟩.
    pub fn reset_all(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    pub fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    pub fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    pub fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    pub fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    pub fn apply_cz(&mut self, q1: usize, q2: usize) {
        self.apply_cphase(q1, q2, std::f64::consts::PI);
    }

    pub fn apply_cphase(&mut self, q1: usize, q2: usize, theta: f64) {
        let mask = (1 << q1) | (1 << q2);
        let phase = Complex64::from_polar(1.0, theta);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp *= phase;
            }
        }
    }

    /// `exp(-i θ/2 Z⊗Z)`.
    pub fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let (m1, m2) = (1 << q1, 1 << q2);
        let even = Complex64::from_polar(1.0, -theta / 2.0);
        let odd = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = ((i & m1) != 0) ^ ((i & m2) != 0);
            *amp *= if parity { odd } else { even };
        }
    }

    // =========================================================================
    // Readout
    // =========================================================================

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }
}

/// Cumulative distribution for repeated sampling of one final state.
#[derive(Debug, Clone)]
pub struct Sampler {
    cumulative: Vec<f64>,
}

impl Sampler {
    pub fn new(state: &Statevector) -> Self {
        let mut total = 0.0;
        let cumulative = state
            .probabilities()
            .into_iter()
            .map(|p| {
                total += p;
                total
            })
            .collect();
        Self { cumulative }
    }

    /// Draw one basis state.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(1.0);
        let r: f64 = rng.r#gen::<f64>() * total;
        self.cumulative
            .partition_point(|&c| c <= r)
            .min(self.cumulative.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_probs(sv: &Statevector, expected: &[f64]) {
        for (got, want) in sv.probabilities().iter().zip(expected) {
            assert!((got - want).abs() < 1e-10, "{got} != {want}");
        }
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert_eq!(sv.num_qubits(), 2);
        assert_probs(&sv, &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_x_gate() {
        let mut sv = Statevector::new(1);
        sv.apply_x(0);
        assert_probs(&sv, &[0.0, 1.0]);
    }

    #[test]
    fn test_h_gate() {
        let mut sv = Statevector::new(1);
        sv.apply_h(0);
        assert_probs(&sv, &[0.5, 0.5]);
    }

    #[test]
    fn test_rx_pi_flips() {
        let mut sv = Statevector::new(1);
        sv.apply_rx(0, PI);
        assert_probs(&sv, &[0.0, 1.0]);
    }

    #[test]
    fn test_native_hadamard_sequence() {
        // RZ(π/2) RX(π/2) RZ(π/2) equals H up to a global phase.
        let mut sv = Statevector::new(1);
        sv.apply_rz(0, FRAC_PI_2);
        sv.apply_rx(0, FRAC_PI_2);
        sv.apply_rz(0, FRAC_PI_2);
        assert_probs(&sv, &[0.5, 0.5]);
        sv.apply_h(0);
        assert_probs(&sv, &[1.0, 0.0]);
    }

    #[test]
    fn test_rzz_matches_cphase_decomposition() {
        let theta = 0.7;
        let mut a = Statevector::new(2);
        let mut b = Statevector::new(2);
        for sv in [&mut a, &mut b] {
            sv.apply_h(0);
            sv.apply_h(1);
        }
        a.apply_rzz(0, 1, theta);
        b.apply_rz(0, theta);
        b.apply_rz(1, theta);
        b.apply_cphase(0, 1, -2.0 * theta);

        // Equal up to global phase: compare after the same basis change.
        for sv in [&mut a, &mut b] {
            sv.apply_h(0);
            sv.apply_h(1);
        }
        let (pa, pb) = (a.probabilities(), b.probabilities());
        for (x, y) in pa.iter().zip(&pb) {
            assert!((x - y).abs() < 1e-10);
        }
    }

    #[test]
    fn test_bell_sampling() {
        let mut sv = Statevector::new(2);
        sv.apply_h(0);
        sv.apply_h(1);
        sv.apply_cz(0, 1);
        sv.apply_h(1);

        let sampler = Sampler::new(&sv);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let outcome = sampler.sample(&mut rng);
            assert!(outcome == 0b00 || outcome == 0b11, "got {outcome:02b}");
        }
    }

    #[test]
    fn test_reset_all() {
        let mut sv = Statevector::new(2);
        sv.apply_x(1);
        sv.reset_all();
        assert_probs(&sv, &[1.0, 0.0, 0.0, 0.0]);
    }
}
