//! Statevector simulation engine.
//!
//! Basis index bit `q` is the state of qubit `q`.

use num_complex::Complex64;
use rand::distributions::WeightedIndex;

use spinchain_ir::{Instruction, InstructionKind, StandardGate};

/// A pure state of `num_qubits` qubits.
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

    /// Apply an instruction. Measurements leave the state untouched; they are
    /// resolved by sampling once every gate has been applied.
    pub fn apply(&mut self, instruction: &Instruction) {
        let InstructionKind::Gate(gate) = &instruction.kind else {
            return;
        };
        let q: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
        match *gate {
            StandardGate::H => self.apply_h(q[0]),
            StandardGate::X => self.apply_x(q[0]),
            StandardGate::Rx(theta) => self.apply_rx(q[0], theta),
            StandardGate::Rz(theta) => self.apply_rz(q[0], theta),
            StandardGate::CX => self.apply_cx(q[0], q[1]),
            StandardGate::RZZ(theta) => self.apply_rzz(q[0], q[1], theta),
        }
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
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

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
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

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
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

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
    }

    /// exp(-i θ/2 Z⊗Z): phase e^{-iθ/2} on even parity, e^{+iθ/2} on odd.
    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: f64) {
        let even = Complex64::from_polar(1.0, -theta / 2.0);
        let odd = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            let parity = ((i >> q1) ^ (i >> q2)) & 1;
            *amp *= if parity == 0 { even } else { odd };
        }
    }

    // =========================================================================
    // Read-out
    // =========================================================================

    /// Probability of every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// A sampler over basis states, built once per job.
    pub fn sampler(&self) -> Option<WeightedIndex<f64>> {
        WeightedIndex::new(self.probabilities()).ok()
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }
}
