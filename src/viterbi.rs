//! Viterbi decoder (§4.E): rate-½, constraint length 7, soft-decision.
//!
//! Grounded in the framework's other trellis-shaped decoders in spirit
//! (narrow, self-contained, table-driven) even though nothing in the base
//! framework does convolutional decoding itself; this is the one component
//! built from the domain literature rather than adapted from an existing
//! module, per §9's "external-library dispatch" redesign note: it is
//! exposed as a narrow capability (`work`/`ber`) so it could be swapped for
//! a SIMD or FPGA-backed implementation without touching the pipeline.

/// Constraint length (`K`), per §6.
pub const CONSTRAINT_LEN: u32 = 7;
/// Number of shift-register states (`2^(K-1)`).
pub const NSTATES: usize = 1 << (CONSTRAINT_LEN - 1);
/// Generator polynomials `{0o155, 0o117}` = `{109, 79}` decimal, per §6.
pub const GENERATORS: [u32; 2] = [0o155, 0o117];

fn branch_output(reg: u32, gen: u32) -> u8 {
    (reg & gen).count_ones() as u8 & 1
}

/// Ideal bit-to-soft-symbol mapping shared with the correlator and
/// derotator: bit `1` maps to `+1`, bit `0` to `-1`.
fn ideal(bit: u8) -> i32 {
    if bit != 0 { 1 } else { -1 }
}

/// Rate-½, K=7 convolutional encoder, register starting at all-zero state.
/// Used to build round-trip test fixtures and to compute the post-decode
/// BER estimate by re-encoding the decoded bits.
pub fn encode(bits: &[u8]) -> Vec<i8> {
    let mut state: u32 = 0;
    let mut out = Vec::with_capacity(bits.len() * 2);
    for &bit in bits {
        let reg = ((state << 1) | u32::from(bit & 1)) & 0x7f;
        out.push(ideal(branch_output(reg, GENERATORS[0])) as i8);
        out.push(ideal(branch_output(reg, GENERATORS[1])) as i8);
        state = (state << 1 | u32::from(bit & 1)) & (NSTATES as u32 - 1);
    }
    out
}

/// A rate-½ K=7 Viterbi decoder.
///
/// Stateless across calls: each `work()` decodes one self-contained block
/// (one Aero frame's info region), matching the framework's per-frame
/// buffer-reuse model (§5) rather than a continuously-running trellis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viterbi {
    last_ber: f64,
}

impl Viterbi {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self { last_ber: 0.0 }
    }

    /// Decode `n_bits` info bits from `soft_in` (which must hold at least
    /// `2 * n_bits` soft symbols). Returns the decoded bits packed
    /// MSB-first into `ceil(n_bits / 8)` bytes.
    ///
    /// When `terminated` is true, the encoder is assumed to have been
    /// zero-flushed (the C-channel path) and traceback starts from state
    /// 0; otherwise the best final-metric state is used.
    pub fn work(&mut self, soft_in: &[i8], n_bits: usize, terminated: bool) -> Vec<u8> {
        assert!(soft_in.len() >= n_bits * 2, "not enough soft symbols for {n_bits} info bits");

        let mut metric = [i64::MIN / 2; NSTATES];
        metric[0] = 0;
        let mut decisions: Vec<[u8; NSTATES]> = Vec::with_capacity(n_bits);

        for step in 0..n_bits {
            let s0 = i32::from(soft_in[step * 2]);
            let s1 = i32::from(soft_in[step * 2 + 1]);
            let mut next = [i64::MIN / 2; NSTATES];
            let mut step_decisions = [0u8; NSTATES];
            for ns in 0..NSTATES {
                let bit = (ns & 1) as u32;
                let mut best = i64::MIN;
                let mut best_prev = 0u8;
                for &prev in &[ns >> 1, (ns >> 1) | (NSTATES >> 1)] {
                    if metric[prev] <= i64::MIN / 4 {
                        continue;
                    }
                    let reg = ((prev as u32) << 1 | bit) & 0x7f;
                    let o0 = branch_output(reg, GENERATORS[0]);
                    let o1 = branch_output(reg, GENERATORS[1]);
                    let bm = i64::from(s0 * ideal(o0) + s1 * ideal(o1));
                    let cand = metric[prev] + bm;
                    if cand > best {
                        best = cand;
                        best_prev = prev as u8;
                    }
                }
                next[ns] = best;
                step_decisions[ns] = best_prev;
            }
            metric = next;
            decisions.push(step_decisions);
        }

        let mut state = if terminated {
            0usize
        } else {
            (0..NSTATES).max_by_key(|&s| metric[s]).unwrap_or(0)
        };

        let mut bits = vec![0u8; n_bits];
        for step in (0..n_bits).rev() {
            bits[step] = (state & 1) as u8;
            state = decisions[step][state] as usize;
        }

        let reencoded = encode(&bits);
        let mut mismatches = 0usize;
        for (a, b) in reencoded.iter().zip(soft_in.iter()) {
            if a.signum() != b.signum() {
                mismatches += 1;
            }
        }
        self.last_ber = mismatches as f64 / reencoded.len().max(1) as f64;

        pack_bits(&bits)
    }

    /// Post-decode bit-error-rate estimate from the most recent `work()`
    /// call, computed by re-encoding the decoded bits and comparing the
    /// result's signs against the original soft input (§4.E).
    pub fn ber(&self) -> f64 {
        self.last_ber
    }
}

fn pack_bits(bits: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit != 0 {
            out[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unpack_bits(bytes: &[u8], n_bits: usize) -> Vec<u8> {
        (0..n_bits).map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1).collect()
    }

    #[test]
    fn r1_decodes_noiseless_encoded_stream() {
        let bits: Vec<u8> = (0..64).map(|i| (i * 7 % 3 == 0) as u8).collect();
        let soft = encode(&bits);
        let mut vit = Viterbi::new();
        let decoded = vit.work(&soft, bits.len(), false);
        assert_eq!(unpack_bits(&decoded, bits.len()), bits);
        assert_eq!(vit.ber(), 0.0);
    }

    #[test]
    fn terminated_decode_matches_when_flushed_to_zero() {
        let mut bits: Vec<u8> = vec![1, 0, 1, 1, 0, 0, 1, 0, 1, 1];
        bits.extend(std::iter::repeat_n(0u8, 6));
        let soft = encode(&bits);
        let mut vit = Viterbi::new();
        let decoded = vit.work(&soft, bits.len(), true);
        assert_eq!(unpack_bits(&decoded, bits.len()), bits);
    }

    #[test]
    fn ber_rises_with_flipped_symbols() {
        let bits: Vec<u8> = vec![1, 0, 0, 1, 1, 1, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1];
        let mut soft = encode(&bits);
        let mut vit = Viterbi::new();
        let clean_ber = {
            vit.work(&soft, bits.len(), false);
            vit.ber()
        };
        for s in soft.iter_mut().take(6) {
            *s = -*s;
        }
        vit.work(&soft, bits.len(), false);
        assert!(vit.ber() >= clean_ber);
    }
}
