//! Sync correlator (§4.A).
//!
//! Grounded in this framework's access-code correlator block (a sliding
//! Hamming-distance match against a fixed bit pattern), generalized to
//! search the four quadrant phase rotations and, for offset modulation,
//! the Q-arm swap ambiguity, and to report the winning offset rather than
//! a single yes/no bit.
use crate::derotator::{Phase, rotate_quadrant, shift_q_arm};

/// Result of a correlation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelatorResult {
    /// Best-matching offset within the searched window.
    pub offset: usize,
    /// Winning phase hypothesis.
    pub phase: Phase,
    /// Winning Q-swap hypothesis.
    pub swap: bool,
    /// Peak absolute correlation score (higher is better).
    pub score: i32,
}

/// Slides a known bit pattern against soft symbols to find frame sync.
pub struct SyncCorrelator {
    /// Expected pattern, as ±1 hard values.
    pattern: Vec<i8>,
    oqpsk: bool,
}

impl SyncCorrelator {
    /// Create a correlator for the given bit pattern (MSB-first bits).
    pub fn new(pattern_bits: &[u8], oqpsk: bool) -> Self {
        let pattern = pattern_bits
            .iter()
            .map(|&b| if b != 0 { 1i8 } else { -1i8 })
            .collect();
        Self { pattern, oqpsk }
    }

    fn score_at(&self, window: &[i8]) -> i32 {
        window
            .iter()
            .zip(self.pattern.iter())
            .map(|(&s, &p)| i32::from(s.signum()) * i32::from(p))
            .sum()
    }

    /// Search `soft` for the best-matching offset, phase and Q-swap
    /// hypothesis. `soft` must be at least `pattern.len()` long.
    pub fn correlate(&self, soft: &[i8]) -> CorrelatorResult {
        let plen = self.pattern.len();
        let mut best = CorrelatorResult {
            offset: 0,
            phase: Phase::P0,
            swap: false,
            score: i32::MIN,
        };
        if soft.len() < plen {
            return best;
        }
        let swap_hyps: &[bool] = if self.oqpsk { &[false, true] } else { &[false] };
        for offset in 0..=(soft.len() - plen) {
            let window = &soft[offset..offset + plen];
            for &swap in swap_hyps {
                let candidate = if swap { shift_q_arm(window) } else { window.to_vec() };
                for phase in Phase::ALL {
                    let rotated = rotate_quadrant(&candidate, phase);
                    let score = self.score_at(&rotated);
                    if score > best.score {
                        best = CorrelatorResult {
                            offset,
                            phase,
                            swap,
                            score,
                        };
                    }
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soft_from_bits(bits: &[u8]) -> Vec<i8> {
        bits.iter().map(|&b| if b != 0 { 100 } else { -100 }).collect()
    }

    #[test]
    fn finds_exact_match_at_offset_zero() {
        let bits = [1u8, 1, 1, 0, 0, 0, 1, 0, 1, 1, 0, 1];
        let corr = SyncCorrelator::new(&bits, false);
        let soft = soft_from_bits(&bits);
        let res = corr.correlate(&soft);
        assert_eq!(res.offset, 0);
        assert_eq!(res.phase, Phase::P0);
        assert_eq!(res.score, bits.len() as i32);
    }

    #[test]
    fn finds_match_after_padding() {
        let bits = [1u8, 0, 1, 1, 0, 0, 1, 1];
        let corr = SyncCorrelator::new(&bits, false);
        let mut soft = vec![-50i8, 50, -50];
        soft.extend(soft_from_bits(&bits));
        let res = corr.correlate(&soft);
        assert_eq!(res.offset, 3);
        assert_eq!(res.score, bits.len() as i32);
    }

    #[test]
    fn finds_inverted_pattern_via_phase() {
        let bits = [1u8, 1, 0, 0, 1, 0, 1, 1];
        let corr = SyncCorrelator::new(&bits, false);
        let soft: Vec<i8> = soft_from_bits(&bits).iter().map(|v| -v).collect();
        let res = corr.correlate(&soft);
        assert_eq!(res.phase, Phase::P2);
        assert_eq!(res.score, bits.len() as i32);
    }
}
