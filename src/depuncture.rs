//! Depuncturer (C-channel only, §4.D).
//!
//! The C-channel's rate-⅔ punctured code is restored to the rate-½ shape
//! the Viterbi decoder expects by reinserting a soft-zero erasure at every
//! position the transmit-side puncturing matrix `[1,1,0]` dropped.

/// One period of the puncturing matrix: `1` means the code bit was
/// transmitted, `0` means it was punctured at the transmitter (§6).
pub const PUNCTURE_PATTERN: [bool; 3] = [true, true, false];

/// Expand a punctured soft stream back to rate-½ by inserting a soft-zero
/// erasure at every punctured position.
///
/// `input` holds the transmitted (rate-⅔) soft symbols; `output` is filled
/// three-at-a-time per two input symbols, with the third slot zeroed. Any
/// trailing partial group in `output` that can't be filled from `input` is
/// left as the erasure value (`0`).
pub fn depuncture(input: &[i8], output: &mut [i8]) {
    output.fill(0);
    let mut ii = 0;
    let mut oi = 0;
    while oi + PUNCTURE_PATTERN.len() <= output.len() && ii + 2 <= input.len() {
        output[oi] = input[ii];
        output[oi + 1] = input[ii + 1];
        // output[oi + 2] stays 0: the punctured erasure.
        ii += 2;
        oi += PUNCTURE_PATTERN.len();
    }
}

/// The transmit-side puncturing this module inverts: drop the third of
/// every three rate-½ coded bits. Used only to build round-trip test
/// fixtures.
pub fn puncture(input: &[i8]) -> Vec<i8> {
    input
        .chunks(PUNCTURE_PATTERN.len())
        .flat_map(|chunk| chunk.iter().copied().zip(PUNCTURE_PATTERN).filter(|&(_, keep)| keep).map(|(v, _)| v))
        .collect()
}
