//! Frame geometry: the fixed sizes derived from channel configuration.
//!
//! Grounded in the original decoder's constructor, which computes these
//! same sizes once from `is_c`/`oqpsk`/`dummy_bits`/`inter_cols`/`inter_blocks`
//! before allocating any buffers.

/// Sizes derived from the channel configuration, fixed for the lifetime of
/// a decoder/parser pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Whether this is the C (voice+signalling) channel.
    pub is_c: bool,
    /// Offset-modulated (OQPSK) vs binary-phase (BPSK).
    pub oqpsk: bool,
    /// Post-sync padding bits.
    pub dummy_bits: usize,
    /// Interleaver column count.
    pub inter_cols: usize,
    /// Interleaver block count.
    pub inter_blocks: usize,

    /// Length of the sync word, in soft symbols.
    pub sync_size: usize,
    /// Length of the header region, in soft symbols.
    pub hdr_size: usize,
    /// Size of one interleaver block, in soft symbols.
    pub interleaver_block_size: usize,
    /// On-wire size of the info region actually read per frame and handed
    /// to the deinterleaver: `interleaver_block_size * interleaver_blocks`,
    /// never overridden. This is what `total_frame_size` is built from.
    pub wire_info_size: usize,
    /// Size of the info region as seen by the depuncturer/Viterbi/derand
    /// stages: equal to `wire_info_size`, except for the C-channel where
    /// it is overridden to the fixed post-depuncture value 5460 (§3).
    pub info_size: usize,
    /// Total frame length, in soft symbols.
    pub total_frame_size: usize,
}

/// Post-depuncture info size override for the C-channel (§3).
pub const C_CHANNEL_INFO_SIZE: usize = 5460;

impl FrameGeometry {
    /// Compute frame geometry from configuration, per §3.
    ///
    /// Mirrors the original decoder's constructor order exactly: the
    /// C-channel's `info_size` override to 5460 happens only after
    /// `total_frame_size` has already been computed from the generic,
    /// un-overridden interleaver size, so the two stay decoupled.
    pub fn new(
        is_c: bool,
        oqpsk: bool,
        dummy_bits: usize,
        inter_cols: usize,
        inter_blocks: usize,
    ) -> Self {
        let sync_size = if is_c {
            52 * 2
        } else if oqpsk {
            64
        } else {
            32
        };
        let hdr_size = if is_c { dummy_bits } else { 16 + dummy_bits };
        let interleaver_block_size = 64 * inter_cols;
        let wire_info_size = interleaver_block_size * inter_blocks;
        let total_frame_size = sync_size + hdr_size + wire_info_size;
        let info_size = if is_c { C_CHANNEL_INFO_SIZE } else { wire_info_size };
        Self {
            is_c,
            oqpsk,
            dummy_bits,
            inter_cols,
            inter_blocks,
            sync_size,
            hdr_size,
            interleaver_block_size,
            wire_info_size,
            info_size,
            total_frame_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_invariant_holds() {
        for is_c in [false, true] {
            for oqpsk in [false, true] {
                let geo = FrameGeometry::new(is_c, oqpsk, 0, 64, 9);
                assert_eq!(geo.total_frame_size, geo.sync_size + geo.hdr_size + geo.wire_info_size);
                if !is_c {
                    assert_eq!(geo.info_size, geo.wire_info_size);
                }
            }
        }
    }

    #[test]
    fn non_c_sizes() {
        let geo = FrameGeometry::new(false, true, 0, 64, 9);
        assert_eq!(geo.sync_size, 64);
        assert_eq!(geo.hdr_size, 16);
        assert_eq!(geo.interleaver_block_size, 64 * 64);
        assert_eq!(geo.info_size, 64 * 64 * 9);
    }

    #[test]
    fn non_c_bpsk_sizes() {
        let geo = FrameGeometry::new(false, false, 3, 1, 1);
        assert_eq!(geo.sync_size, 32);
        assert_eq!(geo.hdr_size, 19);
    }

    #[test]
    fn c_channel_sizes() {
        let geo = FrameGeometry::new(true, true, 5, 1, 1);
        assert_eq!(geo.sync_size, 104);
        assert_eq!(geo.hdr_size, 5);
        assert_eq!(geo.wire_info_size, 64);
        assert_eq!(geo.info_size, C_CHANNEL_INFO_SIZE);
        // total_frame_size is built from the pre-override wire size, not
        // the overridden Viterbi-facing info_size (§3, §9).
        assert_eq!(geo.total_frame_size, 104 + 5 + 64);
    }

    #[test]
    fn c_channel_info_size_override_decouples_from_wire_size() {
        // A realistic C-channel config: wire size 3640 (pre-depuncture),
        // expands 3:2 to the fixed post-depuncture 5460.
        let geo = FrameGeometry::new(true, true, 0, 65, 56);
        assert_eq!(geo.wire_info_size, 64 * 65 * 56);
        assert_eq!(geo.info_size, C_CHANNEL_INFO_SIZE);
    }
}
