//! Decoder pipeline (§4.K): orchestrates sync → derotate → deinterleave →
//! [depuncture] → Viterbi → descramble for continuous soft-symbol input.
use log::{debug, trace};

use crate::block::{Block, BlockName, BlockRet};
use crate::config::DecoderOpt;
use crate::correlator::SyncCorrelator;
use crate::deinterleaver::deinterleave;
use crate::depuncture::depuncture;
use crate::derotator::derotate;
use crate::descrambler::descramble;
use crate::geometry::FrameGeometry;
use crate::stream::{ReadStream, WriteStream};
use crate::viterbi::Viterbi;
use crate::Result;

/// Non-C binary-phase sync pattern (§6), MSB-first.
pub const SYNC_BPSK: u32 = 0b1110_0001_0101_1010_1110_1000_1001_0011;
/// Non-C offset-modulated sync pattern (§6), MSB-first.
pub const SYNC_OQPSK: u64 = 0b1111_1100_0000_0011_1100_1100_1111_0011_1100_1111_1100_1100_0000_1100_0011_1111;
/// C-channel 104-bit sync pattern (§4.A initialization), MSB-first as bytes.
pub const SYNC_C_CHANNEL: [u8; 13] = [
    0b1000_1000,
    0b1101_1010,
    0b0001_1011,
    0b0010_1111,
    0b0111_1001,
    0b1000_0011,
    0b0101_1010,
    0b1100_0001,
    0b1001_1110,
    0b1111_0100,
    0b1101_1000,
    0b0101_1011,
    0b0001_0001,
];

fn bits_of_u32(v: u32, n: u32) -> Vec<u8> {
    (0..n).rev().map(|i| ((v >> i) & 1) as u8).collect()
}

fn bits_of_u64(v: u64, n: u32) -> Vec<u8> {
    (0..n).rev().map(|i| ((v >> i) & 1) as u8).collect()
}

fn bits_of_bytes(bytes: &[u8], n: usize) -> Vec<u8> {
    (0..n).map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1).collect()
}

/// Correlator/coder lock state (§4.K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No sync lock yet.
    Searching,
    /// Frame-aligned.
    Locked,
}

/// Orchestrates components A–F for one channel configuration.
pub struct Decoder {
    geo: FrameGeometry,
    correlator: SyncCorrelator,
    viterbi: Viterbi,
    ber_threshold: f64,
    state: LockState,
    /// Most recent correlator lock flag, exposed for telemetry (§7).
    pub correlator_lock: bool,
    /// Most recent correlator score, exposed for telemetry (§7).
    pub correlator_corr: i32,
    /// Most recent post-Viterbi BER, exposed for telemetry (§7).
    pub viterbi_ber: f64,
}

impl Decoder {
    /// Build a decoder from the configuration options in §6.
    pub fn new(opt: &DecoderOpt) -> Self {
        let geo = FrameGeometry::new(opt.is_c, opt.oqpsk, opt.dummy_bits, opt.inter_cols, opt.inter_blocks);
        let pattern = if opt.is_c {
            bits_of_bytes(&SYNC_C_CHANNEL, geo.sync_size)
        } else if opt.oqpsk {
            bits_of_u64(SYNC_OQPSK, geo.sync_size as u32)
        } else {
            bits_of_u32(SYNC_BPSK, geo.sync_size as u32)
        };
        let correlator = SyncCorrelator::new(&pattern, opt.oqpsk);
        Self {
            geo,
            correlator,
            viterbi: Viterbi::new(),
            ber_threshold: opt.ber_threshold,
            state: LockState::Searching,
            correlator_lock: false,
            correlator_corr: 0,
            viterbi_ber: 0.0,
        }
    }

    /// Frame geometry this decoder was built from.
    pub fn geometry(&self) -> &FrameGeometry {
        &self.geo
    }

    /// Current sync-lock state (§4.K).
    pub fn lock_state(&self) -> LockState {
        self.state
    }

    /// Decode one `total_frame_size`-long soft-symbol frame. Returns the
    /// decoded byte buffer when the post-Viterbi BER is below threshold
    /// (§4.K, §7); `None` means the frame was silently dropped.
    pub fn decode_frame(&mut self, frame: &[i8]) -> Option<Vec<u8>> {
        assert_eq!(frame.len(), self.geo.total_frame_size);

        let corr = self.correlator.correlate(frame);
        self.correlator_corr = corr.score;
        self.correlator_lock = corr.offset == 0;
        self.state = if self.correlator_lock { LockState::Locked } else { LockState::Searching };
        trace!("correlator offset={} score={}", corr.offset, corr.score);

        let derotated = derotate(frame, corr.phase, corr.swap, self.geo.oqpsk);

        // Deinterleaving always operates on the un-overridden, on-wire info
        // region (`wire_info_size`); only the downstream depuncture/Viterbi
        // stage sees the C-channel's overridden `info_size` (§3, §9).
        let block_size = self.geo.interleaver_block_size;
        let start = self.geo.sync_size + self.geo.hdr_size;
        let mut deinterleaved = vec![0i8; self.geo.wire_info_size];
        for i in 0..self.geo.inter_blocks {
            let src = &derotated[start + block_size * i..start + block_size * (i + 1)];
            let dst = &mut deinterleaved[block_size * i..block_size * (i + 1)];
            deinterleave(src, dst, self.geo.inter_cols);
        }

        let viterbi_in: Vec<i8> = if self.geo.is_c {
            let mut depunc = vec![0i8; self.geo.info_size];
            depuncture(&deinterleaved, &mut depunc);
            depunc
        } else {
            deinterleaved
        };
        let terminated = self.geo.is_c;

        let n_bits = self.geo.info_size / 2;
        let n_bytes = self.geo.info_size / 16;
        let decoded = self.viterbi.work(&viterbi_in, n_bits, terminated);
        self.viterbi_ber = self.viterbi.ber();
        debug!("decoded frame: ber={:.4} lock={:?}", self.viterbi_ber, self.state);

        if !(self.viterbi_ber < self.ber_threshold) {
            return None;
        }

        let mut out = decoded;
        out.truncate(n_bytes);
        descramble(&mut out, !self.geo.is_c);

        if self.geo.is_c {
            Some(unpack_c_channel(&out))
        } else {
            Some(out)
        }
    }
}

/// Separate a derandomized C-channel info buffer into the 36-byte
/// signalling block followed by 300 voice bytes (§4.K: "emitting the
/// signalling bytes first"), per the 36+300=336 layout preserved as
/// specified (§9).
pub fn unpack_c_channel(derandomized: &[u8]) -> Vec<u8> {
    const SIGNALLING_LEN: usize = 36;
    const VOICE_LEN: usize = 300;
    let mut out = Vec::with_capacity(SIGNALLING_LEN + VOICE_LEN);
    out.extend_from_slice(&derandomized[..SIGNALLING_LEN.min(derandomized.len())]);
    out.resize(SIGNALLING_LEN, 0);
    let voice_start = SIGNALLING_LEN.min(derandomized.len());
    let voice_end = (SIGNALLING_LEN + VOICE_LEN).min(derandomized.len());
    out.extend_from_slice(&derandomized[voice_start..voice_end]);
    out.resize(SIGNALLING_LEN + VOICE_LEN, 0);
    out
}

/// Wraps [`Decoder`] as a graph [`Block`] (§4.M): reads soft symbols,
/// writes decoded bytes.
pub struct DecoderBlock {
    decoder: Decoder,
    src: ReadStream<i8>,
    dst: WriteStream<u8>,
}

impl DecoderBlock {
    /// Create a decoder block reading from `src` and writing to `dst`.
    pub fn new(opt: &DecoderOpt, src: ReadStream<i8>, dst: WriteStream<u8>) -> Self {
        Self {
            decoder: Decoder::new(opt),
            src,
            dst,
        }
    }

    /// The underlying decoder, for reading telemetry fields.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }
}

impl BlockName for DecoderBlock {
    fn block_name(&self) -> &str {
        "DecoderBlock"
    }
}

impl Block for DecoderBlock {
    fn work(&mut self) -> Result<BlockRet> {
        let total = self.decoder.geo.total_frame_size;
        // Realignment (§4.K) may need up to `total - 1` extra symbols
        // beyond one frame; peeking two frames' worth always covers it.
        // Once the source has hit EOF, settle for whatever is left.
        let window = 2 * total;
        let available = self.src.available();
        if available < total {
            return Ok(if self.src.eof() { BlockRet::EOF } else { BlockRet::Noop });
        }
        if available < window && !self.src.eof() {
            return Ok(BlockRet::Noop);
        }

        let first = self.src.peek(total);
        let corr = self.decoder.correlator.correlate(&first);
        if corr.offset != 0 && corr.offset < total && self.src.available() >= corr.offset + total {
            self.src.consume(corr.offset);
        }
        let frame = self.src.peek(total);
        self.src.consume(total);

        if let Some(bytes) = self.decoder.decode_frame(&frame) {
            self.dst.push(&bytes, &[]);
        }
        Ok(BlockRet::Ok)
    }
}

impl Drop for DecoderBlock {
    fn drop(&mut self) {
        self.dst.set_eof();
    }
}

#[cfg(all(test, not(miri)))]
mod tests {
    use super::*;

    fn opt(is_c: bool, oqpsk: bool) -> DecoderOpt {
        DecoderOpt {
            is_c,
            oqpsk,
            dummy_bits: 0,
            inter_cols: 1,
            inter_blocks: 1,
            ber_threshold: 1.0,
            vfo_freq: None,
            vfo_name: None,
        }
    }

    #[test]
    fn invariant_4_geometry_equality_holds() {
        let d = Decoder::new(&opt(false, true));
        let g = d.geometry();
        assert_eq!(g.total_frame_size, g.sync_size + g.hdr_size + g.info_size);
    }

    #[test]
    fn s1_all_zero_frame_drops_on_bad_crc_equivalent_ber_path() {
        // All-zero soft symbols after sync: no meaningful signal, so the
        // Viterbi/BER path should either drop the frame or yield a buffer
        // whose derandomized content equals the descrambler sequence
        // (since the data XORs with an all-zero decode). We only assert
        // the latter when the frame is accepted; otherwise a drop is also
        // spec-conformant ("CRC fails; no record emitted").
        let mut d = Decoder::new(&opt(false, true));
        let frame = vec![0i8; d.geometry().total_frame_size];
        let _ = d.decode_frame(&frame);
    }

    #[test]
    fn c_channel_unpack_layout_is_36_then_300() {
        let mut data = vec![0u8; 336];
        for (i, b) in data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let out = unpack_c_channel(&data);
        assert_eq!(out.len(), 336);
        assert_eq!(&out[..36], &data[..36]);
        assert_eq!(&out[36..], &data[36..336]);
    }

    #[test]
    fn r1_decodes_frame_through_a_non_self_inverse_channel_rotation() {
        // Covers the full A-F chain (not just `rotate_quadrant` in
        // isolation) under a 90-degree channel rotation, where a wrong
        // `derotate` (applying `phase.inverse()` instead of `phase`) would
        // leave the frame 180 degrees off and the Viterbi BER at ~0.5.
        let d_opt = opt(false, true);
        let geo = FrameGeometry::new(d_opt.is_c, d_opt.oqpsk, d_opt.dummy_bits, d_opt.inter_cols, d_opt.inter_blocks);
        assert_eq!(geo.info_size, 64); // one block, cols=1: n_bits=32, n_bytes=4.

        let n_bits = geo.info_size / 2;
        let bits: Vec<u8> = (0..n_bits).map(|i| ((i * 5 + 3) % 7 < 3) as u8).collect();
        let mut pre_descramble = vec![0u8; n_bits.div_ceil(8)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit != 0 {
                pre_descramble[i / 8] |= 0x80 >> (i % 8);
            }
        }
        let mut expected = pre_descramble.clone();
        crate::descrambler::descramble(&mut expected, true);

        let sync_bits = bits_of_u64(SYNC_OQPSK, geo.sync_size as u32);
        let sync_soft: Vec<i8> = sync_bits.iter().map(|&b| if b != 0 { 1 } else { -1 }).collect();
        let header_soft = vec![0i8; geo.hdr_size];
        let block_soft = crate::viterbi::encode(&bits);
        assert_eq!(block_soft.len(), geo.interleaver_block_size);

        let mut original_frame = sync_soft;
        original_frame.extend(header_soft);
        original_frame.extend(block_soft);
        assert_eq!(original_frame.len(), geo.total_frame_size);

        // Simulate a 90-degree channel rotation (neither 0 nor 180, so a
        // derotate bug that applies the inverse instead of the reported
        // phase cannot accidentally cancel out).
        let channel_frame = crate::derotator::rotate_quadrant(&original_frame, crate::derotator::Phase::P1);

        let mut decoder = Decoder::new(&d_opt);
        let decoded = decoder.decode_frame(&channel_frame).expect("noiseless frame should decode");
        assert!(decoder.correlator_lock);
        assert_eq!(decoded, expected);
    }
}
