//! Signal-unit framing and CRC validation (§4.G).
use crate::crc;

/// Fixed size of a signal unit, in bytes (§3).
pub const SIGNAL_UNIT_SIZE: usize = 12;

/// A validated 12-byte signal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalUnit(pub [u8; SIGNAL_UNIT_SIZE]);

impl SignalUnit {
    /// The message-ID tag, byte 0.
    pub fn tag(&self) -> u8 {
        self.0[0]
    }
}

/// Split `buf` into `SIGNAL_UNIT_SIZE`-byte quanta, validating each one's
/// CRC. Units that fail CRC are silently dropped (§4.G, §7); any trailing
/// partial unit (fewer than 12 bytes) is also dropped.
pub fn frame_signal_units(buf: &[u8]) -> Vec<SignalUnit> {
    buf.chunks_exact(SIGNAL_UNIT_SIZE)
        .filter_map(|chunk| {
            let arr: [u8; SIGNAL_UNIT_SIZE] = chunk.try_into().expect("chunks_exact yields SIGNAL_UNIT_SIZE slices");
            if crc::check_crc(&arr) { Some(SignalUnit(arr)) } else { None }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_bad_crc_and_keeps_good() {
        let good = crc::with_crc(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let mut bad = good;
        bad[0] ^= 0xff;
        let mut buf = Vec::new();
        buf.extend_from_slice(&bad);
        buf.extend_from_slice(&good);
        let units = frame_signal_units(&buf);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].0, good);
    }

    #[test]
    fn invariant_1_every_emitted_unit_has_valid_crc() {
        let a = crc::with_crc(&[0; 10]);
        let b = crc::with_crc(&[0xff; 10]);
        let mut buf = Vec::new();
        buf.extend_from_slice(&a);
        buf.extend_from_slice(&b);
        for u in frame_signal_units(&buf) {
            assert!(crc::check_crc(&u.0));
        }
    }
}
