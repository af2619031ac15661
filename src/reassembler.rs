//! User-data reassembler (§4.I): joins an ISU with its trailing SSU
//! fragments terminated by sequence 0.
use crate::signal_unit::SignalUnit;

/// Number of payload bytes carried by the ISU's body (byte 0 is the tag,
/// byte 1 is the declared total-length field, the trailing 2 bytes are the
/// CRC — §3).
const ISU_PAYLOAD: std::ops::Range<usize> = 2..10;
/// Number of payload bytes carried by each SSU (byte 0 is the tag, the
/// trailing 2 bytes are the CRC).
const SSU_PAYLOAD: std::ops::Range<usize> = 1..10;

/// An in-progress (or just-closed) user-data transaction (§3).
#[derive(Debug, Clone)]
pub struct Transaction {
    isu: SignalUnit,
    declared_len: usize,
    ssus: Vec<SignalUnit>,
}

impl Transaction {
    /// Start a new transaction from an ISU (§4.H: "clearing any prior").
    pub fn new(isu: SignalUnit) -> Self {
        let declared_len = isu.0[1] as usize;
        Self {
            isu,
            declared_len,
            ssus: Vec::new(),
        }
    }

    /// The opening ISU.
    pub fn isu(&self) -> &SignalUnit {
        &self.isu
    }

    /// Append an SSU fragment in arrival order.
    pub fn push_ssu(&mut self, ssu: SignalUnit) {
        self.ssus.push(ssu);
    }

    /// Reconstruct the user-data payload: ISU body, then SSUs in arrival
    /// order (not by sequence number — §5), trimmed to the ISU's declared
    /// byte length.
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.isu.0[ISU_PAYLOAD]);
        for ssu in &self.ssus {
            buf.extend_from_slice(&ssu.0[SSU_PAYLOAD.clone()]);
        }
        buf.truncate(self.declared_len.min(buf.len()));
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;

    fn isu(declared_len: u8, body: [u8; 8]) -> SignalUnit {
        let mut payload = [0u8; 10];
        payload[0] = crate::tags::TAG_ISU;
        payload[1] = declared_len;
        payload[2..10].copy_from_slice(&body);
        SignalUnit(crc::with_crc(&payload))
    }

    fn ssu(seq: u8, body: [u8; 9]) -> SignalUnit {
        let mut payload = [0u8; 10];
        payload[0] = 0xC0 | seq;
        payload[1..10].copy_from_slice(&body);
        SignalUnit(crc::with_crc(&payload))
    }

    #[test]
    fn concatenates_in_arrival_order_and_trims() {
        let mut txn = Transaction::new(isu(10, [1, 2, 3, 4, 5, 6, 7, 8]));
        txn.push_ssu(ssu(0, [9, 10, 0, 0, 0, 0, 0, 0, 0]));
        let payload = txn.payload();
        assert_eq!(payload.len(), 10);
        assert_eq!(payload, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn b3_terminator_ssu_payload_is_included() {
        let mut txn = Transaction::new(isu(26, [0; 8]));
        txn.push_ssu(ssu(1, [1; 9]));
        txn.push_ssu(ssu(0, [2; 9]));
        let payload = txn.payload();
        assert_eq!(payload.len(), 26);
        assert_eq!(&payload[17..26], &[2; 9]);
    }
}
