//! CRC-16/CCITT (RFC1662-style), used to validate signal units (§4.G).
use std::sync::OnceLock;

fn fcs_table() -> &'static [u16; 256] {
    static TABLE: OnceLock<[u16; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u16; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let mut fcs = i as u16;
            for _ in 0..8 {
                fcs = if fcs & 1 != 0 {
                    (fcs >> 1) ^ 0x8408
                } else {
                    fcs >> 1
                };
            }
            *slot = fcs;
        }
        table
    })
}

/// Calculate the running CRC-16 over `data`.
pub fn calc_crc(data: &[u8]) -> u16 {
    let table = fcs_table();
    data.iter().fold(0xffffu16, |fcs, byte| {
        let ofs = ((fcs ^ *byte as u16) & 0xff) as usize;
        (fcs >> 8) ^ table[ofs]
    }) ^ 0xffff
}

/// Validate a 12-byte signal unit: the first 10 bytes cover the payload,
/// the trailing 2 bytes (big-endian) carry the expected CRC.
pub fn check_crc(buf: &[u8; 12]) -> bool {
    let want = u16::from_be_bytes([buf[10], buf[11]]);
    calc_crc(&buf[..10]) == want
}

/// Append a valid trailing CRC to a 10-byte payload, producing a 12-byte
/// signal unit. Used by tests to build round-trip fixtures.
pub fn with_crc(payload: &[u8; 10]) -> [u8; 12] {
    let crc = calc_crc(payload);
    let mut out = [0u8; 12];
    out[..10].copy_from_slice(payload);
    out[10..].copy_from_slice(&crc.to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_crc_is_zero() {
        assert_eq!(calc_crc(&[]), 0);
    }

    #[test]
    fn round_trip_passes() {
        let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let unit = with_crc(&payload);
        assert!(check_crc(&unit));
    }

    #[test]
    fn corrupted_unit_fails() {
        let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let mut unit = with_crc(&payload);
        unit[0] ^= 0xff;
        assert!(!check_crc(&unit));
    }
}
