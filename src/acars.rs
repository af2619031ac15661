//! ACARS sub-parser (§4.J).
//!
//! Per §1 the full ACARS semantic layer (libacars, FANS-CPDLC ASN.1
//! tables) is an external collaborator; this module ships the narrow
//! ARINC 618 downlink-block framing this core needs to satisfy §8/S2
//! (SOH/mode/registration/label/STX/ETX), behind a trait so a fuller
//! implementation can be swapped in without touching the reassembler
//! (§9's "external-library dispatch" redesign note).

/// Control characters framing an ARINC 618 downlink block.
const SOH: u8 = 0x01;
const STX: u8 = 0x02;
const ETX: u8 = 0x03;
const ETB: u8 = 0x17;

/// Minimum header length before the text field: SOH + mode + 7-byte
/// registration + ack + 2-byte label + block id.
const HEADER_LEN: usize = 1 + 1 + 7 + 1 + 2 + 1;

/// A decoded ACARS message (§4.J).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcarsMessage {
    /// Aircraft registration (the 7-byte address field, leading padding
    /// dots stripped).
    pub plane_reg: String,
    /// Free-text message body between STX and ETX/ETB.
    pub message: String,
}

/// Direction of an ACARS message, used to select libacars enrichment
/// rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ground-to-air (downlink delivery direction for this parser).
    GroundToAir,
    /// Air-to-ground.
    AirToGround,
}

/// Narrow capability interface the reassembler (§4.I) depends on, so the
/// ACARS layer can be swapped (e.g. for a full libacars binding) without
/// touching the rest of the pipeline.
pub trait AcarsParser {
    /// True if `payload` looks like an ACARS downlink block.
    fn is_acars_data(&self, payload: &[u8]) -> bool;
    /// Parse `payload`, returning `None` if it does not decode.
    fn parse(&self, payload: &[u8]) -> Option<AcarsMessage>;
    /// Optional enrichment subtree (e.g. FANS-CPDLC decode); an empty
    /// object means no enrichment was produced.
    fn parse_libacars(&self, msg: &AcarsMessage, direction: Direction) -> serde_json::Value;
}

/// ARINC 618-framing-based implementation of [`AcarsParser`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Arinc618Parser;

impl AcarsParser for Arinc618Parser {
    fn is_acars_data(&self, payload: &[u8]) -> bool {
        payload.first() == Some(&SOH) && payload.len() > HEADER_LEN
    }

    fn parse(&self, payload: &[u8]) -> Option<AcarsMessage> {
        if !self.is_acars_data(payload) {
            return None;
        }
        let reg_field = &payload[2..9];
        let plane_reg = String::from_utf8_lossy(reg_field).trim_start_matches('.').trim().to_string();

        let rest = &payload[HEADER_LEN..];
        let stx_pos = rest.iter().position(|&b| b == STX)?;
        let text = &rest[stx_pos + 1..];
        let end = text.iter().position(|&b| b == ETX || b == ETB).unwrap_or(text.len());
        let message = String::from_utf8_lossy(&text[..end]).to_string();

        Some(AcarsMessage { plane_reg, message })
    }

    fn parse_libacars(&self, _msg: &AcarsMessage, _direction: Direction) -> serde_json::Value {
        // The FANS-CPDLC ASN.1 descriptor tables are an opaque external
        // dictionary (§1): without them there is nothing to enrich with.
        serde_json::Value::Object(Default::default())
    }
}

/// Build a raw ARINC 618 downlink block for test fixtures.
pub fn build_frame(plane_reg: &str, label: &str, block_id: u8, message: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.push(SOH);
    buf.push(b'2'); // mode
    let mut reg = format!("{plane_reg:.>7}");
    reg.truncate(7);
    buf.extend_from_slice(reg.as_bytes());
    buf.push(b'Q'); // ack/nak placeholder
    let mut lbl = label.as_bytes().to_vec();
    lbl.resize(2, b' ');
    buf.extend_from_slice(&lbl[..2]);
    buf.push(block_id);
    buf.push(STX);
    buf.extend_from_slice(message.as_bytes());
    buf.push(ETX);
    buf
}
