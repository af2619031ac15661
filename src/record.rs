//! Emitted record model (§3, §9): a tagged variant serialized to a
//! free-form document only at the sink boundary, per the "polymorphic
//! tagged records" redesign note.
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;

use crate::signal_unit::SignalUnit;

/// Current time as seconds since the Unix epoch, for the `timestamp`
/// field every emitted record carries.
pub fn now_ts() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

/// A record produced by the packet classifier / reassembler (§4.H, §4.I).
#[derive(Debug, Clone, PartialEq)]
pub enum EmittedRecord {
    /// A fully reassembled and parsed ACARS message.
    Acars {
        /// Seconds since the epoch.
        timestamp: i64,
        /// Aircraft registration extracted by the ACARS sub-parser.
        plane_reg: String,
        /// Decoded free-text message body.
        message: String,
        /// The opening ISU of the transaction this was reassembled from.
        signal_unit: SignalUnit,
        /// Optional libacars-style enrichment subtree.
        libacars: Option<serde_json::Value>,
    },
    /// An AES System Table Broadcast (Index) signal unit.
    AesIndex {
        /// Seconds since the epoch.
        timestamp: i64,
    },
    /// Any other non-suppressed, named signal unit.
    Named {
        /// Seconds since the epoch.
        timestamp: i64,
        /// Name resolved via the tag dictionary.
        msg_name: String,
    },
}

impl EmittedRecord {
    /// Seconds-since-epoch timestamp every record carries (invariant 2,
    /// §8).
    pub fn timestamp(&self) -> i64 {
        match self {
            EmittedRecord::Acars { timestamp, .. } => *timestamp,
            EmittedRecord::AesIndex { timestamp } => *timestamp,
            EmittedRecord::Named { timestamp, .. } => *timestamp,
        }
    }

    /// The `msg_name` this record will serialize under, if any (invariant
    /// 2, §8: the AES index path is the one allowed to omit it from the
    /// *source* fields, though it is still stamped in at serialization).
    pub fn msg_name(&self) -> &str {
        match self {
            EmittedRecord::Acars { .. } => "ACARS",
            EmittedRecord::AesIndex { .. } => "AES System Table Broadcast (Index)",
            EmittedRecord::Named { msg_name, .. } => msg_name,
        }
    }

    /// True if this record's name is in the suppression list (§4.H): it
    /// should still be sent to UDP sinks, but not logged persistently or
    /// written to a file.
    pub fn is_suppressed(&self) -> bool {
        crate::tags::is_suppressed(self.msg_name())
    }

    /// Render to a free-form JSON document, stamping `source.station_id`
    /// when provided (§6 parser configuration).
    pub fn to_json(&self, station_id: Option<&str>) -> serde_json::Value {
        let mut v = match self {
            EmittedRecord::Acars {
                timestamp,
                plane_reg,
                message,
                signal_unit,
                libacars,
            } => {
                let mut v = json!({
                    "timestamp": timestamp,
                    "msg_name": "ACARS",
                    "plane_reg": plane_reg,
                    "message": message,
                    "signal_unit": signal_unit.0,
                });
                if let Some(enrichment) = libacars {
                    v["libacars"] = enrichment.clone();
                }
                v
            }
            EmittedRecord::AesIndex { timestamp } => json!({
                "timestamp": timestamp,
                "msg_name": "AES System Table Broadcast (Index)",
            }),
            EmittedRecord::Named { timestamp, msg_name } => json!({
                "timestamp": timestamp,
                "msg_name": msg_name,
            }),
        };
        if let Some(station_id) = station_id {
            v["source"] = json!({
                "station_id": station_id,
                "app": {"name": "aero-core", "version": env!("CARGO_PKG_VERSION")},
            });
        }
        v
    }
}
