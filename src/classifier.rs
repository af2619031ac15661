//! Packet classifier (§4.H): dispatches a validated signal unit by its
//! first-byte tag, owning the single in-progress user-data transaction and
//! driving the reassembler (§4.I) to completion.
use log::{debug, warn};

use crate::acars::{AcarsParser, Arinc618Parser, Direction};
use crate::reassembler::Transaction;
use crate::record::{EmittedRecord, now_ts};
use crate::signal_unit::SignalUnit;
use crate::tags;

/// Owns the classifier's transaction state and ACARS sub-parser.
pub struct PacketClassifier {
    txn: Option<Transaction>,
    acars: Box<dyn AcarsParser>,
}

impl Default for PacketClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketClassifier {
    /// Create a classifier using the built-in ARINC 618 ACARS parser.
    pub fn new() -> Self {
        Self::with_acars_parser(Box::new(Arinc618Parser))
    }

    /// Create a classifier with a caller-supplied ACARS sub-parser (§9:
    /// narrow capability interfaces for testability).
    pub fn with_acars_parser(acars: Box<dyn AcarsParser>) -> Self {
        Self { txn: None, acars }
    }

    /// Classify one validated signal unit, returning an emitted record
    /// when one results (§4.H, §4.I).
    pub fn classify(&mut self, unit: SignalUnit) -> Option<EmittedRecord> {
        let tag = unit.tag();
        match tag {
            tags::TAG_ISU => {
                if self.txn.is_some() {
                    debug!("superseding in-progress user-data transaction on new ISU");
                }
                self.txn = Some(Transaction::new(unit));
                None
            }
            tags::TAG_RESERVED_26 => {
                debug!("dropping reserved 0x26 signal unit");
                None
            }
            t if tags::is_ssu(t) => self.handle_ssu(unit, tags::ssu_seq_no(t)),
            tags::TAG_AES_INDEX => Some(EmittedRecord::AesIndex { timestamp: now_ts() }),
            other => {
                let name = tags::tag_name(other);
                if tags::is_suppressed(&name) {
                    None
                } else {
                    Some(EmittedRecord::Named {
                        timestamp: now_ts(),
                        msg_name: name,
                    })
                }
            }
        }
    }

    fn handle_ssu(&mut self, unit: SignalUnit, seq_no: u8) -> Option<EmittedRecord> {
        let Some(txn) = self.txn.as_mut() else {
            warn!("orphan SSU (seq {seq_no}) with no active transaction, dropping");
            return None;
        };
        txn.push_ssu(unit);
        if seq_no != 0 {
            return None;
        }
        let finished = self.txn.take().expect("checked Some above");
        self.close_transaction(finished)
    }

    fn close_transaction(&self, txn: Transaction) -> Option<EmittedRecord> {
        let payload = txn.payload();
        if !self.acars.is_acars_data(&payload) {
            return None;
        }
        let msg = self.acars.parse(&payload)?;
        let libacars = self.acars.parse_libacars(&msg, Direction::GroundToAir);
        Some(EmittedRecord::Acars {
            timestamp: now_ts(),
            plane_reg: msg.plane_reg,
            message: msg.message,
            signal_unit: *txn.isu(),
            libacars: if libacars.as_object().is_some_and(|o| o.is_empty()) {
                None
            } else {
                Some(libacars)
            },
        })
    }
}
