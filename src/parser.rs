//! Parser pipeline (§4.L): drives the classifier over a continuous
//! signal-unit byte stream and publishes emitted records to sinks.
use log::{error, info};

use crate::block::{Block, BlockName, BlockRet};
use crate::classifier::PacketClassifier;
use crate::config::ParserOpt;
use crate::history::HistoryRing;
use crate::record::EmittedRecord;
use crate::signal_unit::{SIGNAL_UNIT_SIZE, frame_signal_units};
use crate::sinks::{JsonFileSink, UdpSink};
use crate::stream::{NCWriteStream, ReadStream};
use crate::Result;

/// Bytes a C-channel frame contributes: 3 signal units (36 bytes) plus 300
/// voice bytes handed to an external audio sink (§4.L, §4.K).
pub const C_FRAME_SIZE: usize = 336;
const C_SIGNALLING_LEN: usize = 36;
const C_VOICE_LEN: usize = 300;

/// Receives C-channel voice bytes extracted from each frame (§1: the AMBE
/// decoder and WAV/audio sink are external collaborators represented only
/// by this narrow trait, per §9's redesign note).
pub trait AudioSink {
    /// Accept one frame's worth of voice bytes (300 bytes per §4.L).
    fn write_voice(&mut self, voice: &[u8]);
}

/// An audio sink that discards its input, for configurations with no
/// audio output wired up.
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn write_voice(&mut self, _voice: &[u8]) {}
}

/// Orchestrates components G–J for continuous signal-unit (or C-channel
/// frame) input, publishing results to the configured sinks.
pub struct Parser {
    is_c: bool,
    classifier: PacketClassifier,
    udp: UdpSink,
    files: JsonFileSink,
    station_id: Option<String>,
    acars_history: HistoryRing<EmittedRecord>,
    other_history: HistoryRing<EmittedRecord>,
}

impl Parser {
    /// Build a parser from the configuration options in §6, writing files
    /// under `out_dir`.
    pub fn new(opt: &ParserOpt, out_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Ok(Self {
            is_c: opt.is_c,
            classifier: PacketClassifier::new(),
            udp: UdpSink::new(opt.udp_targets())?,
            files: JsonFileSink::new(out_dir, opt.save_files),
            station_id: opt.station_id.clone(),
            acars_history: HistoryRing::new(),
            other_history: HistoryRing::new(),
        })
    }

    /// Packet history shared with the GUI/telemetry observer (§4.N, §5).
    pub fn acars_history(&self) -> &HistoryRing<EmittedRecord> {
        &self.acars_history
    }

    /// Packet history shared with the GUI/telemetry observer (§4.N, §5).
    pub fn other_history(&self) -> &HistoryRing<EmittedRecord> {
        &self.other_history
    }

    /// Publish one emitted record to every configured sink and history
    /// ring (§4.N).
    pub fn publish(&self, record: &EmittedRecord) {
        self.udp.send(record, self.station_id.as_deref());
        if let Err(e) = self.files.write(record, self.station_id.as_deref()) {
            error!("file sink write failed: {e}");
        }
        let ring = if record.msg_name() == "ACARS" {
            &self.acars_history
        } else {
            &self.other_history
        };
        if let Err(e) = ring.push(record.clone()) {
            error!("history ring push failed: {e}");
        }
    }

    /// Classify one validated signal unit and publish any resulting record.
    pub fn process_unit(&mut self, unit: crate::signal_unit::SignalUnit) {
        if let Some(record) = self.classifier.classify(unit) {
            info!("emitted record: {}", record.msg_name());
            self.publish(&record);
        }
    }

    /// Process a non-C-channel buffer of signal-unit bytes (multiples of
    /// 12), classifying each validated unit (§4.G–§4.H).
    pub fn process_bytes(&mut self, buf: &[u8]) {
        for unit in frame_signal_units(buf) {
            self.process_unit(unit);
        }
    }

    /// Process one 336-byte C-channel frame: three signal units followed
    /// by 300 voice bytes forwarded to `audio` (§4.L, S5). Ordering matches
    /// the decoder's signalling-then-voice layout.
    pub fn process_c_frame(&mut self, frame: &[u8], audio: &mut dyn AudioSink) {
        assert_eq!(frame.len(), C_FRAME_SIZE);
        self.process_bytes(&frame[..C_SIGNALLING_LEN]);
        audio.write_voice(&frame[C_SIGNALLING_LEN..]);
    }
}

/// Wraps [`Parser`] as a graph [`Block`] (§4.M): reads decoded bytes,
/// writes [`EmittedRecord`]s downstream for any additional consumer.
pub struct ParserBlock {
    parser: Parser,
    src: ReadStream<u8>,
    records: NCWriteStream<EmittedRecord>,
    audio: Box<dyn AudioSink>,
}

impl ParserBlock {
    /// Create a parser block reading decoded bytes from `src`.
    pub fn new(opt: &ParserOpt, out_dir: impl Into<std::path::PathBuf>, src: ReadStream<u8>, records: NCWriteStream<EmittedRecord>) -> Result<Self> {
        Ok(Self {
            parser: Parser::new(opt, out_dir)?,
            src,
            records,
            audio: Box::new(NullAudioSink),
        })
    }

    /// Replace the audio sink voice bytes are forwarded to (C-channel only).
    pub fn set_audio_sink(&mut self, audio: Box<dyn AudioSink>) {
        self.audio = audio;
    }
}

impl BlockName for ParserBlock {
    fn block_name(&self) -> &str {
        "ParserBlock"
    }
}

impl Block for ParserBlock {
    fn work(&mut self) -> Result<BlockRet> {
        let unit_size = if self.parser.is_c { C_FRAME_SIZE } else { SIGNAL_UNIT_SIZE };
        let available = self.src.available();
        if available < unit_size {
            return Ok(if self.src.eof() { BlockRet::EOF } else { BlockRet::Noop });
        }

        let chunk = self.src.peek(unit_size);
        self.src.consume(unit_size);

        if self.parser.is_c {
            self.parser.process_c_frame(&chunk, self.audio.as_mut());
        } else {
            self.parser.process_bytes(&chunk);
        }
        Ok(BlockRet::Ok)
    }
}

impl Drop for ParserBlock {
    fn drop(&mut self) {
        self.records.set_eof();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc;
    use crate::tags;

    fn named_unit(tag: u8) -> crate::signal_unit::SignalUnit {
        let mut payload = [0u8; 10];
        payload[0] = tag;
        crate::signal_unit::SignalUnit(crc::with_crc(&payload))
    }

    #[test]
    fn s3_aes_index_is_suppressed_from_files_but_reaches_udp() {
        let dir = tempfile::tempdir().unwrap();
        let opt = ParserOpt {
            is_c: false,
            udp_sinks: vec![],
            save_files: true,
            station_id: None,
        };
        let mut parser = Parser::new(&opt, dir.path()).unwrap();
        parser.process_unit(named_unit(tags::TAG_AES_INDEX));
        assert_eq!(parser.other_history().len().unwrap(), 1);
        assert!(!dir.path().join("AES System Table Broadcast (Index)").exists());
    }

    #[test]
    fn s5_c_frame_splits_signalling_from_voice() {
        let dir = tempfile::tempdir().unwrap();
        let opt = ParserOpt {
            is_c: true,
            udp_sinks: vec![],
            save_files: false,
            station_id: None,
        };
        let mut parser = Parser::new(&opt, dir.path()).unwrap();

        struct CountingSink {
            bytes: usize,
        }
        impl AudioSink for CountingSink {
            fn write_voice(&mut self, voice: &[u8]) {
                self.bytes += voice.len();
            }
        }
        let mut sink = CountingSink { bytes: 0 };

        let mut frame = vec![0u8; C_FRAME_SIZE];
        let unit = crc::with_crc(&[0u8; 10]);
        frame[0..12].copy_from_slice(&unit);
        parser.process_c_frame(&frame, &mut sink);
        assert_eq!(sink.bytes, C_VOICE_LEN);
    }

    #[test]
    fn unclassified_named_record_reaches_other_history() {
        let dir = tempfile::tempdir().unwrap();
        let opt = ParserOpt {
            is_c: false,
            udp_sinks: vec![],
            save_files: false,
            station_id: None,
        };
        let mut parser = Parser::new(&opt, dir.path()).unwrap();
        // An unassigned tag resolves to an "Unknown 0x.." name, which is
        // not on the suppression list, so it is classified and emitted.
        parser.process_unit(named_unit(0x10));
        assert_eq!(parser.other_history().len().unwrap(), 1);
        assert_eq!(parser.acars_history().len().unwrap(), 0);
    }

    #[test]
    fn suppressed_other_tag_is_dropped_without_emission() {
        let dir = tempfile::tempdir().unwrap();
        let opt = ParserOpt {
            is_c: false,
            udp_sinks: vec![],
            save_files: false,
            station_id: None,
        };
        let mut parser = Parser::new(&opt, dir.path()).unwrap();
        parser.process_unit(named_unit(tags::TAG_T_CHANNEL_ASSIGNMENT));
        assert_eq!(parser.other_history().len().unwrap(), 0);
    }
}
