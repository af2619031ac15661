//! Configuration & CLI surface (§4.O, §6).
//!
//! A `clap::Parser`-derived pair, parsed once in `main` and threaded by
//! value into the pipeline constructors — no global/static config, per
//! §9's redesign note.
use clap::Parser;

use crate::sinks::UdpTarget;

/// Configuration recognized by the decoder (§6).
#[derive(Parser, Debug, Clone)]
pub struct DecoderOpt {
    /// C-channel (voice+signalling) mode.
    #[arg(long, default_value_t = false)]
    pub is_c: bool,

    /// Offset-modulated (OQPSK) vs binary-phase (BPSK).
    #[arg(long)]
    pub oqpsk: bool,

    /// Post-sync padding bits.
    #[arg(long)]
    pub dummy_bits: usize,

    /// Interleaver column count.
    #[arg(long)]
    pub inter_cols: usize,

    /// Interleaver block count.
    #[arg(long)]
    pub inter_blocks: usize,

    /// Maximum post-Viterbi BER accepted for emission.
    #[arg(long, default_value_t = 1.0)]
    pub ber_threshold: f64,

    /// Diagnostic VFO frequency label (no decoding effect).
    #[arg(long)]
    pub vfo_freq: Option<f64>,

    /// Diagnostic VFO name label (no decoding effect).
    #[arg(long)]
    pub vfo_name: Option<String>,
}

/// One `{address, port}` UDP sink, parsed from `address:port` on the CLI.
#[derive(Debug, Clone)]
pub struct UdpSinkArg(pub UdpTarget);

impl std::str::FromStr for UdpSinkArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, port) = s.rsplit_once(':').ok_or_else(|| format!("expected address:port, got {s:?}"))?;
        let port: u16 = port.parse().map_err(|e| format!("invalid port in {s:?}: {e}"))?;
        Ok(UdpSinkArg(UdpTarget {
            address: address.to_string(),
            port,
        }))
    }
}

/// Configuration recognized by the parser (§6).
#[derive(Parser, Debug, Clone)]
pub struct ParserOpt {
    /// C-channel (voice+signalling) mode.
    #[arg(long, default_value_t = false)]
    pub is_c: bool,

    /// UDP sinks every emitted record is JSON-serialized and sent to.
    #[arg(long = "udp-sink", value_name = "ADDRESS:PORT")]
    pub udp_sinks: Vec<UdpSinkArg>,

    /// Write non-suppressed records under `<out>/<msg_name>/`.
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true, value_parser = clap::value_parser!(bool))]
    pub save_files: bool,

    /// Stamped into an emitted record's `source.station_id`.
    #[arg(long)]
    pub station_id: Option<String>,
}

impl ParserOpt {
    /// Flatten the parsed `--udp-sink` args into plain targets.
    pub fn udp_targets(&self) -> Vec<UdpTarget> {
        self.udp_sinks.iter().map(|a| a.0.clone()).collect()
    }
}
