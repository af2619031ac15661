//! Record sinks (§4.N, §6): JSON files under `<out>/<msg_name>/` and UDP
//! datagram publication.
use std::net::UdpSocket;
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use log::error;

use crate::Result;
use crate::record::EmittedRecord;

/// A UDP destination records are published to (§6: `udp_sinks`).
#[derive(Debug, Clone)]
pub struct UdpTarget {
    /// Destination address or hostname.
    pub address: String,
    /// Destination port.
    pub port: u16,
}

/// Sends every record, JSON-serialized, to a list of UDP destinations.
/// A send failure on one target is logged and does not block the others
/// (§7: "Sink transient failure").
pub struct UdpSink {
    socket: UdpSocket,
    targets: Vec<UdpTarget>,
}

impl UdpSink {
    /// Bind an ephemeral local socket and publish to `targets`.
    pub fn new(targets: Vec<UdpTarget>) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self { socket, targets })
    }

    /// Send `record` to every configured target, independently.
    pub fn send(&self, record: &EmittedRecord, station_id: Option<&str>) {
        if self.targets.is_empty() {
            return;
        }
        let body = record.to_json(station_id).to_string();
        for target in &self.targets {
            let addr = format!("{}:{}", target.address, target.port);
            if let Err(e) = self.socket.send_to(body.as_bytes(), &addr) {
                error!("UDP send to {addr} failed: {e}");
            }
        }
    }
}

/// Writes non-suppressed records under `<out>/<msg_name>/<UTC>[_N].json`,
/// picking the first unused numeric suffix on collision (§6).
pub struct JsonFileSink {
    out_dir: PathBuf,
    enabled: bool,
}

impl JsonFileSink {
    /// Create a sink rooted at `out_dir`. When `enabled` is false,
    /// `write()` is a no-op (§6: `save_files=false`).
    pub fn new(out_dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            enabled,
        }
    }

    /// Write `record` to disk, unless disabled or suppressed (§4.H).
    pub fn write(&self, record: &EmittedRecord, station_id: Option<&str>) -> Result<()> {
        if !self.enabled || record.is_suppressed() {
            return Ok(());
        }
        let dir = self.out_dir.join(sanitize_dir_name(record.msg_name()));
        std::fs::create_dir_all(&dir)?;
        let path = pick_unused_path(&dir, record.timestamp());
        let body = serde_json::to_string_pretty(&record.to_json(station_id))?;
        std::fs::write(&path, body)?;
        Ok(())
    }
}

fn sanitize_dir_name(name: &str) -> String {
    name.replace('/', "_")
}

fn pick_unused_path(dir: &Path, timestamp: i64) -> PathBuf {
    let base = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format("%Y%m%dT%H%M%SZ").to_string())
        .unwrap_or_else(|| format!("unknown_{timestamp}"));
    let candidate = dir.join(format!("{base}.json"));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{base}_{n}.json"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_records_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path(), true);
        let record = EmittedRecord::AesIndex { timestamp: 1_700_000_000 };
        sink.write(&record, None).unwrap();
        assert!(!dir.path().join("AES System Table Broadcast (Index)").exists());
    }

    #[test]
    fn named_records_are_written_with_suffix_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path(), true);
        let record = EmittedRecord::Named {
            timestamp: 1_700_000_000,
            msg_name: "Custom Message".to_string(),
        };
        sink.write(&record, None).unwrap();
        sink.write(&record, None).unwrap();
        let msg_dir = dir.path().join("Custom Message");
        let mut entries: Vec<_> = std::fs::read_dir(&msg_dir).unwrap().map(|e| e.unwrap().file_name()).collect();
        entries.sort();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path(), false);
        let record = EmittedRecord::Named {
            timestamp: 1,
            msg_name: "X".to_string(),
        };
        sink.write(&record, None).unwrap();
        assert!(!dir.path().exists() || std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
