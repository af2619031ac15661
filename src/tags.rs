//! Message-ID tag space (§3, §4.H).
//!
//! The wire-level tag byte assignments are not part of this retrieval
//! pack's source material; the values below are a self-consistent, narrow
//! assignment (documented in DESIGN.md) that satisfies the dispatch rules
//! §4.H specifies: a single ISU tag, a top-two-bits-`11` SSU range, the
//! reserved `0x26`, an AES index tag, and a small named set.

/// Tag for the user-data initial signal unit.
pub const TAG_ISU: u8 = 0x90;
/// Reserved tag, silently dropped.
pub const TAG_RESERVED_26: u8 = 0x26;
/// Tag for the AES System Table Broadcast (Index).
pub const TAG_AES_INDEX: u8 = 0x50;
/// Tag for "Acknowledge (RACK / TACK P Channel, PACK R Channel)".
pub const TAG_ACK: u8 = 0x40;
/// Tag for "T Channel Assignment".
pub const TAG_T_CHANNEL_ASSIGNMENT: u8 = 0x41;

/// Mask identifying the SSU range: any tag whose top two bits are `11`.
pub const SSU_MASK: u8 = 0xC0;

/// True if `tag` falls in the SSU range (§3).
pub fn is_ssu(tag: u8) -> bool {
    tag & SSU_MASK == SSU_MASK
}

/// The sequence number carried in an SSU tag's low 6 bits; `0` terminates
/// the in-progress user-data transaction (§3, §4.H).
pub fn ssu_seq_no(tag: u8) -> u8 {
    tag & !SSU_MASK
}

/// Names inhibiting persistent logging and file emission, but not UDP
/// streaming (§4.H).
pub const SUPPRESSED_NAMES: &[&str] = &[
    "SSU",
    "AES System Table Broadcast (Index)",
    "Reserved 0x26",
    "Acknowledge (RACK / TACK P Channel, PACK R Channel)",
    "T Channel Assignment",
];

/// Resolve a tag to its human-readable name via the tag→name dictionary.
pub fn tag_name(tag: u8) -> String {
    match tag {
        TAG_ISU => "User Data ISU".to_string(),
        TAG_RESERVED_26 => "Reserved 0x26".to_string(),
        TAG_AES_INDEX => "AES System Table Broadcast (Index)".to_string(),
        TAG_ACK => "Acknowledge (RACK / TACK P Channel, PACK R Channel)".to_string(),
        TAG_T_CHANNEL_ASSIGNMENT => "T Channel Assignment".to_string(),
        t if is_ssu(t) => "SSU".to_string(),
        t => format!("Unknown 0x{t:02x}"),
    }
}

/// True if `name` should be suppressed from persistent logging/file
/// emission (§4.H): either in the explicit suppression list, or a
/// "Reserved …" name.
pub fn is_suppressed(name: &str) -> bool {
    SUPPRESSED_NAMES.contains(&name) || name.starts_with("Reserved")
}
