//! Versioned binary snapshots for persistence collaborators.
//!
//! The engine only requires that a storage layer can commit a snapshot (or
//! a mutation batch derived from one) atomically; it prescribes no storage
//! technology. Snapshots are `bitcode` payloads behind a magic/version
//! header so a store can detect format drift before decoding.

use crate::tournament::Tournament;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a tournament snapshot ("KNCK").
pub const SNAPSHOT_MAGIC: u32 = 0x4B4E_434B;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header encoded with every snapshot. Enables format detection and
/// version checking before trusting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Magic number for format detection.
    pub magic: u32,
    /// Format version for forward compatibility.
    pub version: u32,
    /// Decided match count at snapshot time, a cheap progress peek.
    pub decided: u32,
}

impl SnapshotHeader {
    fn new(decided: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            decided,
        }
    }

    /// Validate the header. Returns `Ok(())` if valid.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    header: SnapshotHeader,
    tournament: &'a Tournament,
}

#[derive(Deserialize)]
struct Envelope {
    header: SnapshotHeader,
    tournament: Tournament,
}

/// Serialize a tournament to a versioned binary snapshot.
pub fn to_bytes(tournament: &Tournament) -> Result<Vec<u8>, SerializeError> {
    let decided = tournament
        .all_matches()
        .filter(|(_, m)| m.winner.is_some())
        .count() as u32;
    let envelope = EnvelopeRef {
        header: SnapshotHeader::new(decided),
        tournament,
    };
    bitcode::serialize(&envelope).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Restore a tournament from a snapshot, checking the header first.
pub fn from_bytes(data: &[u8]) -> Result<Tournament, DeserializeError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    envelope.header.validate()?;
    Ok(envelope.tournament)
}

/// Read just the header from snapshot data.
pub fn read_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(envelope.header)
}

// ===========================================================================
// Tests
// ===========================================================================
