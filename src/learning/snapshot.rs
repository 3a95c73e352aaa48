//! Binary snapshots of a trained value function.
//!
//! Layout: the 4-byte magic `NTTD`, the format version as little-endian
//! `u32`, then the bincode encoding of [`Snapshot`]. The header is read
//! before anything else so a different version is reported as such rather
//! than as a decoding failure.

use serde::{Deserialize, Serialize};

use super::config::TdConfig;
use crate::core::BoardGeometry;
use crate::error::SnapshotError;
use crate::ntuple::NTupleNetwork;

/// Current snapshot format version. Bump on every layout change.
pub const SNAPSHOT_VERSION: u32 = 1;

const MAGIC: [u8; 4] = *b"NTTD";
const HEADER_LEN: usize = MAGIC.len() + 4;

/// Everything needed to rebuild an engine except its symmetries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub geometry: BoardGeometry,
    pub sample_points: Vec<Vec<usize>>,
    pub config: TdConfig,
    /// Decayed learning rate at the time of the snapshot.
    pub alpha: f64,
    pub tables: NTupleNetwork,
}

impl Snapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let body = bincode::serialize(self)?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decode and check a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Corrupt(format!(
                "{} bytes is too short for a snapshot header",
                bytes.len()
            )));
        }
        let (header, body) = bytes.split_at(HEADER_LEN);
        if header[..MAGIC.len()] != MAGIC {
            return Err(SnapshotError::Corrupt("missing snapshot magic".to_string()));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&header[MAGIC.len()..]);
        let found = u32::from_le_bytes(version);
        if found != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: Snapshot = bincode::deserialize(body)?;
        snapshot.check()?;
        Ok(snapshot)
    }

    /// Check that the parts of the snapshot agree with each other.
    pub fn check(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        self.geometry
            .validate()
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        self.config
            .validate()
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(SnapshotError::Corrupt(format!("invalid alpha {}", self.alpha)));
        }
        if self.tables.sample_points() != self.sample_points {
            return Err(SnapshotError::Corrupt(
                "sample points disagree with the stored tables".to_string(),
            ));
        }
        self.tables
            .check_consistency(&self.geometry, self.config.tc.as_ref())
            .map_err(SnapshotError::Corrupt)
    }
}
