//! Miner identity and the per-phase directory snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque miner identifier (the registry hands these out as raw bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinerUid(pub Vec<u8>);

impl MinerUid {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }
}

impl fmt::Display for MinerUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<&str> for MinerUid {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// A registered miner as reported by the registry collaborator, filtered
/// to `status = active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerRef {
    pub uid: MinerUid,
    pub endpoint: String,
    pub weight: f64,
    /// Reset to zero at phase start, incremented only by the Selector.
    pub usage_counter: u32,
}

impl MinerRef {
    pub fn new(uid: MinerUid, endpoint: impl Into<String>, weight: f64) -> Self {
        Self { uid, endpoint: endpoint.into(), weight: weight.max(0.0), usage_counter: 0 }
    }
}

/// Immutable-after-creation snapshot of the active miner set for one phase.
///
/// Built once from the registry collaborator at phase start; never
/// observes mid-phase registrations. Usage counters are the only mutable
/// field and are touched exclusively by the Selector.
#[derive(Debug, Clone, Default)]
pub struct MinerDirectory {
    miners: HashMap<MinerUid, MinerRef>,
}

impl MinerDirectory {
    pub fn from_miners(miners: Vec<MinerRef>) -> Self {
        Self { miners: miners.into_iter().map(|m| (m.uid.clone(), m)).collect() }
    }

    pub fn len(&self) -> usize {
        self.miners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.miners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MinerRef> {
        self.miners.values()
    }

    pub fn get(&self, uid: &MinerUid) -> Option<&MinerRef> {
        self.miners.get(uid)
    }

    /// Increment one miner's usage counter. Called only by the Selector,
    /// and only between rounds (never concurrently with selection itself).
    pub fn record_usage(&mut self, uid: &MinerUid) {
        if let Some(m) = self.miners.get_mut(uid) {
            m.usage_counter += 1;
        }
    }

    pub fn usage_counter(&self, uid: &MinerUid) -> u32 {
        self.miners.get(uid).map(|m| m.usage_counter).unwrap_or(0)
    }
}
