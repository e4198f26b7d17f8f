//! World snapshots for saving and resuming runs.

use crate::organism::OrganismData;
use crate::simulation::{Simulation, SimulationStats};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use teoc_core::{Error, Result, SimulationConfig};
use tracing::info;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to continue a run exactly where it stopped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: u32,
    pub timestamp: i64,
    pub width: u32,
    pub height: u32,
    pub tick: u64,
    pub seed: u64,
    pub rng: ChaCha8Rng,
    pub stats: SimulationStats,
    /// In tick order
    pub organisms: Vec<OrganismData>,
}

impl WorldSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self = bincode::deserialize(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes()?)?;
        info!(
            path = %path.as_ref().display(),
            tick = self.tick,
            organisms = self.organisms.len(),
            "Snapshot written"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

impl Simulation {
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            version: SNAPSHOT_VERSION,
            timestamp: chrono::Utc::now().timestamp(),
            width: self.grid.width,
            height: self.grid.height,
            tick: self.tick,
            seed: self.seed,
            rng: self.rng.clone(),
            stats: self.stats.clone(),
            organisms: self.organisms().map(|(_, org)| OrganismData::from(org)).collect(),
        }
    }

    /// Rebuild a world from a snapshot. The config must describe the same grid.
    pub fn restore(config: SimulationConfig, snapshot: WorldSnapshot) -> Result<Self> {
        if config.world.width != snapshot.width || config.world.height != snapshot.height {
            return Err(Error::InvalidConfig(format!(
                "snapshot grid is {}x{} but the config asks for {}x{}",
                snapshot.width, snapshot.height, config.world.width, config.world.height
            )));
        }

        let mut sim = Self::empty(SimulationConfig {
            seed: Some(snapshot.seed),
            initial_population: 0,
            ..config
        })?;
        for data in snapshot.organisms {
            sim.insert_organism(data.into_organism()?)?;
        }
        sim.config.initial_population = sim.organisms.len();
        sim.tick = snapshot.tick;
        sim.rng = snapshot.rng;
        sim.stats = snapshot.stats;

        info!(
            tick = sim.tick,
            seed = sim.seed,
            population = sim.organisms.len(),
            "Simulation restored from snapshot"
        );
        Ok(sim)
    }
}
