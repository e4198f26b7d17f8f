//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::WrapMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// World configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the world grid
    pub width: u32,
    /// Height of the world grid
    pub height: u32,
}

impl WorldConfig {
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
        }
    }
}

/// Gene transfer and mutation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// A copied bit is re-randomized with probability 1 / incidence_per
    pub incidence_per: u32,
    /// Pandemic fires whenever the clock in seconds is a multiple of this
    pub pandemic_modulus: i64,
    /// Meeting organisms swap cells with probability 1 / swap_modulus
    pub swap_modulus: u32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            incidence_per: 100_000,
            pandemic_modulus: 16,
            swap_modulus: 2,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed; `None` seeds from the wall clock
    pub seed: Option<u64>,
    /// World configuration
    pub world: WorldConfig,
    /// Mutation configuration
    pub mutation: MutationConfig,
    /// Organisms created when the simulation starts
    pub initial_population: usize,
    /// Random probes allowed per empty-cell search
    pub max_placement_attempts: u32,
    /// Circular index arithmetic mode
    pub wrap_mode: WrapMode,
    /// Number of ticks `run` advances
    pub num_ticks: u64,
    /// Ticks between population summaries (0 disables them)
    pub metrics_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            seed: None,
            initial_population: world.cell_count() / 4,
            world,
            mutation: MutationConfig::default(),
            max_placement_attempts: 10_000,
            wrap_mode: WrapMode::Strict,
            num_ticks: 1_000,
            metrics_interval: 100,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "world dimensions must be non-zero, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.mutation.incidence_per == 0 {
            return Err(Error::InvalidConfig(
                "mutation.incidence_per must be non-zero".to_string(),
            ));
        }
        if self.mutation.pandemic_modulus <= 0 {
            return Err(Error::InvalidConfig(
                "mutation.pandemic_modulus must be positive".to_string(),
            ));
        }
        if self.mutation.swap_modulus == 0 {
            return Err(Error::InvalidConfig(
                "mutation.swap_modulus must be non-zero".to_string(),
            ));
        }
        if self.max_placement_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_placement_attempts must be non-zero".to_string(),
            ));
        }
        let cells = self.world.cell_count();
        if self.initial_population >= cells {
            return Err(Error::NoCapacity(format!(
                "initial population {} needs headroom on a grid of {} cells",
                self.initial_population, cells
            )));
        }
        Ok(())
    }
}
