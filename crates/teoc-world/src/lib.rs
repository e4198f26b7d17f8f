//! World simulation engine.
//!
//! Organisms live on a toroidal grid, step along their Move gene each tick,
//! and pass genes to whoever blocks their way.

pub mod display;
pub mod grid;
pub mod organism;
pub mod simulation;
pub mod snapshot;

pub use display::{Census, ColorBucket};
pub use grid::Grid;
pub use organism::{Organism, OrganismData, FACE_VARIANTS};
pub use simulation::{MeetOutcome, MoveOutcome, Simulation, SimulationResult, SimulationStats};
pub use snapshot::{WorldSnapshot, SNAPSHOT_VERSION};
