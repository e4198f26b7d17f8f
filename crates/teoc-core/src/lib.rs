//! Core types and utilities for the TEOC organism simulation.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::*;
pub use error::{Error, Result};
pub use types::*;
