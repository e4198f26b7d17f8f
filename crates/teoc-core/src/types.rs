//! Core type definitions for the simulation.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Stable handle for an organism stored in the simulation arena.
    pub struct OrganismId;
}

/// How circular index arithmetic treats inputs outside `[-range, 2*range)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Fail with [`Error::InvalidOffset`] outside the single-wrap domain.
    #[default]
    Strict,
    /// Apply the single subtraction/addition without a domain check, then
    /// reduce whatever is left into range.
    Legacy,
}

impl WrapMode {
    pub fn wrap(self, index: i64, range: usize) -> Result<usize> {
        match self {
            WrapMode::Strict => wrapped_index(index, range),
            WrapMode::Legacy => {
                if range == 0 {
                    return Err(Error::InvalidOffset { index, range });
                }
                let r = range as i64;
                let once = if index >= r {
                    index - r
                } else if index < 0 {
                    r + index
                } else {
                    index
                };
                Ok(once.rem_euclid(r) as usize)
            }
        }
    }
}

/// Map `index` into `[0, range)` with at most one wrap.
///
/// `[0, range)` is returned as is, `[range, 2*range)` has `range` subtracted
/// and `[-range, 0)` has `range` added. Anything else is an
/// [`Error::InvalidOffset`].
pub fn wrapped_index(index: i64, range: usize) -> Result<usize> {
    let r = range as i64;
    if range == 0 || index < -r || index >= 2 * r {
        return Err(Error::InvalidOffset { index, range });
    }

    let wrapped = if index >= r {
        index - r
    } else if index < 0 {
        r + index
    } else {
        index
    };
    Ok(wrapped as usize)
}

/// 2D cell coordinate on the world grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)` with toroidal wrapping on each axis
    pub fn offset(
        &self,
        dx: i32,
        dy: i32,
        width: u32,
        height: u32,
        mode: WrapMode,
    ) -> Result<Self> {
        let x = mode.wrap(self.x as i64 + dx as i64, width as usize)?;
        let y = mode.wrap(self.y as i64 + dy as i64, height as usize)?;
        Ok(Self::new(x as u32, y as u32))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
