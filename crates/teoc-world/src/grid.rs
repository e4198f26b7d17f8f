//! Toroidal occupancy grid.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use teoc_core::{Error, OrganismId, Position, Result};

/// A 2D grid where every cell holds at most one organism handle
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    cells: Vec<Option<OrganismId>>,
    occupied: usize,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![None; size],
            occupied: 0,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Organism at `pos`, if any. Out-of-bounds positions are empty.
    pub fn occupant(&self, pos: Position) -> Option<OrganismId> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[self.pos_to_index(pos)]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.contains(pos) && self.occupant(pos).is_none()
    }

    /// Put `id` into an empty cell
    pub fn place(&mut self, id: OrganismId, pos: Position) -> Result<()> {
        let index = self.checked_index(pos)?;
        if let Some(current) = self.cells[index] {
            return Err(Error::InvalidState(format!(
                "cannot place {:?} at {}: occupied by {:?}",
                id, pos, current
            )));
        }
        self.cells[index] = Some(id);
        self.occupied += 1;
        Ok(())
    }

    /// Empty a cell, returning whoever was there
    pub fn vacate(&mut self, pos: Position) -> Result<Option<OrganismId>> {
        let index = self.checked_index(pos)?;
        let previous = self.cells[index].take();
        if previous.is_some() {
            self.occupied -= 1;
        }
        Ok(previous)
    }

    /// Move `id` from `from` into the empty cell `to`
    pub fn relocate(&mut self, id: OrganismId, from: Position, to: Position) -> Result<()> {
        let from_index = self.checked_index(from)?;
        let to_index = self.checked_index(to)?;
        if self.cells[from_index] != Some(id) {
            return Err(Error::InvalidState(format!(
                "{:?} is not at {}",
                id, from
            )));
        }
        if let Some(current) = self.cells[to_index] {
            return Err(Error::InvalidState(format!(
                "cannot relocate {:?} to {}: occupied by {:?}",
                id, to, current
            )));
        }
        self.cells[from_index] = None;
        self.cells[to_index] = Some(id);
        Ok(())
    }

    /// Exchange the occupants of two occupied cells
    pub fn swap(&mut self, a: Position, b: Position) -> Result<()> {
        let a_index = self.checked_index(a)?;
        let b_index = self.checked_index(b)?;
        if self.cells[a_index].is_none() || self.cells[b_index].is_none() {
            return Err(Error::InvalidState(format!(
                "swap needs two occupied cells, got {} and {}",
                a, b
            )));
        }
        self.cells.swap(a_index, b_index);
        Ok(())
    }

    /// Sample cells uniformly until an empty one turns up.
    ///
    /// Each attempt draws x then y. Gives up with [`Error::NoCapacity`]
    /// after `max_attempts` probes, or immediately on a full grid.
    pub fn find_empty_position(
        &self,
        rng: &mut ChaCha8Rng,
        max_attempts: u32,
    ) -> Result<Position> {
        if self.occupied >= self.cells.len() {
            return Err(Error::NoCapacity(format!(
                "all {} cells are occupied",
                self.cells.len()
            )));
        }

        for _ in 0..max_attempts {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let pos = Position::new(x, y);
            if self.occupant(pos).is_none() {
                return Ok(pos);
            }
        }

        Err(Error::NoCapacity(format!(
            "no empty cell found in {} attempts ({} of {} occupied)",
            max_attempts,
            self.occupied,
            self.cells.len()
        )))
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        if !self.contains(pos) {
            return Err(Error::InvalidState(format!(
                "{} is outside the {}x{} grid",
                pos, self.width, self.height
            )));
        }
        Ok(self.pos_to_index(pos))
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index % self.width as usize) as u32;
        let y = (index / self.width as usize) as u32;
        Position::new(x, y)
    }

    /// Iterator over occupied cells
    pub fn iter(&self) -> impl Iterator<Item = (Position, OrganismId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.map(|id| (self.index_to_pos(i), id)))
    }
}
