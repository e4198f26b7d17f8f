//! Typed genes decoded from fixed offsets past a gene's start address.

use crate::genome::{Genome, GENOME_ADDRESS_SIZE};
use serde::{Deserialize, Serialize};
use teoc_core::{Error, Result, WrapMode};

/// The four gene kinds; the discriminant is the header slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneKind {
    Display = 0,
    Meet = 1,
    Move = 2,
    Personality = 3,
}

impl GeneKind {
    pub const ALL: [GeneKind; 4] = [
        GeneKind::Display,
        GeneKind::Meet,
        GeneKind::Move,
        GeneKind::Personality,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Bit offset of this gene's address slot in the header
    pub fn header_offset(self) -> i64 {
        (GENOME_ADDRESS_SIZE * self.index()) as i64
    }
}

/// A gene with a fixed bit layout relative to its start address
pub trait Gene: Sized {
    const KIND: GeneKind;

    fn decode(genome: &Genome, start: u32, mode: WrapMode) -> Result<Self>;

    fn encode(&self, genome: &mut Genome, start: u32, mode: WrapMode) -> Result<()>;
}

/// Color channel weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayGene {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Gene for DisplayGene {
    const KIND: GeneKind = GeneKind::Display;

    fn decode(genome: &Genome, start: u32, mode: WrapMode) -> Result<Self> {
        let start = start as i64;
        Ok(Self {
            red: genome.unsigned_int(start, 8, mode)? as u8,
            green: genome.unsigned_int(start + 8, 8, mode)? as u8,
            blue: genome.unsigned_int(start + 16, 8, mode)? as u8,
        })
    }

    fn encode(&self, genome: &mut Genome, start: u32, mode: WrapMode) -> Result<()> {
        let start = start as i64;
        genome.write_unsigned(start, 8, self.red as u32, mode)?;
        genome.write_unsigned(start + 8, 8, self.green as u32, mode)?;
        genome.write_unsigned(start + 16, 8, self.blue as u32, mode)
    }
}

/// Gene transfer parameters.
///
/// `address` is decoded but the transfer always starts at genome index 0;
/// only `length` drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetGene {
    pub address: u8,
    pub length: u8,
}

impl Gene for MeetGene {
    const KIND: GeneKind = GeneKind::Meet;

    fn decode(genome: &Genome, start: u32, mode: WrapMode) -> Result<Self> {
        let start = start as i64;
        Ok(Self {
            address: genome.unsigned_int(start, 8, mode)? as u8,
            length: genome.unsigned_int(start + 8, 8, mode)? as u8,
        })
    }

    fn encode(&self, genome: &mut Genome, start: u32, mode: WrapMode) -> Result<()> {
        let start = start as i64;
        genome.write_unsigned(start, 8, self.address as u32, mode)?;
        genome.write_unsigned(start + 8, 8, self.length as u32, mode)
    }
}

/// Per-tick step, each axis in `{-1, 0, 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveGene {
    pub offset_x: i32,
    pub offset_y: i32,
}

impl MoveGene {
    fn decode_axis(genome: &Genome, at: i64, mode: WrapMode) -> Result<i32> {
        let magnitude = genome.unsigned_int(at, 1, mode)? as i32;
        let negative = genome.unsigned_int(at + 1, 1, mode)? == 1;
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn encode_axis(genome: &mut Genome, at: i64, offset: i32, mode: WrapMode) -> Result<()> {
        if !(-1..=1).contains(&offset) {
            return Err(Error::InvalidState(format!(
                "move offset {offset} does not fit a single magnitude bit"
            )));
        }
        genome.write_unsigned(at, 1, offset.unsigned_abs(), mode)?;
        genome.write_unsigned(at + 1, 1, (offset < 0) as u32, mode)
    }
}

impl Gene for MoveGene {
    const KIND: GeneKind = GeneKind::Move;

    fn decode(genome: &Genome, start: u32, mode: WrapMode) -> Result<Self> {
        let start = start as i64;
        Ok(Self {
            offset_x: Self::decode_axis(genome, start, mode)?,
            offset_y: Self::decode_axis(genome, start + 2, mode)?,
        })
    }

    fn encode(&self, genome: &mut Genome, start: u32, mode: WrapMode) -> Result<()> {
        let start = start as i64;
        Self::encode_axis(genome, start, self.offset_x, mode)?;
        Self::encode_axis(genome, start + 2, self.offset_y, mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityGene {
    pub extrovert: bool,
}

impl Gene for PersonalityGene {
    const KIND: GeneKind = GeneKind::Personality;

    fn decode(genome: &Genome, start: u32, mode: WrapMode) -> Result<Self> {
        Ok(Self {
            extrovert: genome.unsigned_int(start as i64, 1, mode)? == 1,
        })
    }

    fn encode(&self, genome: &mut Genome, start: u32, mode: WrapMode) -> Result<()> {
        genome.write_unsigned(start as i64, 1, self.extrovert as u32, mode)
    }
}
