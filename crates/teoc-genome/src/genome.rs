//! Fixed-length, circularly addressed bit genome.

use crate::gene::{Gene, GeneKind};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use teoc_core::{Error, Result, WrapMode};

/// Number of bits in every genome
pub const GENOME_LENGTH: usize = 256;
/// Width of one gene address header slot; `2^GENOME_ADDRESS_SIZE == GENOME_LENGTH`
pub const GENOME_ADDRESS_SIZE: u32 = 8;
/// Packed size of a genome in bytes
pub const GENOME_BYTES: usize = GENOME_LENGTH / 8;

/// 256 bits packed little-endian into 32 bytes.
///
/// Bit `i` lives in byte `i / 8` at bit position `i % 8`. Every accessor
/// that takes a virtual index routes it through the configured
/// [`WrapMode`] first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    bits: Vec<u8>,
}

impl Genome {
    /// All-zero genome
    pub fn zeroed() -> Result<Self> {
        let mut bits = Vec::new();
        bits.try_reserve_exact(GENOME_BYTES)?;
        bits.resize(GENOME_BYTES, 0);
        Ok(Self { bits })
    }

    /// Genome with every bit drawn independently and uniformly
    pub fn random(rng: &mut ChaCha8Rng) -> Result<Self> {
        let mut genome = Self::zeroed()?;
        for index in 0..GENOME_LENGTH {
            genome.set_bit(index, rng.gen_range(0..2u8));
        }
        Ok(genome)
    }

    /// Rebuild a genome from its packed bytes
    pub fn from_packed(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != GENOME_BYTES {
            return Err(Error::Serialization(format!(
                "genome needs {} packed bytes, got {}",
                GENOME_BYTES,
                bytes.len()
            )));
        }
        let mut genome = Self::zeroed()?;
        genome.bits.copy_from_slice(bytes);
        Ok(genome)
    }

    pub fn as_packed(&self) -> &[u8] {
        &self.bits
    }

    /// Bit at a physical index in `[0, GENOME_LENGTH)`
    pub fn bit(&self, index: usize) -> u8 {
        (self.bits[index / 8] >> (index % 8)) & 1
    }

    pub fn set_bit(&mut self, index: usize, value: u8) {
        let mask = 1u8 << (index % 8);
        if value & 1 == 1 {
            self.bits[index / 8] |= mask;
        } else {
            self.bits[index / 8] &= !mask;
        }
    }

    /// Bit at a virtual index, wrapped once around the genome
    pub fn gene_at(&self, virtual_index: i64, mode: WrapMode) -> Result<u8> {
        let index = mode.wrap(virtual_index, GENOME_LENGTH)?;
        Ok(self.bit(index))
    }

    pub fn set_gene_at(&mut self, virtual_index: i64, value: u8, mode: WrapMode) -> Result<()> {
        let index = mode.wrap(virtual_index, GENOME_LENGTH)?;
        self.set_bit(index, value);
        Ok(())
    }

    /// Read `length` bits from `start` as a little-endian unsigned integer.
    ///
    /// Bit `start + k` contributes `2^k`. This is the only decode primitive;
    /// headers and every gene field go through it.
    pub fn unsigned_int(&self, start: i64, length: u32, mode: WrapMode) -> Result<u32> {
        debug_assert!(length <= 32);
        let mut value = 0u32;
        for k in 0..length {
            value |= (self.gene_at(start + k as i64, mode)? as u32) << k;
        }
        Ok(value)
    }

    /// Inverse of [`Genome::unsigned_int`]; bits of `value` above `length` are ignored
    pub fn write_unsigned(
        &mut self,
        start: i64,
        length: u32,
        value: u32,
        mode: WrapMode,
    ) -> Result<()> {
        debug_assert!(length <= 32);
        for k in 0..length {
            self.set_gene_at(start + k as i64, ((value >> k) & 1) as u8, mode)?;
        }
        Ok(())
    }

    /// Start address of a gene, read from its header slot
    pub fn gene_start_address(&self, kind: GeneKind, mode: WrapMode) -> Result<u32> {
        self.unsigned_int(kind.header_offset(), GENOME_ADDRESS_SIZE, mode)
    }

    pub fn set_gene_start_address(
        &mut self,
        kind: GeneKind,
        address: u8,
        mode: WrapMode,
    ) -> Result<()> {
        self.write_unsigned(
            kind.header_offset(),
            GENOME_ADDRESS_SIZE,
            address as u32,
            mode,
        )
    }

    /// Decode a gene at the address its header slot points to
    pub fn decode<G: Gene>(&self, mode: WrapMode) -> Result<G> {
        let start = self.gene_start_address(G::KIND, mode)?;
        G::decode(self, start, mode)
    }

    /// Point the gene's header slot at `address` and write the gene there.
    ///
    /// Gene content is written after the header, so a gene placed over the
    /// header region overwrites it.
    pub fn encode<G: Gene>(&mut self, gene: &G, address: u8, mode: WrapMode) -> Result<()> {
        self.set_gene_start_address(G::KIND, address, mode)?;
        gene.encode(self, address as u32, mode)
    }

    pub fn count_ones(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..GENOME_LENGTH {
            write!(f, "{}", self.bit(index))?;
        }
        Ok(())
    }
}
