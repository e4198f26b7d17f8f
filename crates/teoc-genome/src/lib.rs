//! Bit genomes for TEOC organisms.
//!
//! A genome is 256 bits addressed circularly. Its first 32 bits are a header
//! of four 8-bit slots, one per gene kind, each holding the address where
//! that gene's fields begin. Decoding is a pure function of the bits:
//! - the header says where to look
//! - each gene kind reads fixed-width fields from that address
//! - meetings copy a prefix of one genome into another, with mutation

pub mod gene;
pub mod genome;
pub mod mutation;

pub use gene::{DisplayGene, Gene, GeneKind, MeetGene, MoveGene, PersonalityGene};
pub use genome::{Genome, GENOME_ADDRESS_SIZE, GENOME_BYTES, GENOME_LENGTH};
pub use mutation::{Mutator, TransferReport};
