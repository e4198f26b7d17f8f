//! Organism state.

use crate::display::ColorBucket;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use teoc_core::{Error, Position, Result, WrapMode};
use teoc_genome::{DisplayGene, Genome, MeetGene, MoveGene, PersonalityGene};

/// Number of glyph variants per color bucket
pub const FACE_VARIANTS: u8 = 6;

/// An organism in the simulation
#[derive(Debug, Clone)]
pub struct Organism {
    pub genome: Genome,
    pub position: Position,
    pub face: u8,
    pub age: u64,
    pub meetings: u32,
    pub genes_received: u64,
    pub mutations_received: u64,
}

impl Organism {
    pub fn new(genome: Genome, position: Position, face: u8) -> Result<Self> {
        if face >= FACE_VARIANTS {
            return Err(Error::InvalidState(format!(
                "face {} is outside [0, {})",
                face, FACE_VARIANTS
            )));
        }
        Ok(Self {
            genome,
            position,
            face,
            age: 0,
            meetings: 0,
            genes_received: 0,
            mutations_received: 0,
        })
    }

    pub fn random_face(rng: &mut ChaCha8Rng) -> u8 {
        rng.gen_range(0..FACE_VARIANTS)
    }

    pub fn display(&self, mode: WrapMode) -> Result<DisplayGene> {
        self.genome.decode(mode)
    }

    pub fn meet_gene(&self, mode: WrapMode) -> Result<MeetGene> {
        self.genome.decode(mode)
    }

    pub fn movement(&self, mode: WrapMode) -> Result<MoveGene> {
        self.genome.decode(mode)
    }

    pub fn is_extrovert(&self, mode: WrapMode) -> Result<bool> {
        Ok(self.genome.decode::<PersonalityGene>(mode)?.extrovert)
    }

    pub fn color_bucket(&self, mode: WrapMode) -> Result<ColorBucket> {
        Ok(ColorBucket::from_display(&self.display(mode)?))
    }

    pub fn tick(&mut self) {
        self.age += 1;
    }

    pub fn record_meeting(&mut self) {
        self.meetings += 1;
    }

    pub fn record_transfer(&mut self, copied: usize, mutated: usize) {
        self.genes_received += copied as u64;
        self.mutations_received += mutated as u64;
    }
}

/// Serializable organism data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismData {
    pub position: Position,
    pub face: u8,
    pub age: u64,
    pub meetings: u32,
    pub genes_received: u64,
    pub mutations_received: u64,
    /// Packed genome, see [`Genome::as_packed`]
    pub genome: Vec<u8>,
}

impl From<&Organism> for OrganismData {
    fn from(org: &Organism) -> Self {
        Self {
            position: org.position,
            face: org.face,
            age: org.age,
            meetings: org.meetings,
            genes_received: org.genes_received,
            mutations_received: org.mutations_received,
            genome: org.genome.as_packed().to_vec(),
        }
    }
}

impl OrganismData {
    pub fn into_organism(self) -> Result<Organism> {
        let genome = Genome::from_packed(&self.genome)?;
        let mut organism = Organism::new(genome, self.position, self.face)?;
        organism.age = self.age;
        organism.meetings = self.meetings;
        organism.genes_received = self.genes_received;
        organism.mutations_received = self.mutations_received;
        Ok(organism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use teoc_genome::GeneKind;

    const STRICT: WrapMode = WrapMode::Strict;

    #[test]
    fn test_organism_creation() {
        let genome = Genome::zeroed().unwrap();
        let organism = Organism::new(genome, Position::new(5, 5), 3).unwrap();
        assert_eq!(organism.position, Position::new(5, 5));
        assert_eq!(organism.face, 3);
        assert_eq!(organism.age, 0);
    }

    #[test]
    fn test_face_out_of_range() {
        let genome = Genome::zeroed().unwrap();
        assert!(Organism::new(genome, Position::new(0, 0), FACE_VARIANTS).is_err());
    }

    #[test]
    fn test_random_face_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = [false; FACE_VARIANTS as usize];
        for _ in 0..200 {
            seen[Organism::random_face(&mut rng) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_gene_queries() {
        let mut genome = Genome::zeroed().unwrap();
        genome
            .encode(
                &DisplayGene {
                    red: 10,
                    green: 10,
                    blue: 0,
                },
                40,
                STRICT,
            )
            .unwrap();
        genome
            .encode(&PersonalityGene { extrovert: true }, 100, STRICT)
            .unwrap();
        let organism = Organism::new(genome, Position::new(0, 0), 0).unwrap();

        assert_eq!(organism.color_bucket(STRICT).unwrap(), ColorBucket::White);
        assert!(organism.is_extrovert(STRICT).unwrap());
        // Move header still reads 0, so the gene is decoded from the header bits
        assert_eq!(organism.genome.gene_start_address(GeneKind::Move, STRICT).unwrap(), 0);
    }

    #[test]
    fn test_metrics_tracking() {
        let genome = Genome::zeroed().unwrap();
        let mut organism = Organism::new(genome, Position::new(0, 0), 0).unwrap();
        organism.tick();
        organism.record_meeting();
        organism.record_transfer(12, 2);
        assert_eq!(organism.age, 1);
        assert_eq!(organism.meetings, 1);
        assert_eq!(organism.genes_received, 12);
        assert_eq!(organism.mutations_received, 2);
    }

    #[test]
    fn test_organism_data_restores_genome() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let genome = Genome::random(&mut rng).unwrap();
        let mut organism = Organism::new(genome, Position::new(2, 3), 4).unwrap();
        organism.age = 17;
        organism.record_transfer(30, 1);

        let restored = OrganismData::from(&organism).into_organism().unwrap();
        assert_eq!(restored.genome, organism.genome);
        assert_eq!(restored.position, organism.position);
        assert_eq!(restored.face, 4);
        assert_eq!(restored.age, 17);
        assert_eq!(restored.genes_received, 30);
        assert_eq!(restored.mutations_received, 1);
    }
}
