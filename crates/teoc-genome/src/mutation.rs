//! Gene transfer between meeting organisms, with point and pandemic mutation.

use crate::gene::MeetGene;
use crate::genome::{Genome, GENOME_LENGTH};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use teoc_core::{Clock, MutationConfig, Result, WrapMode};
use tracing::trace;

/// What a single transfer did to the recipient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Genome positions copied from the donor
    pub copied: usize,
    /// Positions re-randomized after copying, in copy order
    pub mutated: Vec<usize>,
    /// Whether the pandemic condition forced at least one of them
    pub pandemic: bool,
}

pub struct Mutator {
    config: MutationConfig,
    mode: WrapMode,
}

impl Mutator {
    pub fn new(config: MutationConfig, mode: WrapMode) -> Self {
        Self { config, mode }
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// True whenever the clock reads a multiple of the pandemic modulus
    pub fn is_pandemic(&self, clock: &dyn Clock) -> bool {
        clock.now_secs().rem_euclid(self.config.pandemic_modulus) == 0
    }

    /// Copy the donor's leading genes into the recipient.
    ///
    /// The copy length comes from the donor's Meet gene. Its `address` field
    /// is not consulted: copying always starts at index 0. Every copied bit
    /// costs one point-mutation draw; the pandemic check is only made when
    /// that draw misses.
    pub fn transfer(
        &self,
        donor: &Genome,
        recipient: &mut Genome,
        rng: &mut ChaCha8Rng,
        clock: &dyn Clock,
    ) -> Result<TransferReport> {
        let meet: MeetGene = donor.decode(self.mode)?;
        let mut report = TransferReport::default();

        for k in 0..meet.length as i64 {
            let index = self.mode.wrap(k, GENOME_LENGTH)?;
            recipient.set_bit(index, donor.bit(index));
            report.copied += 1;

            let point = rng.gen_range(0..self.config.incidence_per) == 0;
            let pandemic = !point && self.is_pandemic(clock);
            if point || pandemic {
                let bit = rng.gen_range(0..2u8);
                recipient.set_bit(index, bit);
                report.mutated.push(index);
                report.pandemic |= pandemic;
                trace!(index, bit, pandemic, "Gene mutated during transfer");
            }
        }

        Ok(report)
    }

    /// Whether a meeting ends with the pair swapping cells
    pub fn should_swap(&self, rng: &mut ChaCha8Rng) -> bool {
        rng.gen_range(0..self.config.swap_modulus) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::GENOME_BYTES;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use teoc_core::FixedClock;

    const STRICT: WrapMode = WrapMode::Strict;
    // 33 is not a multiple of 16
    const CALM: FixedClock = FixedClock(33);
    const PANDEMIC: FixedClock = FixedClock(32);

    fn donor_with_length(length: u8) -> Genome {
        let mut donor = Genome::from_packed(&[0xFF; GENOME_BYTES]).unwrap();
        donor
            .encode(
                &MeetGene {
                    address: 77,
                    length,
                },
                200,
                STRICT,
            )
            .unwrap();
        donor
    }

    fn rare_mutations() -> Mutator {
        Mutator::new(
            MutationConfig {
                incidence_per: u32::MAX,
                ..Default::default()
            },
            STRICT,
        )
    }

    #[test]
    fn test_transfer_copies_prefix_only() {
        let mutator = rare_mutations();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let donor = donor_with_length(64);
        let mut recipient = Genome::zeroed().unwrap();

        let report = mutator
            .transfer(&donor, &mut recipient, &mut rng, &CALM)
            .unwrap();

        assert_eq!(report.copied, 64);
        assert!(!report.pandemic);
        for index in 64..GENOME_LENGTH {
            assert_eq!(recipient.bit(index), 0, "bit {index} past the copy length");
        }
        for index in 0..64 {
            if !report.mutated.contains(&index) {
                assert_eq!(recipient.bit(index), donor.bit(index));
            }
        }
    }

    #[test]
    fn test_meet_address_does_not_shift_transfer() {
        let mutator = rare_mutations();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        // address 77 is decoded, but the copy still begins at 0
        let donor = donor_with_length(8);
        let mut recipient = Genome::zeroed().unwrap();

        mutator
            .transfer(&donor, &mut recipient, &mut rng, &CALM)
            .unwrap();

        assert_eq!(donor.gene_at(77, STRICT).unwrap(), 1);
        assert!((8..GENOME_LENGTH).all(|index| recipient.bit(index) == 0));
    }

    #[test]
    fn test_zero_length_transfer_is_a_no_op() {
        let mutator = rare_mutations();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let donor = donor_with_length(0);
        let mut recipient = Genome::zeroed().unwrap();

        let report = mutator
            .transfer(&donor, &mut recipient, &mut rng, &PANDEMIC)
            .unwrap();

        assert_eq!(report, TransferReport::default());
        assert_eq!(recipient.count_ones(), 0);
    }

    #[test]
    fn test_pandemic_rerolls_every_copied_bit() {
        let mutator = rare_mutations();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let donor = donor_with_length(100);
        let mut recipient = Genome::zeroed().unwrap();

        let report = mutator
            .transfer(&donor, &mut recipient, &mut rng, &PANDEMIC)
            .unwrap();

        assert!(report.pandemic);
        assert_eq!(report.mutated, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_certain_point_mutation() {
        let mutator = Mutator::new(
            MutationConfig {
                incidence_per: 1,
                ..Default::default()
            },
            STRICT,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let donor = donor_with_length(16);
        let mut recipient = Genome::zeroed().unwrap();

        let report = mutator
            .transfer(&donor, &mut recipient, &mut rng, &PANDEMIC)
            .unwrap();

        assert_eq!(report.mutated.len(), 16);
        // point mutation fired first, so the pandemic was never consulted
        assert!(!report.pandemic);
    }

    #[test]
    fn test_pandemic_detection() {
        let mutator = Mutator::new(MutationConfig::default(), STRICT);
        assert!(mutator.is_pandemic(&FixedClock(0)));
        assert!(mutator.is_pandemic(&FixedClock(1_600_000_000)));
        assert!(!mutator.is_pandemic(&FixedClock(1_600_000_001)));
    }

    #[test]
    fn test_swap_is_roughly_fair() {
        let mutator = Mutator::new(MutationConfig::default(), STRICT);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let swaps = (0..10_000).filter(|_| mutator.should_swap(&mut rng)).count();
        assert!((4_500..5_500).contains(&swaps), "swaps = {swaps}");
    }

    proptest! {
        #[test]
        fn proptest_copied_bits_come_from_donor_or_mutation(
            donor_bytes in proptest::collection::vec(any::<u8>(), GENOME_BYTES),
            recipient_bytes in proptest::collection::vec(any::<u8>(), GENOME_BYTES),
            seed in any::<u64>(),
            now in any::<i64>(),
        ) {
            let mutator = Mutator::new(MutationConfig { incidence_per: 50, ..Default::default() }, STRICT);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let donor = Genome::from_packed(&donor_bytes).unwrap();
            let original = Genome::from_packed(&recipient_bytes).unwrap();
            let mut recipient = original.clone();
            let length = donor.decode::<MeetGene>(STRICT).unwrap().length as usize;

            let report = mutator.transfer(&donor, &mut recipient, &mut rng, &FixedClock(now)).unwrap();

            prop_assert_eq!(report.copied, length);
            for index in 0..GENOME_LENGTH {
                if index >= length {
                    prop_assert_eq!(recipient.bit(index), original.bit(index));
                } else if !report.mutated.contains(&index) {
                    prop_assert_eq!(recipient.bit(index), donor.bit(index));
                }
            }
        }
    }
}
