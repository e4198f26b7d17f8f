//! Simulation engine: organism lifecycle, movement, meetings and ticks.

use crate::display::{Census, ColorBucket};
use crate::grid::Grid;
use crate::organism::Organism;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use teoc_core::{
    Clock, Error, OrganismId, Position, Result, SimulationConfig, SystemClock,
};
use teoc_genome::{Genome, Mutator};
use tracing::{debug, info, instrument, trace, warn};

/// What happened to an organism during its move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stepped into the empty target cell
    Moved { from: Position, to: Position },
    /// Target was taken; stepped the opposite way instead
    Retreated { from: Position, to: Position },
    /// Target was taken and the organism is an extrovert
    Met(MeetOutcome),
    /// Both the target and the mirrored cell were taken
    Stayed,
}

/// Result of one organism transferring genes into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetOutcome {
    pub donor: OrganismId,
    pub recipient: OrganismId,
    pub copied: usize,
    pub mutated: usize,
    pub pandemic: bool,
    pub swapped: bool,
}

/// Running counters across all ticks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub moves: u64,
    pub retreats: u64,
    pub blocked: u64,
    pub meetings: u64,
    pub swaps: u64,
    pub genes_transferred: u64,
    pub mutations: u64,
    pub pandemic_meetings: u64,
}

pub struct Simulation {
    pub(crate) grid: Grid,
    pub(crate) organisms: SlotMap<OrganismId, Organism>,
    /// Creation order; ticks visit organisms in this order
    pub(crate) order: Vec<OrganismId>,
    mutator: Mutator,
    pub(crate) config: SimulationConfig,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,
    clock: Box<dyn Clock>,
    pub(crate) tick: u64,
    pub(crate) stats: SimulationStats,
}

impl Simulation {
    /// Build a world and populate it with `initial_population` random organisms
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let population = config.initial_population;
        let mut sim = Self::empty(config)?;

        for _ in 0..population {
            sim.create_organism()?;
        }

        info!(
            seed = sim.seed,
            width = sim.grid.width,
            height = sim.grid.height,
            population = sim.organisms.len(),
            "Simulation created"
        );
        Ok(sim)
    }

    /// Build a world with no organisms
    pub fn empty(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let seed = config.seed.unwrap_or_else(|| clock.now_secs() as u64);

        Ok(Self {
            grid: Grid::new(config.world.width, config.world.height),
            organisms: SlotMap::with_key(),
            order: Vec::new(),
            mutator: Mutator::new(config.mutation.clone(), config.wrap_mode),
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock,
            tick: 0,
            stats: SimulationStats::default(),
        })
    }

    /// Replace the clock consulted by the pandemic rule
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    pub fn organism(&self, id: OrganismId) -> Result<&Organism> {
        self.organisms
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("organism {:?}", id)))
    }

    /// Live organisms in tick order
    pub fn organisms(&self) -> impl Iterator<Item = (OrganismId, &Organism)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.organisms.get(*id).map(|org| (*id, org)))
    }

    /// Random genome, then a random empty cell, then a random face
    pub fn create_organism(&mut self) -> Result<OrganismId> {
        let genome = Genome::random(&mut self.rng)?;
        let position = self
            .grid
            .find_empty_position(&mut self.rng, self.config.max_placement_attempts)
            .map_err(|e| {
                warn!(
                    population = self.organisms.len(),
                    cells = self.grid.cell_count(),
                    "Failed to place new organism: {}",
                    e
                );
                e
            })?;
        let face = Organism::random_face(&mut self.rng);

        self.insert_organism(Organism::new(genome, position, face)?)
    }

    /// Add an organism at its recorded position, which must be empty
    pub fn insert_organism(&mut self, organism: Organism) -> Result<OrganismId> {
        let position = organism.position;
        if !self.grid.is_empty(position) {
            return Err(Error::InvalidState(format!(
                "cannot insert organism at {}: cell is occupied or outside the grid",
                position
            )));
        }

        let id = self.organisms.insert(organism);
        self.grid.place(id, position)?;
        self.order.push(id);
        trace!(organism_id = ?id, %position, "Organism created");
        Ok(id)
    }

    /// Vacate the organism's cell and drop it from the arena
    pub fn destroy_organism(&mut self, id: OrganismId) -> Result<Organism> {
        let organism = self
            .organisms
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("organism {:?}", id)))?;
        self.grid.vacate(organism.position)?;
        self.order.retain(|other| *other != id);
        trace!(organism_id = ?id, position = %organism.position, "Organism destroyed");
        Ok(organism)
    }

    pub fn color_bucket(&self, id: OrganismId) -> Result<ColorBucket> {
        self.organism(id)?.color_bucket(self.config.wrap_mode)
    }

    pub fn face_id(&self, id: OrganismId) -> Result<u8> {
        Ok(self.organism(id)?.face)
    }

    /// Step one organism along its Move gene.
    ///
    /// A blocked extrovert meets whoever is in the way. A blocked introvert
    /// tries the mirrored step and otherwise stays put. A zero Move gene
    /// targets the organism's own cell, so an extrovert then meets itself.
    pub fn move_organism(&mut self, id: OrganismId) -> Result<MoveOutcome> {
        let mode = self.config.wrap_mode;
        let (from, movement, extrovert) = {
            let organism = self.organism(id)?;
            (
                organism.position,
                organism.movement(mode)?,
                organism.is_extrovert(mode)?,
            )
        };
        let (width, height) = (self.grid.width, self.grid.height);

        let target = from.offset(movement.offset_x, movement.offset_y, width, height, mode)?;
        let other = match self.grid.occupant(target) {
            None => {
                self.relocate(id, from, target)?;
                self.stats.moves += 1;
                trace!(organism_id = ?id, %from, to = %target, "Organism moved");
                return Ok(MoveOutcome::Moved { from, to: target });
            }
            Some(other) => other,
        };

        if extrovert {
            return Ok(MoveOutcome::Met(self.meet(id, other)?));
        }

        let mirrored = from.offset(-movement.offset_x, -movement.offset_y, width, height, mode)?;
        if self.grid.is_empty(mirrored) {
            self.relocate(id, from, mirrored)?;
            self.stats.retreats += 1;
            trace!(organism_id = ?id, %from, to = %mirrored, "Organism retreated");
            return Ok(MoveOutcome::Retreated { from, to: mirrored });
        }

        self.stats.blocked += 1;
        Ok(MoveOutcome::Stayed)
    }

    /// One-way gene transfer from `donor` into `recipient`, then maybe a swap
    pub fn meet(&mut self, donor: OrganismId, recipient: OrganismId) -> Result<MeetOutcome> {
        let donor_genome = self.organism(donor)?.genome.clone();
        let target = self
            .organisms
            .get_mut(recipient)
            .ok_or_else(|| Error::NotFound(format!("organism {:?}", recipient)))?;

        let report = self.mutator.transfer(
            &donor_genome,
            &mut target.genome,
            &mut self.rng,
            self.clock.as_ref(),
        )?;
        target.record_transfer(report.copied, report.mutated.len());
        if let Some(organism) = self.organisms.get_mut(donor) {
            organism.record_meeting();
        }

        let swapped = self.mutator.should_swap(&mut self.rng);
        if swapped {
            self.swap_positions(donor, recipient)?;
        }

        self.stats.meetings += 1;
        self.stats.genes_transferred += report.copied as u64;
        self.stats.mutations += report.mutated.len() as u64;
        if swapped {
            self.stats.swaps += 1;
        }
        if report.pandemic {
            self.stats.pandemic_meetings += 1;
        }

        debug!(
            donor = ?donor,
            recipient = ?recipient,
            copied = report.copied,
            mutated = report.mutated.len(),
            pandemic = report.pandemic,
            swapped,
            tick = self.tick,
            "Organisms met"
        );

        Ok(MeetOutcome {
            donor,
            recipient,
            copied: report.copied,
            mutated: report.mutated.len(),
            pandemic: report.pandemic,
            swapped,
        })
    }

    /// Advance every organism once, in creation order
    pub fn tick(&mut self) -> Result<()> {
        let order = self.order.clone();
        for id in order {
            self.move_organism(id)?;
            if let Some(organism) = self.organisms.get_mut(id) {
                organism.tick();
            }
        }
        self.tick += 1;

        let interval = self.config.metrics_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.emit_population_metrics()?;
        }
        Ok(())
    }

    /// Run the simulation for the configured number of ticks
    #[instrument(skip(self), fields(num_ticks = self.config.num_ticks, seed = self.seed))]
    pub fn run(&mut self) -> Result<SimulationResult> {
        info!(
            "Starting simulation for {} ticks with {} organisms",
            self.config.num_ticks,
            self.organisms.len()
        );

        for _ in 0..self.config.num_ticks {
            self.tick()?;
        }

        let result = self.collect_results()?;
        info!(
            event = "run_complete",
            total_ticks = result.total_ticks,
            population = result.population,
            meetings = result.stats.meetings,
            swaps = result.stats.swaps,
            mutations = result.stats.mutations,
            pandemic_meetings = result.stats.pandemic_meetings,
            dominant = ?result.census.dominant(),
            "Simulation complete"
        );
        Ok(result)
    }

    /// Color and face tally of the live population
    pub fn census(&self) -> Result<Census> {
        let mode = self.config.wrap_mode;
        let mut census = Census::default();
        for (_, organism) in self.organisms() {
            census.record(organism.color_bucket(mode)?, organism.face);
        }
        Ok(census)
    }

    /// Verify that grid occupancy and organism positions agree
    pub fn check_invariants(&self) -> Result<()> {
        for (id, organism) in self.organisms.iter() {
            if self.grid.occupant(organism.position) != Some(id) {
                return Err(Error::InvalidState(format!(
                    "organism {:?} records {} but the cell holds {:?}",
                    id,
                    organism.position,
                    self.grid.occupant(organism.position)
                )));
            }
        }
        if self.grid.occupied_count() != self.organisms.len()
            || self.order.len() != self.organisms.len()
        {
            return Err(Error::InvalidState(format!(
                "{} occupied cells and {} ordered handles for {} organisms",
                self.grid.occupied_count(),
                self.order.len(),
                self.organisms.len()
            )));
        }
        Ok(())
    }

    fn relocate(&mut self, id: OrganismId, from: Position, to: Position) -> Result<()> {
        self.grid.relocate(id, from, to)?;
        if let Some(organism) = self.organisms.get_mut(id) {
            organism.position = to;
        }
        Ok(())
    }

    /// Exchange cells and position fields of two organisms in one step
    fn swap_positions(&mut self, a: OrganismId, b: OrganismId) -> Result<()> {
        let a_pos = self.organism(a)?.position;
        let b_pos = self.organism(b)?.position;
        self.grid.swap(a_pos, b_pos)?;
        if let Some(organism) = self.organisms.get_mut(a) {
            organism.position = b_pos;
        }
        if let Some(organism) = self.organisms.get_mut(b) {
            organism.position = a_pos;
        }
        Ok(())
    }

    fn emit_population_metrics(&self) -> Result<()> {
        let census = self.census()?;
        info!(
            event = "population_metrics",
            tick = self.tick,
            population = self.organisms.len(),
            red = census.red,
            green = census.green,
            blue = census.blue,
            white = census.white,
            meetings = self.stats.meetings,
            swaps = self.stats.swaps,
            mutations = self.stats.mutations,
            pandemic_meetings = self.stats.pandemic_meetings,
            "Population metrics snapshot"
        );
        Ok(())
    }

    fn collect_results(&self) -> Result<SimulationResult> {
        Ok(SimulationResult {
            seed: self.seed,
            total_ticks: self.tick,
            population: self.organisms.len(),
            census: self.census()?,
            stats: self.stats.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub seed: u64,
    pub total_ticks: u64,
    pub population: usize,
    pub census: Census,
    pub stats: SimulationStats,
}
