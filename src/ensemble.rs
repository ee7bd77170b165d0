use crate::error::{Result, SimError};
use crate::output::{position_line, write_lines};
use crate::particle::Particle;
use crate::physics::Distribution;
use rand::Rng;
use std::path::Path;

/// Fixed-size arena of test particles.
///
/// `active_count` always equals the number of particles whose `active` flag
/// is set. It is kept in step by [`Ensemble::deactivate`], the only way a
/// particle leaves the active set.
#[derive(Debug, Clone)]
pub struct Ensemble {
    particles: Vec<Particle>,
    active_count: usize,
    traced: Vec<usize>,
}

impl Ensemble {
    /// Seed every particle in `pool` through `distribution` and pick
    /// `num_traced` trace particles by independent uniform draws (repeats
    /// allowed).
    pub fn new<R: Rng + ?Sized>(
        mut pool: Vec<Particle>,
        num_traced: usize,
        distribution: &mut dyn Distribution,
        rng: &mut R,
    ) -> Result<Ensemble> {
        if num_traced > pool.len() {
            return Err(SimError::InvalidConfig(format!(
                "cannot trace {} particles out of {}",
                num_traced,
                pool.len()
            )));
        }

        for particle in pool.iter_mut() {
            distribution.init(particle);
        }

        let mut traced = Vec::with_capacity(num_traced);
        for _ in 0..num_traced {
            let index = rng.random_range(0..pool.len());
            pool[index].set_traced();
            traced.push(index);
        }

        let active_count = pool.iter().filter(|p| p.is_active()).count();
        Ok(Ensemble {
            particles: pool,
            active_count,
            traced,
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Full rescan of the active flags; for checks outside the step loop.
    pub fn recount_active(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn particle_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    pub fn active(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_active())
    }

    /// Trace indices in draw order, duplicates included.
    pub fn traced_indices(&self) -> &[usize] {
        &self.traced
    }

    /// Take particle `index` out of the active set. Returns false (and
    /// changes nothing) if it was already inactive.
    pub fn deactivate(&mut self, index: usize, time: f64, reason: &str) -> bool {
        let particle = &mut self.particles[index];
        if !particle.is_active() {
            return false;
        }
        particle.deactivate(time, reason);
        self.active_count -= 1;
        true
    }

    /// One `x\ty\tz` line per particle, active or not.
    pub fn write_positions(&self, path: &Path) -> std::io::Result<()> {
        write_lines(path, self.particles.iter().map(|p| position_line(p.position)))
    }
}
