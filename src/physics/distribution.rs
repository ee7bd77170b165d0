use crate::constants::ERG_PER_EV;
use crate::particle::Particle;
use crate::physics::{random_unit_vector, seeded_rng};
use rand::rngs::StdRng;

/// Source of new hot particles.
pub trait Distribution {
    /// Give `particle` its initial position and velocity.
    fn init(&mut self, particle: &mut Particle);

    /// Physical production rate (particles/s) the ensemble stands in for.
    fn global_rate(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct IsotropicSourceParams {
    /// Distance from the planet centre where particles are born (cm).
    pub source_radius_cm: f64,
    pub energy_ev: f64,
    pub global_rate: f64,
    /// Restrict birth positions to the illuminated (+x) hemisphere.
    pub day_side_only: bool,
}

/// Monoenergetic particles born on a spherical shell with isotropic velocities.
pub struct IsotropicSource {
    params: IsotropicSourceParams,
    rng: StdRng,
}

impl IsotropicSource {
    pub fn new(params: IsotropicSourceParams, seed: Option<u64>) -> Self {
        Self {
            params,
            rng: seeded_rng(seed),
        }
    }
}

impl Distribution for IsotropicSource {
    fn init(&mut self, particle: &mut Particle) {
        let mut direction = random_unit_vector(&mut self.rng);
        if self.params.day_side_only && direction.x < 0.0 {
            direction.x = -direction.x;
        }
        particle.position = direction * self.params.source_radius_cm;

        let speed = (2.0 * self.params.energy_ev * ERG_PER_EV / particle.mass_g).sqrt();
        particle.velocity = random_unit_vector(&mut self.rng) * speed;
    }

    fn global_rate(&self) -> f64 {
        self.params.global_rate
    }
}
