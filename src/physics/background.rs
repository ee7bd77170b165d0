use crate::particle::{CollisionTarget, Particle, ScatterAngle};
use crate::physics::seeded_rng;
use rand::Rng;
use rand::rngs::StdRng;
use std::f64::consts::TAU;

/// Background atmosphere the hot particles collide with.
pub trait BackgroundSpecies {
    /// Decide whether `particle` collides during the next `dt`. A `true`
    /// answer counts towards `total_collisions`.
    fn check_collision(&mut self, particle: &Particle, dt: f64) -> bool;

    /// The partner for the collision just reported.
    fn collision_target(&self) -> CollisionTarget;

    fn collision_scatter_angle(&mut self) -> ScatterAngle;

    fn total_collisions(&self) -> u64;
}

/// No background gas at all.
#[derive(Debug, Default, Clone)]
pub struct Vacuum;

impl BackgroundSpecies for Vacuum {
    fn check_collision(&mut self, _particle: &Particle, _dt: f64) -> bool {
        false
    }

    fn collision_target(&self) -> CollisionTarget {
        CollisionTarget::at_rest("none", 0.0)
    }

    fn collision_scatter_angle(&mut self) -> ScatterAngle {
        ScatterAngle { theta: 0.0, phi: 0.0 }
    }

    fn total_collisions(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone)]
pub struct ExponentialBackgroundParams {
    pub name: String,
    pub mass_amu: f64,
    pub planet_radius_cm: f64,
    /// Altitude where `reference_density_cm3` applies.
    pub reference_altitude_cm: f64,
    pub reference_density_cm3: f64,
    pub scale_height_cm: f64,
    pub cross_section_cm2: f64,
}

impl ExponentialBackgroundParams {
    /// Mars upper-atmosphere CO2 (~1e10 cm⁻³ at 135 km, 8 km scale height).
    pub fn mars_co2(planet_radius_cm: f64) -> Self {
        Self {
            name: "CO2".to_string(),
            mass_amu: crate::constants::CO2_MASS_AMU,
            planet_radius_cm,
            reference_altitude_cm: 135.0e5,
            reference_density_cm3: 1.0e10,
            scale_height_cm: 8.0e5,
            cross_section_cm2: 3.0e-15,
        }
    }
}

/// Single isothermal species with an exponential density profile, hard-sphere
/// cross section, isotropic scattering and a target at rest.
pub struct ExponentialBackground {
    params: ExponentialBackgroundParams,
    target: CollisionTarget,
    rng: StdRng,
    collisions: u64,
}

impl ExponentialBackground {
    pub fn new(params: ExponentialBackgroundParams, seed: Option<u64>) -> Self {
        let target = CollisionTarget::at_rest(&params.name, params.mass_amu);
        Self {
            params,
            target,
            rng: seeded_rng(seed),
            collisions: 0,
        }
    }

    pub fn density_at(&self, altitude_cm: f64) -> f64 {
        let p = &self.params;
        p.reference_density_cm3 * (-(altitude_cm - p.reference_altitude_cm) / p.scale_height_cm).exp()
    }

    /// Probability of at least one collision in `dt`: 1 - exp(-n σ g dt).
    pub fn collision_probability(&self, particle: &Particle, dt: f64) -> f64 {
        let altitude = particle.radius() - self.params.planet_radius_cm;
        let g = (particle.velocity - self.target.velocity).length();
        let rate = self.density_at(altitude) * self.params.cross_section_cm2 * g;
        1.0 - (-rate * dt).exp()
    }
}

impl BackgroundSpecies for ExponentialBackground {
    fn check_collision(&mut self, particle: &Particle, dt: f64) -> bool {
        let probability = self.collision_probability(particle, dt);
        let hit = self.rng.random::<f64>() < probability;
        if hit {
            self.collisions += 1;
        }
        hit
    }

    fn collision_target(&self) -> CollisionTarget {
        self.target.clone()
    }

    fn collision_scatter_angle(&mut self) -> ScatterAngle {
        let cos_theta: f64 = self.rng.random_range(-1.0..=1.0);
        ScatterAngle {
            theta: cos_theta.acos(),
            phi: self.rng.random_range(0.0..TAU),
        }
    }

    fn total_collisions(&self) -> u64 {
        self.collisions
    }
}
