//! Collaborators the transport engine drives but does not own the physics of:
//! the equation of motion, the background gas, and the particle source.
//!
//! The engine talks to each through a narrow trait. The implementations here
//! are small reference models so a run works end to end.

pub mod background;
pub mod distribution;
pub mod integrator;

pub use background::{BackgroundSpecies, ExponentialBackground, ExponentialBackgroundParams, Vacuum};
pub use distribution::{Distribution, IsotropicSource, IsotropicSourceParams};
pub use integrator::{Integrator, VelocityVerlet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use glam::DVec3;

/// Seeded RNG, or one seeded from the thread RNG when `seed` is None.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::seed_from_u64(rand::rng().random()),
    }
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.random_range(-1.0..=1.0);
    let phi: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let s = (1.0 - z * z).max(0.0).sqrt();
    DVec3::new(s * phi.cos(), s * phi.sin(), z)
}
