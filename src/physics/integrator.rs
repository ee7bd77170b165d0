use crate::particle::Particle;
use glam::DVec3;

/// Equation of motion: move one particle forward by `dt` under the planet's
/// gravitational parameter `k_g` (G·M).
pub trait Integrator {
    fn advance(&self, particle: &mut Particle, dt: f64, k_g: f64);
}

/// Kick-drift-kick velocity Verlet under a point-mass planet.
#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn advance(&self, particle: &mut Particle, dt: f64, k_g: f64) {
        let a0 = gravity(particle.position, k_g);
        particle.position += particle.velocity * dt + 0.5 * a0 * dt * dt;
        let a1 = gravity(particle.position, k_g);
        particle.velocity += 0.5 * (a0 + a1) * dt;
    }
}

fn gravity(position: DVec3, k_g: f64) -> DVec3 {
    let r2 = position.length_squared();
    if r2 == 0.0 {
        return DVec3::ZERO;
    }
    -k_g * position / (r2 * r2.sqrt())
}
