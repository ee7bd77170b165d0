use crate::constants::{AMU_G, CM_PER_KM, DEFAULT_PRECISION, ERG_PER_EV};
use crate::output::{format_g, write_lines};
use glam::DVec3;
use std::path::Path;

/// Background particle a test particle scatters off.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionTarget {
    pub name: String,
    pub mass_g: f64,
    pub velocity: DVec3,
}

impl CollisionTarget {
    /// Target at rest in the planet frame.
    pub fn at_rest(name: &str, mass_amu: f64) -> Self {
        Self {
            name: name.to_string(),
            mass_g: mass_amu * AMU_G,
            velocity: DVec3::ZERO,
        }
    }
}

/// Centre-of-mass scattering angles (radians): polar `theta`, azimuth `phi`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterAngle {
    pub theta: f64,
    pub phi: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    pub time: f64,
    pub target: String,
    pub theta: f64,
    pub altitude_cm: f64,
    pub energy_before_ev: f64,
    pub energy_after_ev: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deactivation {
    pub time: f64,
    pub reason: String,
}

/// One hot test particle. Position and velocity are planet-centred (cm, cm/s).
///
/// Lifecycle flags only ever move one way: `active` goes false once,
/// `thermalized` and `traced` go true once.
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass_g: f64,
    active: bool,
    thermalized: bool,
    traced: bool,
    collisions: Vec<CollisionEvent>,
    deactivation: Option<Deactivation>,
}

impl Particle {
    pub fn new(mass_g: f64) -> Particle {
        Particle {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass_g,
            active: true,
            thermalized: false,
            traced: false,
            collisions: Vec::new(),
            deactivation: None,
        }
    }

    pub fn with_mass_amu(mass_amu: f64) -> Particle {
        Particle::new(mass_amu * AMU_G)
    }

    pub fn with_state(mut self, position: DVec3, velocity: DVec3) -> Particle {
        self.position = position;
        self.velocity = velocity;
        self
    }

    /// Distance from the planet centre.
    pub fn radius(&self) -> f64 {
        self.position.length()
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn kinetic_energy_erg(&self) -> f64 {
        0.5 * self.mass_g * self.velocity.length_squared()
    }

    pub fn kinetic_energy_ev(&self) -> f64 {
        self.kinetic_energy_erg() / ERG_PER_EV
    }

    /// Illuminated hemisphere: the sun sits on the +x axis.
    pub fn is_day_side(&self) -> bool {
        self.position.x > 0.0
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_thermalized(&self) -> bool {
        self.thermalized
    }

    pub fn is_traced(&self) -> bool {
        self.traced
    }

    pub fn set_thermalized(&mut self) {
        self.thermalized = true;
    }

    pub fn set_traced(&mut self) {
        self.traced = true;
    }

    /// Only the ensemble deactivates, so its active count stays exact.
    pub(crate) fn deactivate(&mut self, time: f64, reason: &str) {
        if !self.active {
            return;
        }
        self.active = false;
        self.deactivation = Some(Deactivation {
            time,
            reason: reason.to_string(),
        });
    }

    pub fn deactivation(&self) -> Option<&Deactivation> {
        self.deactivation.as_ref()
    }

    pub fn collisions(&self) -> &[CollisionEvent] {
        &self.collisions
    }

    /// Elastic two-body scatter in the centre-of-mass frame.
    ///
    /// The relative velocity keeps its magnitude and is turned by
    /// `scatter.theta` about its old direction, at azimuth `scatter.phi`.
    pub fn apply_collision(
        &mut self,
        target: &CollisionTarget,
        scatter: ScatterAngle,
        event_time: f64,
        planet_radius_cm: f64,
    ) {
        let energy_before_ev = self.kinetic_energy_ev();

        let m1 = self.mass_g;
        let m2 = target.mass_g;
        let total = m1 + m2;
        let v_cm = (m1 * self.velocity + m2 * target.velocity) / total;
        let relative = self.velocity - target.velocity;
        let g = relative.length();

        if g > 0.0 && total > 0.0 {
            let axis = relative / g;
            let (e1, e2) = axis.any_orthonormal_pair();
            let (sin_t, cos_t) = scatter.theta.sin_cos();
            let (sin_p, cos_p) = scatter.phi.sin_cos();
            let turned = g * (cos_t * axis + sin_t * cos_p * e1 + sin_t * sin_p * e2);
            self.velocity = v_cm + (m2 / total) * turned;
        }

        self.collisions.push(CollisionEvent {
            time: event_time,
            target: target.name.clone(),
            theta: scatter.theta,
            altitude_cm: self.radius() - planet_radius_cm,
            energy_before_ev,
            energy_after_ev: self.kinetic_energy_ev(),
        });
    }

    /// Write the collision history (and deactivation reason, if any) to `path`.
    pub fn dump_collision_log(&self, path: &Path) -> std::io::Result<()> {
        let p = DEFAULT_PRECISION;
        let header = "#time[s]\t\ttarget\ttheta[rad]\talt[km]\tE_before[eV]\tE_after[eV]\n".to_string();
        let events = self.collisions.iter().map(|event| {
            format!(
                "{}\t\t{}\t{}\t{}\t{}\t{}\n",
                format_g(event.time, p),
                event.target,
                format_g(event.theta, p),
                format_g(event.altitude_cm / CM_PER_KM, p),
                format_g(event.energy_before_ev, p),
                format_g(event.energy_after_ev, p)
            )
        });
        let footer = self
            .deactivation
            .iter()
            .map(|d| format!("{}\t\t{}\n\n", format_g(d.time, p), d.reason));

        write_lines(path, std::iter::once(header).chain(events).chain(footer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::OXYGEN_MASS_AMU;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn oxygen(velocity: DVec3) -> Particle {
        Particle::with_mass_amu(OXYGEN_MASS_AMU).with_state(DVec3::new(4.0e8, 0.0, 0.0), velocity)
    }

    #[test]
    fn new_particle_is_active_and_unflagged() {
        let p = Particle::new(1.0);
        assert!(p.is_active());
        assert!(!p.is_thermalized());
        assert!(!p.is_traced());
        assert!(p.collisions().is_empty());
    }

    #[test]
    fn deactivation_is_one_way() {
        let mut p = Particle::new(1.0);
        p.deactivate(2.0, "first");
        p.deactivate(3.0, "second");
        assert!(!p.is_active());
        let d = p.deactivation().unwrap();
        assert_eq!(d.reason, "first");
        assert_eq!(d.time, 2.0);
    }

    #[test]
    fn day_side_is_positive_x() {
        let day = Particle::new(1.0).with_state(DVec3::new(1.0, -5.0, 0.0), DVec3::ZERO);
        let night = Particle::new(1.0).with_state(DVec3::new(-1.0, 5.0, 0.0), DVec3::ZERO);
        let terminator = Particle::new(1.0).with_state(DVec3::new(0.0, 5.0, 0.0), DVec3::ZERO);
        assert!(day.is_day_side());
        assert!(!night.is_day_side());
        assert!(!terminator.is_day_side());
    }

    #[test]
    fn kinetic_energy_in_ev() {
        // 1 eV oxygen atom moves at ~3.47 km/s
        let speed = (2.0 * ERG_PER_EV / (OXYGEN_MASS_AMU * AMU_G)).sqrt();
        let p = oxygen(DVec3::new(0.0, speed, 0.0));
        assert_relative_eq!(p.kinetic_energy_ev(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn head_on_collision_with_equal_mass_stops_the_particle() {
        let mut p = oxygen(DVec3::new(3.0e5, 0.0, 0.0));
        let target = CollisionTarget::at_rest("O", OXYGEN_MASS_AMU);
        p.apply_collision(&target, ScatterAngle { theta: PI, phi: 0.0 }, 1.5, 3.4e8);

        assert!(p.speed() < 1e-6);
        assert_eq!(p.collisions().len(), 1);
        let event = &p.collisions()[0];
        assert_eq!(event.time, 1.5);
        assert_eq!(event.target, "O");
        assert_relative_eq!(event.altitude_cm, 6.0e7, max_relative = 1e-12);
        assert!(event.energy_after_ev < 1e-9);
    }

    #[test]
    fn collision_conserves_energy_against_a_resting_target() {
        let mut p = oxygen(DVec3::new(2.0e5, 1.0e5, -3.0e4));
        let target = CollisionTarget::at_rest("CO2", 44.0);
        let before = p.kinetic_energy_erg();
        p.apply_collision(&target, ScatterAngle { theta: 0.7, phi: 2.1 }, 0.0, 3.4e8);

        let m1 = p.mass_g;
        let m2 = target.mass_g;
        // Recover the target recoil from momentum conservation.
        let recoil = (m1 * DVec3::new(2.0e5, 1.0e5, -3.0e4) - m1 * p.velocity) / m2;
        let after = p.kinetic_energy_erg() + 0.5 * m2 * recoil.length_squared();
        assert_relative_eq!(after, before, max_relative = 1e-9);
        assert!(p.kinetic_energy_erg() < before);
    }

    #[test]
    fn zero_angle_scatter_leaves_velocity_unchanged() {
        let v = DVec3::new(1.0e5, 2.0e5, 3.0e5);
        let mut p = oxygen(v);
        p.apply_collision(
            &CollisionTarget::at_rest("O", OXYGEN_MASS_AMU),
            ScatterAngle { theta: 0.0, phi: 1.0 },
            0.0,
            0.0,
        );
        assert_relative_eq!((p.velocity - v).length(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn collision_log_dump_lists_events_and_reason() {
        let dir = std::env::temp_dir().join(format!("exo_escape_particle_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("log.out");

        let mut p = oxygen(DVec3::new(3.0e5, 0.0, 0.0));
        let target = CollisionTarget::at_rest("O", OXYGEN_MASS_AMU);
        p.apply_collision(&target, ScatterAngle { theta: 1.0, phi: 0.0 }, 10.0, 3.4e8);
        p.apply_collision(&target, ScatterAngle { theta: 0.5, phi: 0.0 }, 20.0, 3.4e8);
        p.deactivate(25.0, "Dropped below lower bound.");
        p.dump_collision_log(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert!(lines[1].starts_with("10\t\tO\t1\t600\t"));
        assert!(lines[2].starts_with("20\t\tO\t0.5\t600\t"));
        assert_eq!(lines[3], "25\t\tDropped below lower bound.");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
