//! Particle lifecycle: the exit conditions checked after each motion step.
//!
//! An active particle ends in exactly one terminal fate. The checks run in a
//! fixed priority order and the first that holds wins:
//!
//! | priority | condition                                          | fate         |
//! |----------|----------------------------------------------------|--------------|
//! | 1        | r ≥ upper and v ≥ v_esc(upper), day side           | EscapedDay   |
//! | 1        | r ≥ upper and v ≥ v_esc(upper), night side         | EscapedNight |
//! | 2        | r ≤ lower                                          | Dropped      |
//! | 3        | v < v_esc(r)                                       | SubEscape    |
//!
//! `thermalized` is a separate flag laid over whichever fate a particle ends
//! in.

use crate::config::ThermalizationPolicy;
use crate::particle::Particle;
use crate::planet::Planet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    EscapedDay,
    EscapedNight,
    Dropped,
    SubEscape,
}

impl Fate {
    /// Audit text recorded with the deactivation.
    pub fn reason(&self) -> &'static str {
        match self {
            Fate::EscapedDay => "Reached upper bound with escape velocity.",
            Fate::EscapedNight => "Escaped from night side.",
            Fate::Dropped => "Dropped below lower bound.",
            Fate::SubEscape => "Velocity dropped below escape velocity.",
        }
    }
}

/// Spatial boundaries as distances from the planet centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundaries {
    pub lower_radius_cm: f64,
    pub upper_radius_cm: f64,
    /// Escape speed evaluated at the upper boundary.
    pub upper_escape_velocity: f64,
}

impl Boundaries {
    /// Bounds given as altitudes above the surface.
    pub fn new(planet: &Planet, lower_bound_cm: f64, upper_bound_cm: f64) -> Self {
        let upper_radius_cm = planet.radius_cm + upper_bound_cm;
        Self {
            lower_radius_cm: planet.radius_cm + lower_bound_cm,
            upper_radius_cm,
            upper_escape_velocity: planet.escape_velocity(upper_radius_cm),
        }
    }
}

/// The state the exit checks look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub radius_cm: f64,
    pub speed: f64,
    pub day_side: bool,
    /// Escape speed at `radius_cm`.
    pub local_escape_velocity: f64,
}

impl Kinematics {
    pub fn of(particle: &Particle, planet: &Planet) -> Self {
        let radius_cm = particle.radius();
        Self {
            radius_cm,
            speed: particle.speed(),
            day_side: particle.is_day_side(),
            local_escape_velocity: planet.escape_velocity(radius_cm),
        }
    }
}

/// Evaluate the exit checks in priority order. None means the particle
/// carries on.
pub fn classify(k: &Kinematics, bounds: &Boundaries) -> Option<Fate> {
    if k.radius_cm >= bounds.upper_radius_cm && k.speed >= bounds.upper_escape_velocity {
        Some(if k.day_side { Fate::EscapedDay } else { Fate::EscapedNight })
    } else if k.radius_cm <= bounds.lower_radius_cm {
        Some(Fate::Dropped)
    } else if k.speed < k.local_escape_velocity {
        Some(Fate::SubEscape)
    } else {
        None
    }
}

/// What the engine must do for a classified particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub fate: Fate,
    /// Leave the active set.
    pub deactivate: bool,
    /// Set the thermalized flag now (it was clear before).
    pub mark_thermalized: bool,
    /// An escape by a particle that was already thermalized.
    pub thermal_escape: bool,
}

impl Transition {
    pub fn resolve(fate: Fate, was_thermalized: bool, policy: ThermalizationPolicy) -> Self {
        match fate {
            Fate::EscapedDay | Fate::EscapedNight => Transition {
                fate,
                deactivate: true,
                mark_thermalized: false,
                thermal_escape: was_thermalized,
            },
            Fate::Dropped => Transition {
                fate,
                deactivate: true,
                mark_thermalized: false,
                thermal_escape: false,
            },
            Fate::SubEscape => Transition {
                fate,
                deactivate: policy == ThermalizationPolicy::Deactivate,
                mark_thermalized: !was_thermalized,
                thermal_escape: false,
            },
        }
    }
}

/// Run-wide lifecycle counters. Each only ever goes up, once per qualifying
/// transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FateCounters {
    pub escaped_day: usize,
    pub escaped_night: usize,
    pub thermal_escapes: usize,
    pub thermalized: usize,
    pub dropped: usize,
    /// Particles removed by the sub-escape check.
    pub sub_escape: usize,
}

impl FateCounters {
    pub fn record(&mut self, t: &Transition) {
        match t.fate {
            Fate::EscapedDay => self.escaped_day += 1,
            Fate::EscapedNight => self.escaped_night += 1,
            Fate::Dropped => self.dropped += 1,
            Fate::SubEscape => {
                if t.deactivate {
                    self.sub_escape += 1;
                }
            }
        }
        if t.thermal_escape {
            self.thermal_escapes += 1;
        }
        if t.mark_thermalized {
            self.thermalized += 1;
        }
    }

    /// Particles that reached a terminal state.
    pub fn terminal_total(&self) -> usize {
        self.escaped_day + self.escaped_night + self.dropped + self.sub_escape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Boundaries {
        Boundaries {
            lower_radius_cm: 10.0,
            upper_radius_cm: 100.0,
            upper_escape_velocity: 5.0,
        }
    }

    fn k(radius_cm: f64, speed: f64, day_side: bool, local_escape_velocity: f64) -> Kinematics {
        Kinematics {
            radius_cm,
            speed,
            day_side,
            local_escape_velocity,
        }
    }

    #[test]
    fn escape_boundary_is_inclusive() {
        assert_eq!(classify(&k(100.0, 5.0, true, 5.0), &bounds()), Some(Fate::EscapedDay));
        assert_eq!(classify(&k(100.0, 5.0, false, 5.0), &bounds()), Some(Fate::EscapedNight));
    }

    #[test]
    fn slow_particle_above_upper_bound_is_not_an_escape() {
        assert_eq!(classify(&k(150.0, 4.9, true, 4.0), &bounds()), None);
        assert_eq!(classify(&k(150.0, 3.9, true, 4.0), &bounds()), Some(Fate::SubEscape));
    }

    #[test]
    fn lower_bound_is_inclusive_and_beats_sub_escape() {
        assert_eq!(classify(&k(10.0, 0.0, true, 50.0), &bounds()), Some(Fate::Dropped));
        assert_eq!(classify(&k(9.0, 100.0, false, 50.0), &bounds()), Some(Fate::Dropped));
    }

    #[test]
    fn fast_particle_between_bounds_carries_on() {
        assert_eq!(classify(&k(50.0, 8.0, true, 7.0), &bounds()), None);
        assert_eq!(classify(&k(50.0, 7.0, true, 7.0), &bounds()), None);
    }

    #[test]
    fn at_most_one_fate_per_check() {
        // Every corner of the decision space yields zero or one fate, and the
        // counters move by at most one terminal bucket.
        for &r in &[5.0, 10.0, 50.0, 100.0, 150.0] {
            for &v in &[0.0, 4.0, 5.0, 9.0] {
                for &day in &[true, false] {
                    let mut counters = FateCounters::default();
                    if let Some(fate) = classify(&k(r, v, day, 6.0), &bounds()) {
                        counters.record(&Transition::resolve(fate, false, ThermalizationPolicy::Deactivate));
                    }
                    assert!(counters.terminal_total() <= 1);
                    assert!(counters.escaped_day + counters.escaped_night + counters.dropped <= 1);
                }
            }
        }
    }

    #[test]
    fn sub_escape_deactivates_and_marks_once() {
        let mut counters = FateCounters::default();
        let t = Transition::resolve(Fate::SubEscape, false, ThermalizationPolicy::Deactivate);
        assert!(t.deactivate);
        assert!(t.mark_thermalized);
        counters.record(&t);

        let again = Transition::resolve(Fate::SubEscape, true, ThermalizationPolicy::Deactivate);
        assert!(!again.mark_thermalized);
        counters.record(&again);

        assert_eq!(counters.thermalized, 1);
        assert_eq!(counters.sub_escape, 2);
    }

    #[test]
    fn flag_policy_keeps_the_particle_and_counts_thermal_escapes() {
        let mut counters = FateCounters::default();
        let mark = Transition::resolve(Fate::SubEscape, false, ThermalizationPolicy::Flag);
        assert!(!mark.deactivate);
        counters.record(&mark);

        let escape = Transition::resolve(Fate::EscapedNight, true, ThermalizationPolicy::Flag);
        assert!(escape.deactivate);
        assert!(escape.thermal_escape);
        counters.record(&escape);

        assert_eq!(counters.thermalized, 1);
        assert_eq!(counters.sub_escape, 0);
        assert_eq!(counters.escaped_night, 1);
        assert_eq!(counters.thermal_escapes, 1);
        assert_eq!(counters.terminal_total(), 1);
    }

    #[test]
    fn boundaries_are_offset_by_the_planet_radius() {
        let planet = Planet::new("test", 1000.0, 1.0e10);
        let b = Boundaries::new(&planet, 50.0, 200.0);
        assert_eq!(b.lower_radius_cm, 1050.0);
        assert_eq!(b.upper_radius_cm, 1200.0);
        assert_eq!(b.upper_escape_velocity, planet.escape_velocity(1200.0));
    }
}
