use crate::constants::{
    EARTH_MASS_G, EARTH_RADIUS_CM, G_CGS, MARS_MASS_G, MARS_RADIUS_CM, VENUS_MASS_G,
    VENUS_RADIUS_CM,
};
use serde::{Deserialize, Serialize};

/// Gravitating body the exosphere sits on. Radius in cm, mass in g.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Planet {
    pub name: String,
    pub radius_cm: f64,
    pub mass_g: f64,
}

impl Planet {
    pub fn new(name: &str, radius_cm: f64, mass_g: f64) -> Planet {
        Planet {
            name: name.to_string(),
            radius_cm,
            mass_g,
        }
    }

    pub fn mars() -> Planet {
        Planet::new("Mars", MARS_RADIUS_CM, MARS_MASS_G)
    }

    pub fn venus() -> Planet {
        Planet::new("Venus", VENUS_RADIUS_CM, VENUS_MASS_G)
    }

    pub fn earth() -> Planet {
        Planet::new("Earth", EARTH_RADIUS_CM, EARTH_MASS_G)
    }

    /// Gravitational parameter G·M.
    pub fn k_g(&self) -> f64 {
        G_CGS * self.mass_g
    }

    /// Escape speed at distance `radius_cm` from the planet centre.
    /// Infinite at the centre, so nothing there counts as escaping.
    pub fn escape_velocity(&self, radius_cm: f64) -> f64 {
        (2.0 * self.k_g() / radius_cm).sqrt()
    }
}
