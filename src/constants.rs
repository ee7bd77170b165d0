// Physical constants (CGS)
pub const G_CGS: f64 = 6.674_30e-8; // cm³ g⁻¹ s⁻²
pub const ERG_PER_EV: f64 = 1.602_176_634e-12;
pub const AMU_G: f64 = 1.660_539_066_60e-24;
pub const CM_PER_KM: f64 = 1.0e5;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// Planet presets
pub const MARS_RADIUS_CM: f64 = 3.3895e8;
pub const MARS_MASS_G: f64 = 6.4171e26;
pub const VENUS_RADIUS_CM: f64 = 6.0518e8;
pub const VENUS_MASS_G: f64 = 4.8675e27;
pub const EARTH_RADIUS_CM: f64 = 6.371e8;
pub const EARTH_MASS_G: f64 = 5.9722e27;

// Species
pub const OXYGEN_MASS_AMU: f64 = 15.9994;
pub const CO2_MASS_AMU: f64 = 44.0095;

// Default histogram shapes
pub const DENSITY_BINS: usize = 100_001; // 0..=100_000 km
pub const ALTITUDE_BIN_CM: f64 = CM_PER_KM;
pub const EDF_BINS: usize = 1001; // 0..=10 eV
pub const EDF_BIN_EV: f64 = 0.01;

// Extra empty bins appended to snapshot histograms
pub const SNAPSHOT_MARGIN_BINS: usize = 10;
// Upper limit on snapshot histogram length; larger values are dropped
pub const SNAPSHOT_MAX_BINS: usize = 1_000_000;

// Significant digits for position dumps
pub const POSITION_PRECISION: usize = 10;
// Significant digits for every other floating point column
pub const DEFAULT_PRECISION: usize = 6;
