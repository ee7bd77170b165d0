use crate::constants::{ALTITUDE_BIN_CM, CM_PER_KM, DENSITY_BINS, EDF_BINS, EDF_BIN_EV, OXYGEN_MASS_AMU};
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What happens to a particle whose speed falls below local escape velocity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThermalizationPolicy {
    /// Mark thermalized and remove it from the ensemble.
    #[default]
    Deactivate,
    /// Mark thermalized and keep tracking it; a later escape counts as a
    /// thermal escape.
    Flag,
}

/// Shapes of the accumulated histograms. Fixed for the whole run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    /// Number of altitude bins in the density profile.
    pub density_bins: usize,
    /// Altitude bin width (cm). Also the unit of
    /// [`SimulationConfig::edf_altitudes_km`].
    pub altitude_bin_cm: f64,
    pub edf_bins: usize,
    pub edf_bin_ev: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            density_bins: DENSITY_BINS,
            altitude_bin_cm: ALTITUDE_BIN_CM,
            edf_bins: EDF_BINS,
            edf_bin_ev: EDF_BIN_EV,
        }
    }
}

/// End-of-run altitude/velocity snapshot histograms.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SnapshotConfig {
    pub altitude_bin_cm: f64,
    pub velocity_bin_cm_s: f64,
    pub altitude_path: PathBuf,
    pub velocity_path: PathBuf,
}

/// Parameters handed to the engine by whatever drives a run.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub num_particles: usize,
    pub num_traced: usize,
    pub particle_mass_amu: f64,
    /// RNG seed for trace selection; None draws one from the thread RNG.
    pub seed: Option<u64>,

    pub dt: f64,
    pub num_steps: usize,
    /// Boundaries measured from the planet surface (cm).
    pub lower_bound_cm: f64,
    pub upper_bound_cm: f64,

    /// Status line every N steps (0 = never).
    pub print_status_freq: usize,
    /// Full position dump every N steps (0 = never).
    pub output_pos_freq: usize,
    pub output_pos_dir: PathBuf,
    pub output_stats_dir: PathBuf,
    pub trace_dir: PathBuf,

    pub thermalization: ThermalizationPolicy,
    pub stats: StatsConfig,
    /// Altitude bins that get an energy distribution. Each value is an index
    /// in units of `stats.altitude_bin_cm`, so it reads as km only with the
    /// default 1 km bins; the `EDF_<n>km.out` file names carry the index.
    pub edf_altitudes_km: Vec<usize>,
    pub snapshot: Option<SnapshotConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_particles: 1000,
            num_traced: 0,
            particle_mass_amu: OXYGEN_MASS_AMU,
            seed: None,
            dt: 0.1,
            num_steps: 100_000,
            lower_bound_cm: 135.0 * CM_PER_KM,
            upper_bound_cm: 900.0 * CM_PER_KM,
            print_status_freq: 1000,
            output_pos_freq: 0,
            output_pos_dir: PathBuf::from("."),
            output_stats_dir: PathBuf::from("."),
            trace_dir: PathBuf::from("."),
            thermalization: ThermalizationPolicy::default(),
            stats: StatsConfig::default(),
            edf_altitudes_km: vec![200, 400, 600, 800],
            snapshot: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(invalid("dt must be finite and > 0"));
        }
        if self.num_traced > self.num_particles {
            return Err(invalid(format!(
                "num_traced ({}) exceeds num_particles ({})",
                self.num_traced, self.num_particles
            )));
        }
        if !self.particle_mass_amu.is_finite() || self.particle_mass_amu <= 0.0 {
            return Err(invalid("particle_mass_amu must be finite and > 0"));
        }
        if !self.lower_bound_cm.is_finite()
            || !self.upper_bound_cm.is_finite()
            || self.upper_bound_cm <= self.lower_bound_cm
        {
            return Err(invalid("upper_bound_cm must be finite and above lower_bound_cm"));
        }
        let stats = &self.stats;
        if stats.density_bins == 0 || stats.edf_bins == 0 {
            return Err(invalid("histograms need at least one bin"));
        }
        if !(stats.altitude_bin_cm > 0.0) || !(stats.edf_bin_ev > 0.0) {
            return Err(invalid("histogram bin widths must be > 0"));
        }
        if let Some(snapshot) = &self.snapshot {
            if !(snapshot.altitude_bin_cm > 0.0) || !(snapshot.velocity_bin_cm_s > 0.0) {
                return Err(invalid("snapshot bin widths must be > 0"));
            }
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> SimError {
    SimError::InvalidConfig(msg.into())
}
