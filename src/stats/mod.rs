pub mod snapshot;

pub use snapshot::SnapshotHistogram;

use crate::config::StatsConfig;
use crate::constants::DEFAULT_PRECISION;
use crate::output::{format_g, write_lines};
use crate::particle::Particle;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

/// Energy histogram pinned to one altitude bin.
#[derive(Debug, Clone, PartialEq)]
pub struct EdfHistogram {
    /// Index into the altitude bins; km only with the default 1 km bin width.
    pub altitude_bin: usize,
    pub counts: Vec<u64>,
}

impl EdfHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Running day-side statistics: an altitude density profile plus energy
/// histograms at selected altitudes. Shapes come from [`StatsConfig`] and
/// never change during a run; out-of-range samples are dropped silently.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    config: StatsConfig,
    density_counts: Vec<u64>,
    edfs: Vec<EdfHistogram>,
}

impl StatsAccumulator {
    /// One energy histogram per entry of `edf_altitude_bins`.
    pub fn new(config: &StatsConfig, edf_altitude_bins: &[usize]) -> Self {
        let edfs = edf_altitude_bins
            .iter()
            .map(|&altitude_bin| EdfHistogram {
                altitude_bin,
                counts: vec![0; config.edf_bins],
            })
            .collect();

        Self {
            config: config.clone(),
            density_counts: vec![0; config.density_bins],
            edfs,
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn density_counts(&self) -> &[u64] {
        &self.density_counts
    }

    pub fn edfs(&self) -> &[EdfHistogram] {
        &self.edfs
    }

    /// Add one sample per active day-side particle.
    pub fn update<'a, I>(&mut self, particles: I, planet_radius_cm: f64)
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        for particle in particles {
            if !particle.is_active() || !particle.is_day_side() {
                continue;
            }

            let altitude = particle.radius() - planet_radius_cm;
            let Some(alt_bin) = bin_index(altitude, self.config.altitude_bin_cm, usize::MAX) else {
                continue;
            };
            if let Some(count) = self.density_counts.get_mut(alt_bin) {
                *count += 1;
            }

            // EDF altitudes may sit past the end of the density profile
            for edf in self.edfs.iter_mut().filter(|edf| edf.altitude_bin == alt_bin) {
                let energy_ev = particle.kinetic_energy_ev();
                if let Some(e_bin) = bin_index(energy_ev, self.config.edf_bin_ev, edf.counts.len()) {
                    edf.counts[e_bin] += 1;
                }
            }
        }
    }

    /// Turn raw counts into physical densities.
    ///
    /// Each sample stands for `dt · (global_rate / 2) / total_spawned`
    /// particles on the day side, spread over the day-side half of a
    /// spherical shell one altitude bin thick.
    pub fn finalize(&self, dt: f64, global_rate: f64, total_spawned: usize, planet_radius_cm: f64) -> StatsReport {
        let width = self.config.altitude_bin_cm;
        let weight = if total_spawned > 0 {
            dt * (global_rate / 2.0) / total_spawned as f64
        } else {
            0.0
        };
        let shell = |bin: usize| half_shell_volume(planet_radius_cm + width * bin as f64, width);

        let density = self
            .density_counts
            .iter()
            .enumerate()
            .map(|(i, &count)| weight * count as f64 / shell(i))
            .collect();

        let edfs = self
            .edfs
            .iter()
            .map(|edf| {
                let sum = edf.total();
                let density_cm3 = weight * sum as f64 / shell(edf.altitude_bin);
                let values = edf
                    .counts
                    .iter()
                    .map(|&count| {
                        let probability = if sum > 0 { count as f64 / sum as f64 } else { 0.0 };
                        probability * (density_cm3 / self.config.edf_bin_ev)
                    })
                    .collect();
                EnergyDistribution {
                    altitude_bin: edf.altitude_bin,
                    bin_ev: self.config.edf_bin_ev,
                    density_cm3,
                    values,
                }
            })
            .collect();

        StatsReport { density, edfs }
    }
}

/// Truncate `value / width` toward zero; None outside `0..len` (or NaN).
fn bin_index(value: f64, width: f64, len: usize) -> Option<usize> {
    let bin = (value / width).trunc();
    if bin >= 0.0 && bin < len as f64 {
        Some(bin as usize)
    } else {
        None
    }
}

/// Volume of the half shell between `r_inner` and `r_inner + width`.
pub fn half_shell_volume(r_inner: f64, width: f64) -> f64 {
    2.0 * PI / 3.0 * ((r_inner + width).powi(3) - r_inner.powi(3))
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyDistribution {
    pub altitude_bin: usize,
    pub bin_ev: f64,
    /// Number density at this altitude (cm⁻³).
    pub density_cm3: f64,
    /// Distribution per energy bin (cm⁻³ eV⁻¹).
    pub values: Vec<f64>,
}

impl EnergyDistribution {
    /// `EDF_<bin>km.out`; the name says km whatever the bin width is.
    pub fn file_name(&self) -> String {
        format!("EDF_{}km.out", self.altitude_bin)
    }
}

/// Normalized output of a run's statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    /// Density per altitude bin (cm⁻³).
    pub density: Vec<f64>,
    pub edfs: Vec<EnergyDistribution>,
}

impl StatsReport {
    pub fn write_density(&self, path: &Path) -> std::io::Result<()> {
        let header = std::iter::once("#alt[km]\tdensity[cm-3]\n".to_string());
        let rows = self
            .density
            .iter()
            .enumerate()
            .map(|(i, &d)| format!("{}\t\t{}\n", i, format_g(d, DEFAULT_PRECISION)));
        write_lines(path, header.chain(rows))
    }

    pub fn write_edf(&self, edf: &EnergyDistribution, path: &Path) -> std::io::Result<()> {
        let header = std::iter::once("#energy[eV]\tdistribution[cm-3 eV-1]\n".to_string());
        let rows = edf.values.iter().enumerate().map(|(j, &value)| {
            format!(
                "{}\t\t{}\n",
                format_g(j as f64 * edf.bin_ev, DEFAULT_PRECISION),
                format_g(value, DEFAULT_PRECISION)
            )
        });
        write_lines(path, header.chain(rows))
    }

    /// Write `density1d.out` and every `EDF_<bin>km.out` into `dir`. Keeps
    /// going past a failed file; returns every path that could not be written.
    pub fn emit(&self, dir: &Path) -> Vec<(PathBuf, std::io::Error)> {
        let mut failures = Vec::new();
        let path = dir.join("density1d.out");
        if let Err(e) = self.write_density(&path) {
            failures.push((path, e));
        }
        for edf in &self.edfs {
            let path = dir.join(edf.file_name());
            if let Err(e) = self.write_edf(edf, &path) {
                failures.push((path, e));
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AMU_G, ERG_PER_EV};
    use approx::assert_relative_eq;
    use glam::DVec3;

    const R: f64 = 1000.0;

    fn small_config() -> StatsConfig {
        StatsConfig {
            density_bins: 10,
            altitude_bin_cm: 100.0,
            edf_bins: 11,
            edf_bin_ev: 0.5,
        }
    }

    fn accumulator() -> StatsAccumulator {
        StatsAccumulator::new(&small_config(), &[2, 7])
    }

    /// Particle at `altitude` on the given side with kinetic energy `energy_ev`.
    fn particle(altitude: f64, day: bool, energy_ev: f64) -> Particle {
        let mass_g = AMU_G;
        let speed = (2.0 * energy_ev * ERG_PER_EV / mass_g).sqrt();
        let x = if day { R + altitude } else { -(R + altitude) };
        Particle::new(mass_g).with_state(DVec3::new(x, 0.0, 0.0), DVec3::new(0.0, speed, 0.0))
    }

    #[test]
    fn histograms_are_sized_from_config() {
        let stats = accumulator();
        assert_eq!(stats.density_counts().len(), 10);
        assert_eq!(stats.edfs().len(), 2);
        assert!(stats.edfs().iter().all(|e| e.counts.len() == 11));
    }

    #[test]
    fn day_side_particles_land_in_truncated_bins() {
        let mut stats = accumulator();
        let ps = vec![particle(0.0, true, 1.0), particle(250.0, true, 1.0), particle(299.9, true, 1.0)];
        stats.update(&ps, R);
        assert_eq!(stats.density_counts()[0], 1);
        assert_eq!(stats.density_counts()[2], 2);
    }

    #[test]
    fn night_side_and_out_of_range_samples_are_dropped() {
        let mut stats = accumulator();
        let ps = vec![
            particle(250.0, false, 1.0),
            particle(1000.0, true, 1.0),
            particle(-150.0, true, 1.0),
            particle(250.0, true, 6.0),
        ];
        stats.update(&ps, R);
        // only the last one lands in the profile; its energy is past the EDF span
        assert_eq!(stats.density_counts().iter().sum::<u64>(), 1);
        assert_eq!(stats.edfs()[0].total(), 0);
    }

    #[test]
    fn inactive_particles_are_ignored() {
        let mut stats = accumulator();
        let mut p = particle(250.0, true, 1.0);
        p.deactivate(0.0, "gone");
        stats.update(std::iter::once(&p), R);
        assert_eq!(stats.density_counts().iter().sum::<u64>(), 0);
    }

    #[test]
    fn edf_samples_only_at_configured_altitudes() {
        let mut stats = accumulator();
        let ps = vec![particle(250.0, true, 1.2), particle(780.0, true, 3.1),particle(450.0, true, 1.0)];
        stats.update(&ps, R);
        assert_eq!(stats.edfs()[0].counts[2], 1);
        assert_eq!(stats.edfs()[1].counts[6], 1);
        assert_eq!(stats.edfs()[0].total() + stats.edfs()[1].total(), 2);
    }

    #[test]
    fn edf_altitudes_past_the_density_profile_still_sample() {
        let config = StatsConfig {
            density_bins: 5,
            ..small_config()
        };
        let mut stats = StatsAccumulator::new(&config, &[7]);
        stats.update(&vec![particle(750.0, true, 1.2)], R);

        assert_eq!(stats.density_counts().iter().sum::<u64>(), 0);
        assert_eq!(stats.edfs()[0].total(), 1);
        assert_eq!(stats.edfs()[0].counts[2], 1);

        let report = stats.finalize(1.0, 1.0, 1, R);
        assert!(report.edfs[0].density_cm3 > 0.0);
    }

    #[test]
    fn density_normalizes_against_half_shell_volume() {
        let mut stats = accumulator();
        let ps = vec![particle(350.0, true, 1.0); 4];
        stats.update(&ps, R);
        let report = stats.finalize(2.0, 1000.0, 8, R);

        let volume = 2.0 * PI / 3.0 * (1400.0_f64.powi(3) - 1300.0_f64.powi(3));
        let expected = 2.0 * 500.0 / 8.0 * 4.0 / volume;
        assert_relative_eq!(report.density[3], expected, max_relative = 1e-12);
        assert_eq!(report.density[0], 0.0);
        assert_eq!(report.density.len(), 10);
    }

    #[test]
    fn edf_integrates_to_the_local_density() {
        let mut stats = accumulator();
        let ps = vec![particle(720.0, true, 0.7), particle(720.0, true, 2.1), particle(760.0, true, 2.2)];
        stats.update(&ps, R);
        let report = stats.finalize(1.0, 600.0, 3, R);

        let edf = &report.edfs[1];
        assert_eq!(edf.altitude_bin, 7);
        assert_relative_eq!(edf.density_cm3, report.density[7], max_relative = 1e-12);
        let integral: f64 = edf.values.iter().map(|v| v * edf.bin_ev).sum();
        assert_relative_eq!(integral, edf.density_cm3, max_relative = 1e-12);
    }

    #[test]
    fn empty_edf_normalizes_to_zeros() {
        let stats = accumulator();
        let report = stats.finalize(1.0, 1.0e25, 100, R);
        for edf in &report.edfs {
            assert!(edf.values.iter().all(|v| *v == 0.0));
            assert_eq!(edf.density_cm3, 0.0);
        }
    }

    #[test]
    fn zero_spawned_particles_give_zero_density() {
        let stats = accumulator();
        let report = stats.finalize(1.0, 1.0e25, 0, R);
        assert!(report.density.iter().all(|d| d.is_finite() && *d == 0.0));
    }

    #[test]
    fn emitted_files_follow_the_column_layout() {
        let dir = std::env::temp_dir().join(format!("exo_escape_stats_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut stats = accumulator();
        stats.update(&vec![particle(250.0, true, 1.2)], R);
        assert!(stats.finalize(1.0, 1.0, 1, R).emit(&dir).is_empty());

        let density = std::fs::read_to_string(dir.join("density1d.out")).unwrap();
        let lines: Vec<&str> = density.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "#alt[km]\tdensity[cm-3]");
        assert_eq!(lines[1], "0\t\t0");
        assert!(lines[3].starts_with("2\t\t"));

        let edf = std::fs::read_to_string(dir.join("EDF_2km.out")).unwrap();
        let lines: Vec<&str> = edf.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "#energy[eV]\tdistribution[cm-3 eV-1]");
        assert_eq!(lines[1], "0\t\t0");
        assert!(lines[2].starts_with("0.5\t\t"));
        assert!(lines[3].starts_with("1\t\t"));
        assert!(!edf.contains("nan") && !edf.contains("inf"));

        let empty = std::fs::read_to_string(dir.join("EDF_7km.out")).unwrap();
        assert!(empty.lines().skip(1).all(|l| l.ends_with("\t\t0")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn emit_reports_a_missing_directory() {
        let stats = accumulator();
        let report = stats.finalize(1.0, 1.0, 1, R);
        let failures = report.emit(Path::new("/definitely/not/a/dir"));
        assert_eq!(failures.len(), 3);
        assert!(failures[0].0.ends_with("density1d.out"));
    }
}
