use crate::constants::{DEFAULT_PRECISION, SNAPSHOT_MARGIN_BINS, SNAPSHOT_MAX_BINS};
use crate::ensemble::Ensemble;
use crate::output::{format_g, write_lines};
use std::path::Path;

/// Histogram of the current ensemble, rebuilt from scratch on every call.
///
/// Sized to the largest observed value plus a few empty bins, capped at
/// [`SNAPSHOT_MAX_BINS`]; values past the last bin (or non-finite) are
/// dropped. Written as bin width, bin count, then one count per line.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotHistogram {
    pub bin_width: f64,
    pub counts: Vec<u64>,
}

impl SnapshotHistogram {
    /// Altitudes (cm above the surface) of the active particles.
    pub fn altitude(ensemble: &Ensemble, planet_radius_cm: f64, bin_width_cm: f64) -> Self {
        let altitudes = ensemble.active().map(|p| p.radius() - planet_radius_cm);
        Self::from_values(altitudes.collect(), bin_width_cm)
    }

    /// Speeds (cm/s) of the active particles.
    pub fn velocity(ensemble: &Ensemble, bin_width_cm_s: f64) -> Self {
        let speeds = ensemble.active().map(|p| p.speed());
        Self::from_values(speeds.collect(), bin_width_cm_s)
    }

    fn from_values(values: Vec<f64>, bin_width: f64) -> Self {
        let max = values.iter().copied().filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
        let num_bins = ((max / bin_width) as usize)
            .saturating_add(SNAPSHOT_MARGIN_BINS)
            .min(SNAPSHOT_MAX_BINS);
        let mut counts = vec![0u64; num_bins];

        for value in values {
            let bin = (value / bin_width).trunc();
            if bin >= 0.0 && bin < num_bins as f64 {
                counts[bin as usize] += 1;
            }
        }

        Self { bin_width, counts }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.counts.len() + 2);
        lines.push(format!("{}\n", format_g(self.bin_width, DEFAULT_PRECISION)));
        lines.push(format!("{}\n", self.counts.len()));
        lines.extend(self.counts.iter().map(|c| format!("{}\n", c)));
        lines
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        write_lines(path, self.lines())
    }
}
