use crate::config::SnapshotConfig;
use crate::sim::Simulation;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use crate::stats::SnapshotHistogram;

/// Distribution Snapshot Operator
///
/// Writes altitude and speed histograms of whatever is still active when the
/// run ends. Each file holds the bin width, the bin count, then one count
/// per line.
#[derive(Debug, Clone)]
pub struct DistroSnapshotOp {
    pub name: String,
    pub config: SnapshotConfig,
}

impl DistroSnapshotOp {
    /// Create a snapshot operator from its bin widths and output paths
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            name: "DistroSnapshotOp".to_string(),
            config,
        }
    }

    /// Create a handle for the snapshot operator
    pub fn handle(config: SnapshotConfig) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(config)))
    }
}

impl SimOp for DistroSnapshotOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn after_sim(&mut self, sim: &mut Simulation) {
        let altitude = SnapshotHistogram::altitude(&sim.ensemble, sim.planet.radius_cm, self.config.altitude_bin_cm);
        if let Err(e) = altitude.write(&self.config.altitude_path) {
            sim.record_io_failure(&self.name, &self.config.altitude_path, &e);
        }

        let velocity = SnapshotHistogram::velocity(&sim.ensemble, self.config.velocity_bin_cm_s);
        if let Err(e) = velocity.write(&self.config.velocity_path) {
            sim.record_io_failure(&self.name, &self.config.velocity_path, &e);
        }
    }
}
