use crate::sim::Simulation;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use std::path::PathBuf;

/// Density Statistics Operator
///
/// Feeds the pre-motion ensemble to the stats accumulator every step. At the
/// end it normalizes the counts and writes `density1d.out` plus one
/// `EDF_<bin>km.out` per sampled altitude bin.
#[derive(Debug, Clone)]
pub struct DensityStatsOp {
    pub name: String,
    pub dir: PathBuf,
}

impl DensityStatsOp {
    /// Create a stats operator writing into `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self {
            name: "DensityStatsOp".to_string(),
            dir,
        }
    }

    /// Create a handle for the stats operator
    pub fn handle(dir: PathBuf) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(dir)))
    }
}

impl SimOp for DensityStatsOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_sim(&mut self, sim: &mut Simulation) {
        sim.stats.update(sim.ensemble.active(), sim.planet.radius_cm);
    }

    fn after_sim(&mut self, sim: &mut Simulation) {
        let report = sim.stats.finalize(
            sim.config.dt,
            sim.global_rate,
            sim.total_spawned(),
            sim.planet.radius_cm,
        );

        for (path, e) in report.emit(&self.dir) {
            sim.record_io_failure(&self.name, &path, &e);
        }

        sim.stats_report = Some(report);
    }
}
