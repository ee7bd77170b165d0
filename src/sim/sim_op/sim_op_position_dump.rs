use crate::sim::Simulation;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use std::path::PathBuf;

/// Position Dump Operator
///
/// Writes `positions<step+1>.out` (every particle, active or not) every
/// `dump_interval` steps. One `x\ty\tz` line per particle, in cm.
#[derive(Debug, Clone)]
pub struct PositionDumpOp {
    pub name: String,
    pub dump_interval: usize,
    pub dir: PathBuf,
}

impl PositionDumpOp {
    /// Create a position dumper; an interval of 0 never writes
    pub fn new(dump_interval: usize, dir: PathBuf) -> Self {
        Self {
            name: "PositionDumpOp".to_string(),
            dump_interval,
            dir,
        }
    }

    /// Create a handle for the position dumper
    pub fn handle(dump_interval: usize, dir: PathBuf) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(dump_interval, dir)))
    }

    pub fn path_for(&self, step: usize) -> PathBuf {
        self.dir.join(format!("positions{}.out", step + 1))
    }
}

impl SimOp for PositionDumpOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_sim(&mut self, sim: &mut Simulation) {
        let step = sim.current_step();
        if self.dump_interval == 0 || (step + 1) % self.dump_interval != 0 {
            return;
        }
        let path = self.path_for(step);
        if let Err(e) = sim.ensemble.write_positions(&path) {
            sim.record_io_failure(&self.name, &path, &e);
        }
    }
}
