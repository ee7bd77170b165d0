use crate::output::{append_text, position_line};
use crate::sim::Simulation;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use std::path::PathBuf;

/// Trace Operator
///
/// Follows the traced particles: one appended position line per step while
/// active, and the collision history once the run is over.
///
/// A particle drawn twice for tracing is written twice per step.
#[derive(Debug, Clone)]
pub struct TraceOp {
    pub name: String,
    pub dir: PathBuf,
}

impl TraceOp {
    /// Create a trace operator writing `part<i>_*.out` into `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self {
            name: "TraceOp".to_string(),
            dir,
        }
    }

    /// Create a handle for the trace operator
    pub fn handle(dir: PathBuf) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(dir)))
    }

    pub fn positions_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part{}_positions.out", index))
    }

    pub fn collisions_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("part{}_collisions.out", index))
    }
}

impl SimOp for TraceOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_sim(&mut self, sim: &mut Simulation) {
        let traced = sim.ensemble.traced_indices().to_vec();
        for index in traced {
            let particle = sim.ensemble.particle(index);
            if !particle.is_active() {
                continue;
            }
            let line = position_line(particle.position);
            let path = self.positions_path(index);
            if let Err(e) = append_text(&path, &line) {
                sim.record_io_failure(&self.name, &path, &e);
            }
        }
    }

    fn after_sim(&mut self, sim: &mut Simulation) {
        let traced = sim.ensemble.traced_indices().to_vec();
        for index in traced {
            let path = self.collisions_path(index);
            if let Err(e) = sim.ensemble.particle(index).dump_collision_log(&path) {
                sim.record_io_failure(&self.name, &path, &e);
            }
        }
    }
}
