mod sim_op_density_stats;
mod sim_op_distro_snapshot;
mod sim_op_position_dump;
mod sim_op_progress_reporter;
mod sim_op_trace;

pub use sim_op_density_stats::DensityStatsOp;
pub use sim_op_distro_snapshot::DistroSnapshotOp;
pub use sim_op_position_dump::PositionDumpOp;
pub use sim_op_progress_reporter::ProgressReportOp;
pub use sim_op_trace::TraceOp;

use crate::config::SimulationConfig;
use crate::sim::Simulation;

pub trait SimOp {
    /// The name of this operator (for identification and lookup)
    fn name(&self) -> &str;

    /// Called once before the first step
    fn init_sim(&mut self, _sim: &mut Simulation) {}

    /// Called every step, before the particles move
    fn update_sim(&mut self, _sim: &mut Simulation) {}

    /// Called once after the last step; ops unwind in reverse order
    fn after_sim(&mut self, _sim: &mut Simulation) {}
}

pub struct SimOpHandle {
    pub op: Box<dyn SimOp>,
}

impl SimOpHandle {
    pub fn new(op: Box<dyn SimOp>) -> Self {
        SimOpHandle { op }
    }
}

/// The usual pipeline for a run: progress, position dumps, statistics,
/// traces, and (if configured) end-of-run snapshot histograms.
pub fn standard_ops(config: &SimulationConfig) -> Vec<SimOpHandle> {
    let mut ops = vec![
        ProgressReportOp::handle(config.print_status_freq),
        PositionDumpOp::handle(config.output_pos_freq, config.output_pos_dir.clone()),
        DensityStatsOp::handle(config.output_stats_dir.clone()),
        TraceOp::handle(config.trace_dir.clone()),
    ];
    if let Some(snapshot) = &config.snapshot {
        ops.push(DistroSnapshotOp::handle(snapshot.clone()));
    }
    ops
}
