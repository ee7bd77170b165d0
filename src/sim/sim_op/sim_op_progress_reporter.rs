use crate::constants::{DEFAULT_PRECISION, SECONDS_PER_HOUR};
use crate::output::format_g;
use crate::sim::Simulation;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use colored::Colorize;

/// Progress Reporter Operator
///
/// Prints a status line every `report_interval` steps (0 turns it off):
/// simulated time, active particles and the day-side escape fraction so far.
#[derive(Debug, Clone)]
pub struct ProgressReportOp {
    pub name: String,
    pub report_interval: usize,
}

impl ProgressReportOp {
    /// Create a progress reporter
    pub fn new(report_interval: usize) -> Self {
        Self {
            name: "ProgressReportOp".to_string(),
            report_interval,
        }
    }

    /// Create a handle for the progress reporter
    pub fn handle(report_interval: usize) -> SimOpHandle {
        SimOpHandle::new(Box::new(Self::new(report_interval)))
    }

    /// Reports land on the step that completes each interval.
    pub fn is_due(&self, step: usize) -> bool {
        self.report_interval > 0 && (step + 1) % self.report_interval == 0
    }
}

/// `<h>h <m>m <s>s` of simulated time, then the running totals.
pub fn status_line(elapsed_s: f64, active: usize, escaped: usize, escape_fraction: f64) -> String {
    let hrs = elapsed_s / SECONDS_PER_HOUR;
    let min = (hrs - hrs.trunc()) * 60.0;
    let sec = (min - min.trunc()) * 60.0;
    format!(
        "{}h {}m {}s \t Active: {}\t Escaped: {}\t Escape fraction: {}",
        hrs as u64,
        min as u64,
        format_g(sec, DEFAULT_PRECISION),
        active,
        escaped,
        format_g(escape_fraction, DEFAULT_PRECISION)
    )
}

impl SimOp for ProgressReportOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn init_sim(&mut self, sim: &mut Simulation) {
        println!(
            "🚀 {}: {} particles, up to {} steps of {}s",
            sim.name,
            sim.total_spawned(),
            sim.config.num_steps,
            format_g(sim.config.dt, DEFAULT_PRECISION)
        );
    }

    fn update_sim(&mut self, sim: &mut Simulation) {
        if !self.is_due(sim.current_step()) {
            return;
        }
        let elapsed = (sim.current_step() + 1) as f64 * sim.config.dt;
        println!(
            "{}",
            status_line(
                elapsed,
                sim.ensemble.active_count(),
                sim.counters.escaped_day,
                sim.escape_fraction()
            )
        );
    }

    fn after_sim(&mut self, sim: &mut Simulation) {
        let elapsed = sim.current_time();
        println!(
            "\n{} after {}s of simulated time",
            "📈 Simulation Complete!".green(),
            format_g(elapsed, DEFAULT_PRECISION)
        );
    }
}
