use crate::config::SimulationConfig;
use crate::ensemble::Ensemble;
use crate::error::{Result, SimError};
use crate::lifecycle::{Boundaries, FateCounters, Kinematics, Transition, classify};
use crate::output::format_g;
use crate::particle::Particle;
use crate::physics::{BackgroundSpecies, Distribution, Integrator, seeded_rng};
use crate::planet::Planet;
use crate::sim::sim_op::{SimOp, SimOpHandle};
use crate::stats::{StatsAccumulator, StatsReport};
use colored::Colorize;
use std::path::Path;

pub struct Simulation {
    pub name: String,
    pub planet: Planet,
    pub config: SimulationConfig,
    pub ensemble: Ensemble,
    pub stats: StatsAccumulator,
    /// Filled in by the stats op when the run ends.
    pub stats_report: Option<StatsReport>,
    pub counters: FateCounters,
    pub ops: Vec<Box<dyn SimOp>>,
    pub integrator: Box<dyn Integrator>,
    pub background: Box<dyn BackgroundSpecies>,
    pub global_rate: f64,
    pub bounds: Boundaries,
    /// Index of the step being run (or about to run).
    pub step: usize,
    /// Output writes that failed; the run carries on past them.
    pub io_failures: usize,
    finished: bool,
}

pub struct SimProps {
    pub name: &'static str,
    pub planet: Planet,
    pub config: SimulationConfig,
    pub distribution: Box<dyn Distribution>,
    pub background: Box<dyn BackgroundSpecies>,
    pub integrator: Box<dyn Integrator>,
    pub ops: Vec<SimOpHandle>,
}

impl Simulation {
    pub fn new(props: SimProps) -> Result<Simulation> {
        let SimProps {
            name,
            planet,
            config,
            mut distribution,
            background,
            integrator,
            ops,
        } = props;
        config.validate()?;

        let pool = vec![Particle::with_mass_amu(config.particle_mass_amu); config.num_particles];
        let mut rng = seeded_rng(config.seed);
        let ensemble = Ensemble::new(pool, config.num_traced, distribution.as_mut(), &mut rng)?;

        Ok(Simulation {
            name: name.to_string(),
            stats: StatsAccumulator::new(&config.stats, &config.edf_altitudes_km),
            stats_report: None,
            counters: FateCounters::default(),
            ops: ops.into_iter().map(|handle| handle.op).collect(),
            integrator,
            background,
            global_rate: distribution.global_rate(),
            bounds: Boundaries::new(&planet, config.lower_bound_cm, config.upper_bound_cm),
            step: 0,
            io_failures: 0,
            finished: false,
            planet,
            config,
            ensemble,
        })
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Start of the current step in simulated seconds.
    pub fn current_time(&self) -> f64 {
        self.step as f64 * self.config.dt
    }

    pub fn total_spawned(&self) -> usize {
        self.ensemble.len()
    }

    /// Day-side escapes over everything spawned.
    pub fn escape_fraction(&self) -> f64 {
        escape_fraction(self.counters.escaped_day, self.total_spawned())
    }

    /// Run until every particle is gone or the step budget is spent.
    pub fn run(&mut self) -> Result<SimReport> {
        if self.finished {
            return Err(SimError::AlreadyRun(self.name.clone()));
        }
        println!("{}", "Simulating Particle Transport...".bold());

        self.simulate_init();
        while self.step < self.config.num_steps && self.ensemble.active_count() > 0 {
            self.simulate_step();
            self.sweep();
            self.step += 1;
        }
        self.simulate_end();
        self.finished = true;

        let report = self.report();
        report.print();
        Ok(report)
    }

    pub fn report(&self) -> SimReport {
        SimReport {
            name: self.name.clone(),
            steps_run: self.step,
            total_spawned: self.total_spawned(),
            active: self.ensemble.active_count(),
            collisions: self.background.total_collisions(),
            global_rate: self.global_rate,
            counters: self.counters,
            io_failures: self.io_failures,
        }
    }

    /// Log a failed write and keep going.
    pub fn record_io_failure(&mut self, op_name: &str, path: &Path, err: &std::io::Error) {
        eprintln!(
            "{} {}: cannot write {}: {}",
            "⚠️ ".yellow(),
            op_name.yellow(),
            path.display(),
            err
        );
        self.io_failures += 1;
    }

    fn simulate_init(&mut self) {
        let mut ops = std::mem::take(&mut self.ops);
        for op in ops.iter_mut() {
            op.init_sim(self);
        }
        self.ops = ops;
    }

    fn simulate_step(&mut self) {
        let mut ops = std::mem::take(&mut self.ops);
        for op in ops.iter_mut() {
            op.update_sim(self);
        }
        self.ops = ops;
    }

    /// Ops wind down in reverse, so late writers (traces) finish before the
    /// early ones (stats) normalize.
    fn simulate_end(&mut self) {
        let mut ops = std::mem::take(&mut self.ops);
        for op in ops.iter_mut().rev() {
            op.after_sim(self);
        }
        self.ops = ops;
    }

    /// Move, collide and classify every active particle, in ensemble order.
    fn sweep(&mut self) {
        let dt = self.config.dt;
        let time = self.current_time();
        let k_g = self.planet.k_g();

        for index in 0..self.ensemble.len() {
            let (fate, was_thermalized) = {
                let particle = self.ensemble.particle_mut(index);
                if !particle.is_active() {
                    continue;
                }

                self.integrator.advance(particle, dt, k_g);
                if self.background.check_collision(particle, dt) {
                    let target = self.background.collision_target();
                    let scatter = self.background.collision_scatter_angle();
                    particle.apply_collision(&target, scatter, time, self.planet.radius_cm);
                }

                let kinematics = Kinematics::of(particle, &self.planet);
                (classify(&kinematics, &self.bounds), particle.is_thermalized())
            };

            let Some(fate) = fate else {
                continue;
            };
            let transition = Transition::resolve(fate, was_thermalized, self.config.thermalization);
            if transition.mark_thermalized {
                self.ensemble.particle_mut(index).set_thermalized();
            }
            if transition.deactivate {
                self.ensemble.deactivate(index, time, fate.reason());
            }
            self.counters.record(&transition);
        }
    }
}

fn escape_fraction(escaped: usize, spawned: usize) -> f64 {
    if spawned == 0 {
        0.0
    } else {
        escaped as f64 / spawned as f64
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReport {
    pub name: String,
    pub steps_run: usize,
    pub total_spawned: usize,
    pub active: usize,
    pub collisions: u64,
    pub global_rate: f64,
    pub counters: FateCounters,
    pub io_failures: usize,
}

impl SimReport {
    /// Day-side escapes over everything spawned.
    pub fn escape_fraction(&self) -> f64 {
        escape_fraction(self.counters.escaped_day, self.total_spawned)
    }

    /// Particles accounted for: every terminal fate plus the still active.
    pub fn accounted(&self) -> usize {
        self.counters.terminal_total() + self.active
    }

    pub fn lines(&self) -> Vec<String> {
        let c = &self.counters;
        vec![
            format!("Number of collisions: {}", self.collisions),
            format!("Active particles remaining: {}", self.active),
            format!("Number of escaped particles: {}", c.escaped_day),
            format!("Total particles spawned: {}", self.total_spawned),
            format!("Fraction of escaped particles: {}", format_g(self.escape_fraction(), 6)),
            format!("Global production rate: {}", format_g(self.global_rate, 6)),
            format!("Total thermalized particles: {}", c.thermalized),
            format!("Escaped thermalized particles: {}", c.thermal_escapes),
            format!("Number of night side escaping particles: {}", c.escaped_night),
            format!("Dropped below lower bound: {}", c.dropped),
            format!("Removed below escape velocity: {}", c.sub_escape),
            format!("Output write failures: {}", self.io_failures),
        ]
    }

    pub fn print(&self) {
        println!("\n{}", format!("📊 === {} ({} steps) ===", self.name, self.steps_run).bold());
        for line in self.lines() {
            println!("{}", line);
        }
        if self.io_failures > 0 {
            println!("{}", "⚠️  some output files could not be written".yellow());
        }
    }
}
