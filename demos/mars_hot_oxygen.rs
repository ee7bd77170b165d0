// Hot oxygen from dissociative recombination in the Martian upper atmosphere.
// Pass a JSON config path to override the defaults below.

use exo_escape::config::SimulationConfig;
use exo_escape::constants::CM_PER_KM;
use exo_escape::physics::{ExponentialBackground, ExponentialBackgroundParams, IsotropicSource, IsotropicSourceParams, VelocityVerlet};
use exo_escape::planet::Planet;
use exo_escape::sim::sim_op::standard_ops;
use exo_escape::sim::{SimProps, Simulation};
use std::path::PathBuf;

fn main() -> exo_escape::Result<()> {
    println!("🔴 Mars hot oxygen exosphere");
    println!("============================");

    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => default_config()?,
    };
    for dir in [&config.output_pos_dir, &config.output_stats_dir, &config.trace_dir] {
        std::fs::create_dir_all(dir)?;
    }

    let mars = Planet::mars();
    let source = IsotropicSource::new(
        IsotropicSourceParams {
            source_radius_cm: mars.radius_cm + 200.0 * CM_PER_KM,
            energy_ev: 2.5,
            global_rate: 1.0e26,
            day_side_only: true,
        },
        config.seed,
    );
    let background = ExponentialBackground::new(
        ExponentialBackgroundParams::mars_co2(mars.radius_cm),
        config.seed.map(|s| s.wrapping_add(1)),
    );

    let mut sim = Simulation::new(SimProps {
        name: "mars_hot_oxygen",
        ops: standard_ops(&config),
        planet: mars,
        config,
        distribution: Box::new(source),
        background: Box::new(background),
        integrator: Box::new(VelocityVerlet),
    })?;

    let report = sim.run()?;
    println!(
        "\n✅ {} of {} particles accounted for",
        report.accounted(),
        report.total_spawned
    );
    Ok(())
}

fn default_config() -> exo_escape::Result<SimulationConfig> {
    let out = PathBuf::from("mars_hot_oxygen_out");
    let config = SimulationConfig {
        num_particles: 2000,
        num_traced: 3,
        seed: Some(2024),
        dt: 1.0,
        num_steps: 20_000,
        print_status_freq: 1000,
        output_pos_freq: 5000,
        output_pos_dir: out.join("positions"),
        output_stats_dir: out.clone(),
        trace_dir: out.join("traces"),
        ..SimulationConfig::default()
    };
    config.validate()?;
    Ok(config)
}
