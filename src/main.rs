use std::env;
use std::num::NonZeroU32;
use std::process::ExitCode;

use cpu_scheduling_simulator::{Driver, SimulatorConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let program_paths: Vec<String> = env::args().skip(1).collect();
    if program_paths.is_empty() {
        log::error!("usage: cpu-scheduling-simulator <program file>...");
        return ExitCode::FAILURE;
    }

    let mut config = SimulatorConfig::default();
    if let Some(quantum) = env_override::<NonZeroU32>("SIM_QUANTUM") {
        config.quantum = quantum;
    }
    if let Some(total_frames) = env_override::<u32>("SIM_FRAMES") {
        config.total_frames = total_frames;
    }

    let mut driver = Driver::new(config);
    let process_ids = driver.load_programs(&program_paths);
    if process_ids.is_empty() {
        log::warn!("no programs were admitted");
        return ExitCode::FAILURE;
    }

    let report = driver.run();

    log::info!("... ID | Name                 | Priority | Pages | Status");
    log::info!("...----|----------------------|----------|-------|-----------");
    for summary in &report.processes {
        log::info!(
            "... {:02} | {:<20} | {:02}       | {:05} | {}",
            summary.id,
            summary.name,
            summary.priority,
            summary.page_count,
            summary.state
        );
    }

    if report.completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Reads an optional numeric override, keeping the default on bad input.
fn env_override<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = env::var(key).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring invalid {}={:?}", key, value);
            None
        }
    }
}
