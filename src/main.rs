/* 3rd party libraries */
use clap::Parser;
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::io::BufRead;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use elevator_dispatch::config;
use elevator_dispatch::console::{self, ConsoleCommand};
use elevator_dispatch::shared::ElevatorStatus;
use elevator_dispatch::sim::Simulation;
use elevator_dispatch::unwrap_or_exit;

/// Runs a simulated elevator car driven from the console.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Virtual seconds per wall-clock second, overrides the configuration file
    #[clap(short, long)]
    time_scale: Option<f64>,
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the configuration
    let config = unwrap_or_exit!(config::load_config(&args.config));
    let time_scale = args.time_scale.unwrap_or(config.simulation.time_scale);
    if !(time_scale.is_finite() && time_scale > 0.0) {
        error!("ERROR: time scale must be positive, got {}", time_scale);
        std::process::exit(1);
    }
    let tick = Duration::from_millis(config.simulation.tick_ms.max(1));

    // Initialize channels
    let (command_tx, command_rx) = cbc::unbounded::<ConsoleCommand>();
    let (status_tx, status_rx) = cbc::unbounded::<ElevatorStatus>();

    // Start the elevator on its own thread, it owns the controller from here on
    let mut simulation = Simulation::new(&config.elevator);
    simulation.start();
    let elevator_thread = Builder::new().name("elevator".into());
    let elevator_handle = unwrap_or_exit!(elevator_thread
        .spawn(move || simulation.run(command_rx, status_tx, time_scale, tick)));

    info!("Commands: inside <n>, up <n>, down <n>, status, quit");

    // Console loop
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Error reading from stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match console::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if command_tx.send(command).is_err() {
            break;
        }
        match command {
            ConsoleCommand::Quit => break,
            ConsoleCommand::Status => match status_rx.recv_timeout(Duration::from_secs(1)) {
                Ok(status) => println!("{}", unwrap_or_exit!(serde_json::to_string_pretty(&status))),
                Err(e) => warn!("No status from elevator: {}", e),
            },
            ConsoleCommand::Call(_) => {}
        }
    }

    // Stop the elevator if stdin closed first
    let _ = command_tx.send(ConsoleCommand::Quit);
    if elevator_handle.join().is_err() {
        error!("Elevator thread panicked");
    }
}
