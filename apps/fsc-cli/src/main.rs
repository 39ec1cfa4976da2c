use clap::{Parser, Subcommand};
use fsc_config::{FscConfig, ProfileKindDef};
use fsc_controls::OutputHold;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod error;
mod trace;

use error::CliResult;
use trace::Sample;

#[derive(Parser)]
#[command(name = "fsc-cli")]
#[command(
    about = "Fan speed control - validate profiles and replay sensor traces",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file and list its profiles and zones
    Validate {
        /// Path to the configuration file (YAML or JSON)
        config_path: PathBuf,
    },
    /// Replay a recorded sensor trace through every zone
    Replay {
        /// Path to the configuration file (YAML or JSON)
        config_path: PathBuf,
        /// Path to the trace file (YAML or JSON list of samples)
        trace_path: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Replay {
            config_path,
            trace_path,
            output,
        } => cmd_replay(&config_path, &trace_path, output.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    let config = fsc_config::load(config_path)?;
    // building catches anything validation cannot see
    fsc_config::build_zones(&config)?;

    println!("✓ Configuration is valid: {}", config_path.display());
    println!("Profiles:");
    for profile in &config.profiles {
        match &profile.kind {
            ProfileKindDef::Pid {
                setpoint,
                negative_hysteresis,
                positive_hysteresis,
                ..
            } => println!(
                "  {} - pid (engage > {}, reset < {})",
                profile.name,
                setpoint + positive_hysteresis,
                setpoint - negative_hysteresis
            ),
            ProfileKindDef::Table { data, .. } => {
                println!("  {} - table ({} entries)", profile.name, data.len())
            }
        }
    }
    println!("Zones:");
    for zone in &config.zones {
        println!(
            "  {} - {} channels, output [{}, {}], every {} s",
            zone.name,
            zone.channels.len(),
            zone.min_output,
            zone.max_output,
            zone.interval_s
        );
    }
    Ok(())
}

fn cmd_replay(config_path: &Path, trace_path: &Path, output: Option<&Path>) -> CliResult<()> {
    let config = fsc_config::load(config_path)?;
    let samples = trace::load_trace(trace_path)?;
    let csv = replay(&config, &samples)?;

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Replayed {} samples to {}", samples.len(), path.display());
    } else {
        print!("{}", csv);
    }

    Ok(())
}

/// Run every zone over the samples and render one CSV row per sample and zone.
fn replay(config: &FscConfig, samples: &[Sample]) -> CliResult<String> {
    let mut zones = fsc_config::build_zones(config)?;
    tracing::info!(zones = zones.len(), samples = samples.len(), "replaying trace");

    let mut holds: Vec<OutputHold> = zones.iter().map(|_| OutputHold::default()).collect();

    let mut csv = String::from("time_s,zone,output,command,failed_sensors\n");
    for sample in samples {
        for ((zone, clock), hold) in zones.iter_mut().zip(holds.iter_mut()) {
            let dt = clock.tick(sample.t);
            let result = zone.evaluate(&sample.readings, dt)?;
            hold.apply(result.output);

            let command = hold
                .get()
                .map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                sample.t,
                zone.name(),
                result.output,
                command,
                result.failed_sensors.join(";")
            ));
        }
    }
    Ok(csv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
    }

    #[test]
    fn replays_demo_trace() {
        let config = fsc_config::load(&demo("rack.yaml")).unwrap();
        let samples = trace::load_trace(&demo("trace.yaml")).unwrap();
        let csv = replay(&config, &samples).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "time_s,zone,output,command,failed_sensors");
        assert_eq!(lines.len(), samples.len() + 1);
        // inlet table below the first step: 30, clamped range [20, 100]
        assert_eq!(lines[1], "0,zone_0,30.00,30.00,");
        // inlet crosses the 30 step; the engaged pid asks for less
        assert_eq!(lines[4], "9,zone_0,45.00,45.00,");
        // soc_temp missing: fail-safe
        assert_eq!(lines[9], "24,zone_0,100.00,100.00,soc_temp");
    }

    #[test]
    fn held_rows_keep_the_previous_command() {
        let config = fsc_config::from_yaml_str(
            r#"
version: 1
profiles:
  - name: soc_pid
    kind: { type: pid, setpoint: 70, kp: -4.0, negative_hysteresis: 3 }
zones:
  - name: z
    min_output: 0
    max_output: 100
    channels:
      - { sensor: soc, profile: soc_pid }
"#,
        )
        .unwrap();
        let samples: Vec<Sample> = serde_yaml::from_str(
            "- { t: 0, readings: { soc: 80.0 } }\n- { t: 3, readings: { soc: 60.0 } }\n",
        )
        .unwrap();

        let csv = replay(&config, &samples).unwrap();
        let lines: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(lines, vec!["0,z,40.00,40.00,", "3,z,held,40.00,"]);
    }
}
