use anyhow::Result;
use clap::{Parser, Subcommand};
use cse7766_rs::{
    init_logger, log_info, Cse7766DeviceHandle, Cse7766Meter, FrameOutcome, SerialConfig,
};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "cse7766-cli")]
#[command(about = "CLI tool for CSE7766 power-meter telemetry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Continuously decode a CSE7766 stream and log averaged readings
    Watch {
        port: String,
        #[arg(short, long, default_value = "4800")]
        baudrate: u32,
        /// Seconds between published averages
        #[arg(short, long, default_value = "10")]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            port,
            baudrate,
            interval,
        } => {
            let config = SerialConfig {
                baudrate,
                ..SerialConfig::default()
            };
            let mut handle = Cse7766DeviceHandle::connect_with_config(&port, config).await?;
            let mut meter = Cse7766Meter::new();
            log_info(&format!("Connected to CSE7766 on {port}"));

            let interval = Duration::from_secs(interval);
            let mut last_publish = Instant::now();
            loop {
                for outcome in handle.poll_into(&mut meter).await? {
                    if let FrameOutcome::Discarded(reason) = outcome {
                        log::warn!("frame discarded: {reason}");
                    }
                }

                if last_publish.elapsed() >= interval {
                    last_publish = Instant::now();
                    let readings = meter.publish();
                    if let Some(v) = readings.voltage {
                        log_info(&format!("Voltage: {v:.1} V"));
                    }
                    if let Some(i) = readings.current {
                        log_info(&format!("Current: {:.1} mA", i * 1000.0));
                    }
                    if let Some(p) = readings.power {
                        log_info(&format!("Power: {p:.1} W"));
                    }
                    if let Some(e) = readings.energy {
                        log_info(&format!("Energy: {e:.3} kWh"));
                    }
                }
            }
        }
    }
}
