use std::time::Duration;

use anyhow::Result;
use args::{Cli, ModeSelect, TestingModeSelect};
use clap::Parser;
use config::GroundStationConfig;
use log::{LevelFilter, info};
use testing::mock_vehicle::mock_vehicle;
use vectordive_link::TelemetryLink;

mod args;
mod config;
mod monitor;
mod readout;
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter(Some("vectordive"), LevelFilter::Info)
        .filter(Some("vectordive_core"), LevelFilter::Info)
        .filter(Some("vectordive_link"), LevelFilter::Info)
        .parse_default_env()
        .try_init();

    let args = Cli::parse();
    match args.mode {
        ModeSelect::Monitor(connection) => {
            let config = GroundStationConfig::load()?;
            let params = connection.resolve(&config.connection)?;
            monitor::monitor(&config, params).await?;
        }
        ModeSelect::WaitHeartbeat(args) => {
            let config = GroundStationConfig::load()?;
            let params = args.connection.resolve(&config.connection)?;

            let mut link_config = config.link_config()?;
            if let Some(timeout) = args.timeout {
                link_config.heartbeat_timeout = Duration::try_from_secs_f64(timeout)?;
            }

            let mut link = TelemetryLink::new(link_config);
            info!(
                "waiting up to {:?} for a heartbeat",
                link.config().heartbeat_timeout
            );
            link.connect(params).await?;
            info!("vehicle is alive");
        }
        ModeSelect::ConfigPath => {
            println!("{}", GroundStationConfig::get_config_path()?.display());
        }
        ModeSelect::Testing(TestingModeSelect::MockVehicle(args)) => {
            mock_vehicle(args).await?;
        }
    }

    Ok(())
}
