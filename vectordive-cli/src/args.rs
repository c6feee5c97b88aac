use std::net::SocketAddr;

use clap::Parser;
use clap::Subcommand;
use vectordive_link::{ConnectionParameters, ParameterError};

#[derive(Parser, Debug)]
#[command(name = "VectorDive")]
#[command(bin_name = "vectordive")]
pub struct Cli {
    #[clap(subcommand)]
    pub mode: ModeSelect,
}

#[derive(Subcommand, Debug)]
pub enum ModeSelect {
    #[command(about = "connect to the vehicle and log the dead reckoning estimate")]
    Monitor(ConnectionArgs),

    #[command(about = "wait for a heartbeat from the vehicle, then exit")]
    WaitHeartbeat(WaitHeartbeatArgs),

    #[command(about = "print the location of the configuration file")]
    ConfigPath,

    #[clap(subcommand)]
    #[command(about = "functions used for testing")]
    Testing(TestingModeSelect),
}

/// Overrides for the connection section of the configuration file. Kept as
/// text so they go through the same validation as the file.
#[derive(Parser, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(long, help = "IPv4 address to listen on")]
    pub ip: Option<String>,
    #[arg(long, help = "UDP port to listen on")]
    pub port: Option<String>,
    #[arg(long, help = "UDP or Serial")]
    pub mode: Option<String>,
}

impl ConnectionArgs {
    pub fn resolve(
        &self,
        configured: &ConnectionParameters,
    ) -> Result<ConnectionParameters, ParameterError> {
        ConnectionParameters::parse(
            &self.ip.clone().unwrap_or_else(|| configured.address.to_string()),
            &self.port.clone().unwrap_or_else(|| configured.port.to_string()),
            &self.mode.clone().unwrap_or_else(|| configured.mode.to_string()),
        )
    }
}

#[derive(Parser, Debug)]
pub struct WaitHeartbeatArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    #[arg(long, help = "seconds to wait, overrides the configured heartbeat timeout")]
    pub timeout: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum TestingModeSelect {
    #[command(about = "emulate a vehicle sending telemetry over UDP")]
    MockVehicle(MockVehicleArgs),
}

#[derive(Parser, Debug)]
pub struct MockVehicleArgs {
    #[arg(long, default_value = "127.0.0.1:14550")]
    pub target: SocketAddr,
    #[arg(long, default_value_t = 50.0, help = "RAW_IMU frames per second")]
    pub rate: f64,
}
