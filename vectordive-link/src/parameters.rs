use std::{
    fmt::Display,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 14550;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
    #[error("invalid port: {0:?}, expected 1-65535")]
    InvalidPort(String),
    #[error("invalid connection mode: {0:?}, expected UDP or Serial")]
    InvalidMode(String),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    #[serde(rename = "UDP")]
    Udp,
    Serial,
}

impl Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionMode::Udp => write!(f, "UDP"),
            ConnectionMode::Serial => write!(f, "Serial"),
        }
    }
}

impl FromStr for ConnectionMode {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "udp" => Ok(ConnectionMode::Udp),
            "serial" => Ok(ConnectionMode::Serial),
            _ => Err(ParameterError::InvalidMode(s.to_string())),
        }
    }
}

/// Where to listen for vehicle telemetry. Fixed for the lifetime of a session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub address: Ipv4Addr,
    pub port: u16,
    pub mode: ConnectionMode,
}

impl Default for ConnectionParameters {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            port: DEFAULT_PORT,
            mode: ConnectionMode::Udp,
        }
    }
}

impl ConnectionParameters {
    pub fn new(address: Ipv4Addr, port: u16, mode: ConnectionMode) -> Result<Self, ParameterError> {
        if port == 0 {
            return Err(ParameterError::InvalidPort(port.to_string()));
        }
        Ok(Self {
            address,
            port,
            mode,
        })
    }

    /// Parses user supplied text, e.g. from the connection form.
    pub fn parse(address: &str, port: &str, mode: &str) -> Result<Self, ParameterError> {
        let address = address
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| ParameterError::InvalidAddress(address.to_string()))?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ParameterError::InvalidPort(port.to_string()))?;

        Self::new(address, port, mode.parse()?)
    }

    /// Both modes listen on UDP, serial links are expected to be bridged to a
    /// UDP endpoint (e.g. by mavproxy).
    pub fn connection_string(&self) -> String {
        format!("udpin:{}:{}", self.address, self.port)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl Display for ConnectionParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.connection_string(), self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string() {
        let params = ConnectionParameters::parse("192.168.2.1", "14550", "UDP").unwrap();
        assert_eq!(params.connection_string(), "udpin:192.168.2.1:14550");
        assert_eq!(params.socket_addr().to_string(), "192.168.2.1:14550");
        assert_eq!(
            ConnectionParameters::default().connection_string(),
            "udpin:0.0.0.0:14550"
        );
    }

    #[test]
    fn serial_mode_still_listens_on_udp() {
        let params = ConnectionParameters::parse("0.0.0.0", "14551", "Serial").unwrap();
        assert_eq!(params.mode, ConnectionMode::Serial);
        assert_eq!(params.connection_string(), "udpin:0.0.0.0:14551");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            ConnectionParameters::parse("localhost", "14550", "UDP"),
            Err(ParameterError::InvalidAddress("localhost".to_string()))
        );
        assert_eq!(
            ConnectionParameters::parse("0.0.0.0", "0", "UDP"),
            Err(ParameterError::InvalidPort("0".to_string()))
        );
        assert_eq!(
            ConnectionParameters::parse("0.0.0.0", "70000", "UDP"),
            Err(ParameterError::InvalidPort("70000".to_string()))
        );
        assert_eq!(
            ConnectionParameters::parse("0.0.0.0", "14550", "tcp"),
            Err(ParameterError::InvalidMode("tcp".to_string()))
        );
    }
}
