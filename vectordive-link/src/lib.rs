mod frame;
mod link;
mod parameters;

pub use frame::{FrameEncoder, TelemetryMessage, decode_datagram};
pub use link::{ConnectError, ConnectionState, LinkConfig, TelemetryLink};
pub use parameters::{ConnectionMode, ConnectionParameters, ParameterError};
