use std::{io, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::{
    net::UdpSocket,
    time::{Instant, timeout, timeout_at},
};
use vectordive_core::{ActuatorSample, InertialSample, InertialSource};

use crate::{
    frame::{TelemetryMessage, decode_datagram},
    parameters::{ConnectionMode, ConnectionParameters},
};

const RECV_BUFFER_LEN: usize = 2048;
/// Upper bound on queued datagrams read after a match, so a flooding sender
/// can not stall a poll.
const MAX_DRAIN: usize = 64;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("no heartbeat within {0:?}")]
    HeartbeatTimeout(Duration),
    #[error("socket error while waiting for heartbeat: {0}")]
    Socket(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    AwaitingHeartbeat,
    Connected,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub heartbeat_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            heartbeat_timeout: Duration::from_secs(5),
        }
    }
}

/// Latest message of each kind that has been received but not yet handed out.
#[derive(Debug, Default)]
struct Inbox {
    inertial: Option<InertialSample>,
    actuator: Option<ActuatorSample>,
    last_heartbeat: Option<Instant>,
    vehicle_system_id: Option<u8>,
}

impl Inbox {
    fn accept(&mut self, datagram: &[u8]) {
        for message in decode_datagram(datagram) {
            match message {
                TelemetryMessage::Heartbeat { system_id } => {
                    if self.vehicle_system_id != Some(system_id) {
                        info!("heartbeat from system {}", system_id);
                        self.vehicle_system_id = Some(system_id);
                    }
                    self.last_heartbeat = Some(Instant::now());
                }
                TelemetryMessage::Inertial(sample) => self.inertial = Some(sample),
                TelemetryMessage::Actuator(sample) => self.actuator = Some(sample),
                TelemetryMessage::Other { .. } => {}
            }
        }
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Owns the UDP session with the vehicle. Dropping the link, or calling
/// `disconnect()`, releases the socket.
#[derive(Debug)]
pub struct TelemetryLink {
    config: LinkConfig,
    params: Option<ConnectionParameters>,
    state: ConnectionState,
    socket: Option<UdpSocket>,
    inbox: Inbox,
}

impl TelemetryLink {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            params: None,
            state: ConnectionState::Disconnected,
            socket: None,
            inbox: Inbox::default(),
        }
    }

    /// Creates a link and connects it. A failed attempt is only logged; the
    /// returned link is then in the `Failed` state and serves no data.
    pub async fn open(params: ConnectionParameters, config: LinkConfig) -> Self {
        let mut link = Self::new(config);
        if let Err(e) = link.connect(params).await {
            warn!("telemetry link unavailable, using mock data: {}", e);
        }
        link
    }

    pub async fn connect(&mut self, params: ConnectionParameters) -> Result<(), ConnectError> {
        self.disconnect();

        if params.mode == ConnectionMode::Serial {
            warn!(
                "serial mode selected, listening for a UDP bridge on {}",
                params.connection_string()
            );
        }
        info!("opening {}", params.connection_string());

        self.state = ConnectionState::AwaitingHeartbeat;
        let addr = params.socket_addr();
        self.params = Some(params);

        let socket = match UdpSocket::bind(addr).await {
            Ok(socket) => socket,
            Err(source) => return Err(self.fail(ConnectError::Bind { addr, source })),
        };

        let heartbeat_timeout = self.config.heartbeat_timeout;
        match timeout(heartbeat_timeout, Self::wait_heartbeat(&socket, &mut self.inbox)).await {
            Ok(Ok(())) => {
                self.socket = Some(socket);
                self.state = ConnectionState::Connected;
                info!("connected to vehicle");
                Ok(())
            }
            Ok(Err(e)) => Err(self.fail(ConnectError::Socket(e))),
            Err(_) => Err(self.fail(ConnectError::HeartbeatTimeout(heartbeat_timeout))),
        }
    }

    async fn wait_heartbeat(socket: &UdpSocket, inbox: &mut Inbox) -> io::Result<()> {
        let mut buffer = [0u8; RECV_BUFFER_LEN];
        loop {
            let (len, peer) = socket.recv_from(&mut buffer).await?;
            debug!("{} bytes from {}", len, peer);

            inbox.accept(&buffer[..len]);
            if inbox.last_heartbeat.is_some() {
                return Ok(());
            }
        }
    }

    fn fail(&mut self, e: ConnectError) -> ConnectError {
        error!("connection failed: {}", e);
        self.socket = None;
        self.inbox.clear();
        self.state = ConnectionState::Failed(e.to_string());
        e
    }

    /// Releases the socket. A new `connect()` is needed to receive again.
    pub fn disconnect(&mut self) {
        if self.socket.take().is_some() {
            info!("telemetry link closed");
        }
        self.inbox.clear();
        self.state = ConnectionState::Disconnected;
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn parameters(&self) -> Option<&ConnectionParameters> {
        self.params.as_ref()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Takes effect on the next `connect()`.
    pub fn set_config(&mut self, config: LinkConfig) {
        self.config = config;
    }

    pub fn time_since_heartbeat(&self) -> Option<Duration> {
        self.inbox.last_heartbeat.map(|t| t.elapsed())
    }

    pub async fn poll_inertial(&mut self, timeout: Duration) -> Option<InertialSample> {
        self.poll(timeout, |inbox| inbox.inertial.take()).await
    }

    pub async fn poll_actuator(&mut self, timeout: Duration) -> Option<ActuatorSample> {
        self.poll(timeout, |inbox| inbox.actuator.take()).await
    }

    /// Waits until `take` yields something or `timeout` elapses. Everything
    /// received in the meantime lands in the inbox, so messages of the other
    /// kind are kept for the next poll of that kind.
    async fn poll<T>(
        &mut self,
        timeout: Duration,
        take: fn(&mut Inbox) -> Option<T>,
    ) -> Option<T> {
        if !self.is_connected() {
            return None;
        }

        let deadline = deadline_after(timeout);
        let mut buffer = [0u8; RECV_BUFFER_LEN];

        // may already have arrived during a poll for the other kind
        let mut found = take(&mut self.inbox);
        while found.is_none() {
            let socket = self.socket.as_ref()?;
            match timeout_at(deadline, socket.recv(&mut buffer)).await {
                Ok(Ok(len)) => {
                    self.inbox.accept(&buffer[..len]);
                    found = take(&mut self.inbox);
                }
                Ok(Err(e)) => {
                    self.lose_socket(e);
                    return None;
                }
                Err(_) => return None,
            }
        }

        self.drain(&mut buffer).await;
        take(&mut self.inbox).or(found)
    }

    /// Reads datagrams that are already queued without waiting for new ones.
    async fn drain(&mut self, buffer: &mut [u8]) {
        for _ in 0..MAX_DRAIN {
            let Some(socket) = self.socket.as_ref() else {
                return;
            };
            match timeout(Duration::ZERO, socket.recv(buffer)).await {
                Ok(Ok(len)) => self.inbox.accept(&buffer[..len]),
                Ok(Err(e)) => {
                    self.lose_socket(e);
                    return;
                }
                Err(_) => return,
            }
        }
    }

    fn lose_socket(&mut self, e: io::Error) {
        error!("telemetry socket error: {}", e);
        self.socket = None;
        self.state = ConnectionState::Failed(e.to_string());
    }
}

/// `now + timeout`, saturating to roughly 30 years for huge timeouts.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

impl Default for TelemetryLink {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}

#[async_trait(?Send)]
impl InertialSource for TelemetryLink {
    async fn poll_inertial(&mut self, timeout: Duration) -> Option<InertialSample> {
        TelemetryLink::poll_inertial(self, timeout).await
    }
}
