//! `CardroomServer` builder and server loop.
//!
//! This is the entry point for running a card room server. It ties
//! together all the layers: transport → protocol → dispatcher → rooms.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cardroom_protocol::{Codec, JsonCodec};
use cardroom_room::RoomConfig;
use cardroom_transport::{Transport, TransportError, WebSocketTransport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::CardroomError;
use crate::dispatch::{Command, Dispatcher};
use crate::handler::handle_connection;

/// Capacity of the connection → dispatcher command queue. Connection tasks
/// wait when it is full, which throttles the busiest readers first.
const COMMAND_QUEUE: usize = 1024;

/// Builder for configuring and starting a card room server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use cardroom::prelude::*;
///
/// # async fn start() -> Result<(), CardroomError> {
/// let server = CardroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .idle_timeout(Some(Duration::from_secs(60)))
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardroomServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Option<Duration>,
    rng_seed: Option<u64>,
}

impl CardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: None,
            rng_seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Closes connections that send nothing for this long. `None` (the
    /// default) never times out; clients can keep alive with `ping`.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Seeds the shuffle and room-code RNG, for reproducible games.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<CardroomServer<JsonCodec>, CardroomError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(CardroomServer {
            transport,
            codec: Arc::new(JsonCodec),
            dispatcher: Dispatcher::new(self.room_config, rng),
            idle_timeout: self.idle_timeout,
        })
    }
}

impl Default for CardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound card room server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardroomServer<C: Codec> {
    transport: WebSocketTransport,
    codec: Arc<C>,
    dispatcher: Dispatcher,
    idle_timeout: Option<Duration>,
}

impl CardroomServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> CardroomServerBuilder {
        CardroomServerBuilder::new()
    }
}

impl<C: Codec> CardroomServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server.
    ///
    /// Spawns the dispatcher, then accepts connections and spawns a
    /// handler task for each. Runs until the process is terminated.
    pub async fn run(self) -> Result<(), CardroomError> {
        let Self { mut transport, codec, dispatcher, idle_timeout } = self;
        let (commands, rx) = mpsc::channel::<Command>(COMMAND_QUEUE);
        tokio::spawn(dispatcher.run(rx));

        match transport.local_addr() {
            Ok(addr) => tracing::info!(%addr, "cardroom server listening"),
            Err(_) => tracing::info!("cardroom server running"),
        }

        loop {
            match transport.accept().await {
                Ok(conn) => {
                    let commands = commands.clone();
                    let codec = Arc::clone(&codec);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, commands, codec, idle_timeout).await
                        {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e @ TransportError::Handshake(..)) => {
                    tracing::debug!(error = %e, "rejected connection");
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
