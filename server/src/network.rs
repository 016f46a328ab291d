//! TCP acceptor that hands every connection to its own session task.

use crate::config::ServerConfig;
use crate::error::{ServerError, SessionError};
use crate::session::Session;
use crate::world::SharedWorld;
use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};

/// Listening server owning the shared world.
pub struct Server {
    listener: TcpListener,
    world: SharedWorld,
    outbox_capacity: usize,
}

impl Server {
    /// Validates the config, places treasure, and binds the listener.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;
        let world = config.build_world(&mut rand::thread_rng()).into_shared();

        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_addr.clone(),
                source,
            })?;
        info!("Server listening on {}", config.bind_addr);

        Ok(Self {
            listener,
            world,
            outbox_capacity: config.outbox_capacity,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn world(&self) -> SharedWorld {
        SharedWorld::clone(&self.world)
    }

    /// Accepts connections for as long as the process runs.
    pub async fn run(self) {
        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => self.spawn_session(stream, addr),
                Err(e) if is_transient(&e) => {
                    debug!("Transient accept error: {}", e);
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) {
        info!("Client connecting from {}", addr);
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY for {}: {}", addr, e);
        }

        let session = Session::new(addr.to_string(), self.world(), self.outbox_capacity);
        tokio::spawn(async move {
            let (reader, writer) = stream.into_split();
            match session.run(reader, writer).await {
                Ok(()) => info!("Client {} disconnected", addr),
                Err(SessionError::Rejected(reason)) => {
                    info!("Client {} rejected: {}", addr, reason)
                }
                Err(e) => warn!("Client {} dropped: {}", addr, e),
            }
        });
    }
}

/// Errors tied to a single aborted handshake rather than the listener.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreasurePlacement;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::bind(&test_config()).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.world().lock().await.treasures_remaining(), 3);
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let first = Server::bind(&test_config()).await.unwrap();
        let taken = first.local_addr().unwrap();

        let config = ServerConfig {
            bind_addr: taken.to_string(),
            ..test_config()
        };
        match Server::bind(&config).await {
            Err(ServerError::Bind { addr, .. }) => assert_eq!(addr, taken.to_string()),
            Err(other) => panic!("expected bind error, got {}", other),
            Ok(_) => panic!("second bind on {} succeeded", taken),
        }
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = ServerConfig {
            grid_size: -3,
            ..test_config()
        };
        assert!(matches!(
            Server::bind(&config).await,
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_random_treasure_world() {
        let config = ServerConfig {
            treasures: TreasurePlacement::Random,
            ..test_config()
        };
        let server = Server::bind(&config).await.unwrap();
        assert_eq!(server.world().lock().await.treasures_remaining(), 1);
    }

    #[test]
    fn test_transient_accept_errors() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::ConnectionAborted)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
