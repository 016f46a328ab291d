//! # Treasure Hunt Server Library
//!
//! Concurrent core of the multiplayer treasure-hunt server. Clients connect
//! over TCP, pick a unique name, and steer a player around a small bounded
//! grid looking for buried treasure. Every state change is broadcast to all
//! connected clients as newline-delimited text.
//!
//! ## Architecture
//!
//! ### One Lock Around the World
//! [`world::WorldState`] holds the player mapping and the remaining treasure.
//! It sits behind a single `tokio::sync::Mutex` ([`world::SharedWorld`]).
//! Every operation locks it once, mutates, renders the resulting messages and
//! enqueues them before unlocking. Broadcasts therefore follow one total order
//! of commands and never show a state that was not actually reached.
//!
//! ### Two Tasks per Connection
//! Each accepted connection gets a reader task running its
//! [`session::Session`] and a writer task draining that session's
//! [`outbox::Outbox`]. Outboxes are bounded and drop their oldest message
//! when full, so a stalled client only loses its own backlog and never blocks
//! anyone else.
//!
//! ## Module Organization
//!
//! - `grid`: bounds and clamping for positions
//! - `world`: players, treasure, and the shared lock
//! - `commands`: command lines to world mutations and replies
//! - `broadcast`: fan-out of rendered messages to outboxes
//! - `outbox`: bounded drop-oldest outbound queues
//! - `codec`: line framing on the socket
//! - `session`: per-connection lifecycle
//! - `network`: the TCP acceptor
//! - `config` / `error`: startup settings and the error taxonomy
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(&ServerConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod grid;
pub mod network;
pub mod outbox;
pub mod session;
pub mod world;
