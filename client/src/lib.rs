//! # Treasure Hunt Terminal Client
//!
//! Thin adapter between a terminal and the treasure-hunt server. It prints
//! every line the server sends, forwards every line typed by the user, and
//! keeps a parsed [`view::ClientView`] of the latest world snapshot for
//! status logging. There is no rendering beyond plain text.
//!
//! ## Module Organization
//!
//! - `network`: TCP connection and the stdin/socket pump
//! - `view`: incremental parsing of server lines into snapshots and events
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:12345").await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod view;
