//! # Tank Arena Server Library
//!
//! The authoritative server for a top-down arena tank game. It owns the only
//! true copy of every tank and bullet, applies player input as it arrives,
//! and broadcasts a full snapshot of the arena to every seated player on a
//! fixed cadence.
//!
//! ## Core Responsibilities
//!
//! ### Seats and Liveness
//! Up to four players hold a seat each. A seat is claimed by a connect
//! datagram and freed after five seconds without hearing from its player.
//! Connecting again from the same address gets the same seat back.
//!
//! ### Authoritative Simulation
//! Tank movement, wall collisions, bullet reflection and bullet hits are all
//! resolved here. Clients only report which keys they hold.
//!
//! ### State Broadcasting
//! Every broadcast tick produces one snapshot that is encoded once and sent
//! to every seat. Datagrams may be lost or reordered; the next snapshot
//! replaces whatever was missed.
//!
//! ## Architecture Design
//!
//! ### Single Task
//! The socket and the world live on one task. A short poll interval drains
//! every queued datagram without blocking, so input latency is bounded by
//! the poll period rather than the broadcast period. No locks are needed.
//!
//! ### Fixed-Layout Protocol
//! Messages are fixed-size little-endian records defined in the `shared`
//! crate. A datagram with an unknown length or a tag that does not fit its
//! length is dropped without a reply.
//!
//! ## Module Organization
//!
//! - `config`: runtime settings and the delta-time cap
//! - `error`: the crate error type
//! - `client_manager`: seats, addresses and heartbeat timeouts
//! - `tank`: tank movement and health
//! - `bullets`: the fixed-capacity bullet pool
//! - `game`: the world aggregate and the match outcome
//! - `network`: the socket and the poll/broadcast loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod bullets;
pub mod client_manager;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod tank;
