//! exporter-rcon — remote console client.
//!
//! Speaks the Source-style RCON protocol used by game servers such as
//! Factorio: length-prefixed little-endian packets over TCP, a password
//! handshake, then one request/response exchange per command.
//!
//! # Architecture
//!
//! ```text
//! RemoteConsole (trait)
//!   └── RconClient
//!         ├── connect + authenticate (fresh session per batch)
//!         ├── Packet::encode() / read_packet()
//!         └── send_commands() → label → reply
//! ```

pub mod client;
pub mod error;
pub mod packet;

pub use client::{RconClient, RemoteConsole};
pub use error::{RconError, RconResult};
pub use packet::{Packet, PacketType};
