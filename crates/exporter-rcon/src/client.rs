//! RCON client sending authenticated command batches over TCP.
//!
//! Each batch opens a fresh connection, logs in, runs the commands one
//! after another and closes the socket. A dropped or refused connection
//! therefore only costs the batch it happened in; the next batch starts
//! from scratch.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{RconError, RconResult};
use crate::packet::{AUTH_FAILED_ID, Packet, PacketType, read_packet, write_packet};

/// Packet id used for the login request; command ids follow it.
const AUTH_REQUEST_ID: i32 = 1;

/// A console that answers a batch of labelled commands.
///
/// The returned map uses the same labels as the request.
pub trait RemoteConsole: Send + Sync {
    fn send_commands(
        &self,
        commands: &BTreeMap<String, String>,
    ) -> impl Future<Output = RconResult<HashMap<String, String>>> + Send;
}

/// Client for a Source-style RCON endpoint.
pub struct RconClient {
    address: String,
    password: String,
    timeout: Duration,
}

impl std::fmt::Debug for RconClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RconClient")
            .field("address", &self.address)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RconClient {
    /// Create a client for `address` (`host:port`).
    ///
    /// `timeout` bounds one whole batch: connect, login and every command.
    pub fn new(address: impl Into<String>, password: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
            timeout,
        }
    }

    async fn exchange(
        &self,
        commands: &BTreeMap<String, String>,
    ) -> RconResult<HashMap<String, String>> {
        let mut stream = TcpStream::connect(&self.address)
            .await
            .map_err(|source| RconError::Connect {
                address: self.address.clone(),
                source,
            })?;
        debug!(address = %self.address, "rcon connected");

        self.authenticate(&mut stream).await?;

        let mut replies = HashMap::with_capacity(commands.len());
        for ((label, command), id) in commands.iter().zip(AUTH_REQUEST_ID + 1..) {
            write_packet(&mut stream, &Packet::new(id, PacketType::ExecCommand, command.as_str()))
                .await?;
            let reply = read_reply(&mut stream, id).await?;
            trace!(%label, bytes = reply.len(), "rcon reply received");
            replies.insert(label.clone(), reply);
        }

        Ok(replies)
    }

    async fn authenticate(&self, stream: &mut TcpStream) -> RconResult<()> {
        write_packet(
            stream,
            &Packet::new(AUTH_REQUEST_ID, PacketType::Auth, self.password.as_str()),
        )
        .await?;

        loop {
            let packet = read_packet(stream).await?;
            match (packet.kind, packet.id) {
                (PacketType::AuthResponse, AUTH_FAILED_ID) => return Err(RconError::AuthRejected),
                (PacketType::AuthResponse, AUTH_REQUEST_ID) => {
                    debug!(address = %self.address, "rcon authenticated");
                    return Ok(());
                }
                (PacketType::AuthResponse, other) => {
                    return Err(RconError::Protocol(format!(
                        "auth response for unexpected id {other}"
                    )));
                }
                // Some servers send an empty value packet ahead of the auth response.
                _ => continue,
            }
        }
    }
}

impl RemoteConsole for RconClient {
    fn send_commands(
        &self,
        commands: &BTreeMap<String, String>,
    ) -> impl Future<Output = RconResult<HashMap<String, String>>> + Send {
        async move {
            tokio::time::timeout(self.timeout, self.exchange(commands))
                .await
                .map_err(|_| RconError::Timeout(self.timeout))?
        }
    }
}

/// Read packets until the response for `id` arrives.
async fn read_reply(stream: &mut TcpStream, id: i32) -> RconResult<String> {
    loop {
        let packet = read_packet(stream).await?;
        if packet.kind == PacketType::ResponseValue && packet.id == id {
            return Ok(packet.body);
        }
        trace!(expected = id, got = packet.id, "skipping unrelated rcon packet");
    }
}
