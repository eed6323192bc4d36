//! RCON packet framing.
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────┬──────┐
//! │ size i32 │  id i32  │ type i32 │ body (utf-8) │ 0x00 │ 0x00
//! └──────────┴──────────┴──────────┴──────────────┴──────┘
//!   size counts everything after itself; all integers little-endian.
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{RconError, RconResult};

/// Smallest legal frame: id + type + two terminators.
const MIN_FRAME: usize = 10;

/// Frames above this are treated as a corrupt stream.
pub const MAX_FRAME: usize = 4 * 1024 * 1024;

/// Packet id the server uses to signal a failed login.
pub const AUTH_FAILED_ID: i32 = -1;

/// RCON packet types.
///
/// Code 2 means "execute command" from client to server and "auth
/// response" from server to client; decoded packets always use
/// [`PacketType::AuthResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Auth,
    AuthResponse,
    ExecCommand,
    ResponseValue,
}

impl PacketType {
    pub fn code(self) -> i32 {
        match self {
            PacketType::Auth => 3,
            PacketType::AuthResponse | PacketType::ExecCommand => 2,
            PacketType::ResponseValue => 0,
        }
    }

    fn from_code(code: i32) -> RconResult<Self> {
        match code {
            3 => Ok(PacketType::Auth),
            2 => Ok(PacketType::AuthResponse),
            0 => Ok(PacketType::ResponseValue),
            other => Err(RconError::Protocol(format!("unknown packet type {other}"))),
        }
    }
}

/// A single RCON packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: PacketType,
    pub body: String,
}

impl Packet {
    pub fn new(id: i32, kind: PacketType, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    /// Serialize into a length-prefixed frame.
    pub fn encode(&self) -> BytesMut {
        let body = self.body.as_bytes();
        let size = MIN_FRAME + body.len();

        let mut buf = BytesMut::with_capacity(4 + size);
        buf.put_i32_le(size as i32);
        buf.put_i32_le(self.id);
        buf.put_i32_le(self.kind.code());
        buf.put_slice(body);
        buf.put_u8(0);
        buf.put_u8(0);
        buf
    }

    /// Parse a frame body (everything after the size prefix).
    pub fn decode(mut frame: &[u8]) -> RconResult<Self> {
        if frame.len() < MIN_FRAME {
            return Err(RconError::Protocol(format!(
                "frame of {} bytes is too short",
                frame.len()
            )));
        }

        let id = frame.get_i32_le();
        let kind = PacketType::from_code(frame.get_i32_le())?;

        // Some servers pad with extra terminators; strip them all.
        let end = frame
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);
        let body = String::from_utf8_lossy(&frame[..end]).into_owned();

        Ok(Self { id, kind, body })
    }
}

/// Read one packet from the stream.
pub async fn read_packet<R>(reader: &mut R) -> RconResult<Packet>
where
    R: AsyncRead + Unpin,
{
    let size = match reader.read_i32_le().await {
        Ok(size) => size,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Err(RconError::Closed),
        Err(e) => return Err(e.into()),
    };

    let size = usize::try_from(size)
        .ok()
        .filter(|s| (MIN_FRAME..=MAX_FRAME).contains(s))
        .ok_or_else(|| RconError::Protocol(format!("invalid frame size {size}")))?;

    let mut frame = vec![0u8; size];
    reader.read_exact(&mut frame).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            RconError::Closed
        } else {
            RconError::Io(e)
        }
    })?;

    Packet::decode(&frame)
}

/// Write one packet to the stream.
pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> RconResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&packet.encode()).await?;
    writer.flush().await?;
    Ok(())
}
