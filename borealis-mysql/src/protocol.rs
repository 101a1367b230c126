//! Packet framing over an async byte stream.
//!
//! Every MySQL packet is prefixed by a 3-byte little-endian payload length
//! and a 1-byte sequence id. The handshake is a strict request/response
//! exchange, so both sides share one sequence counter that each packet must
//! match and advance. Timeouts are the surrounding channel's concern.

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{error::PacketTooBig, utils::invalid_data};

pub const PACKET_HEADER_SIZE: usize = 4;
pub const MAX_PAYLOAD_LENGTH: usize = (1 << 24) - 1;

/// Reads one packet, returning `None` when the peer closed the connection
/// (before the header or mid-packet; nothing can be answered either way).
pub async fn read_packet(
    mut reader: impl AsyncRead + Unpin,
    sequence: &mut u8,
) -> io::Result<Option<Bytes>> {
    let mut header = [0u8; PACKET_HEADER_SIZE];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let length = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
    if header[3] != *sequence {
        return Err(invalid_data(format!(
            "Packet sequence mismatch: expected {}, got {}",
            *sequence, header[3]
        )));
    }
    *sequence = sequence.wrapping_add(1);
    let mut body = vec![0u8; length];
    match reader.read_exact(&mut body).await {
        Ok(_) => Ok(Some(body.into())),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn write_packet(
    mut writer: impl AsyncWrite + Unpin,
    sequence: &mut u8,
    body: &[u8],
) -> io::Result<()> {
    if body.len() > MAX_PAYLOAD_LENGTH {
        return Err(invalid_data(PacketTooBig(body.len())));
    }
    let length = (body.len() as u32).to_le_bytes();
    let header = [length[0], length[1], length[2], *sequence];
    *sequence = sequence.wrapping_add(1);
    writer.write_all(&header).await?;
    writer.write_all(body).await?;
    writer.flush().await
}
