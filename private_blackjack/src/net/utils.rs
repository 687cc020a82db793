use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum allowed frame size (64KiB). Snapshots for a full room are a
/// few hundred bytes, so anything larger is a misbehaving peer.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Read one length-prefixed frame.
///
/// The prefix is a little-endian `u32`. Oversized prefixes are rejected
/// with [`io::ErrorKind::InvalidData`] before anything is allocated.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_bytes = [0; 4];
    reader.read_exact(&mut len_bytes).await?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame size {len} exceeds maximum allowed size of {MAX_FRAME_SIZE} bytes"),
        ));
    }

    let mut buf = vec![0; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write one length-prefixed frame and flush it.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    if payload.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "frame size {} exceeds maximum allowed size of {MAX_FRAME_SIZE} bytes",
                payload.len()
            ),
        ));
    }

    // Prefix and payload go out in one write so a reader never sees a
    // length without its body because of a split send.
    let size = payload.len() as u32;
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&size.to_le_bytes());
    buf.extend_from_slice(payload);
    writer.write_all(&buf).await?;
    writer.flush().await
}
