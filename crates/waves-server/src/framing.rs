//! Length-prefixed JSON frames over async streams.
//!
//! A frame is a 4-byte big-endian length followed by that many bytes of JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame accepted unless configured otherwise (64 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Read the raw body of the next frame.
///
/// Fails with `UnexpectedEof` when the stream ends before a frame starts,
/// and with `InvalidData` when the announced length exceeds `max_len`.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> Result<Vec<u8>, std::io::Error> {
    let len = reader.read_u32().await? as usize;
    if len > max_len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds limit of {} bytes", len, max_len),
        ));
    }
    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await?;
    Ok(buffer)
}

/// Read and decode the next frame.
pub async fn read_message<R, T>(reader: &mut R, max_len: usize) -> Result<T, std::io::Error>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let buffer = read_frame(reader, max_len).await?;
    serde_json::from_slice(&buffer)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Encode and write a message as one frame.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let data = serde_json::to_vec(message)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let len = u32::try_from(data.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("message of {} bytes does not fit in a frame", data.len()),
        )
    })?;
    writer.write_u32(len).await?;
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}
