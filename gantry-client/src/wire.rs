//! Wire format for Master connections
//!
//! Every frame is a 4-byte big-endian length prefix followed by a JSON
//! payload. Both directions use the same framing.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ClientError, Result};

/// Upper bound on a single frame. Job payloads are small; anything near
/// this size is a corrupt or hostile length prefix.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Serializes a message to its JSON payload, without the length prefix
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(message).map_err(ClientError::Encode)
}

/// Deserializes a message from a received payload
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(ClientError::Decode)
}

/// Writes one length-prefixed frame
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_LEN {
        return Err(ClientError::FrameTooLarge(payload.len()));
    }
    let len = payload.len() as u32;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one length-prefixed frame
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ClientError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::proto::MasterMessage;

    #[tokio::test]
    async fn test_read_write_round_trip() {
        let original = b"hello master";

        let mut buffer = Vec::new();
        write_message(&mut buffer, original).await.unwrap();

        // 4-byte prefix plus payload
        assert_eq!(buffer.len(), 4 + original.len());

        let mut cursor = std::io::Cursor::new(buffer);
        let back = read_message(&mut cursor).await.unwrap();
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn test_prefix_is_big_endian_length() {
        let payload = b"abc";

        let mut buffer = Vec::new();
        write_message(&mut buffer, payload).await.unwrap();

        let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        assert_eq!(len as usize, payload.len());
        assert_eq!(&buffer[4..], payload);
    }

    #[tokio::test]
    async fn test_oversized_prefix_is_rejected() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&(u32::MAX).to_be_bytes());
        frame.extend_from_slice(b"junk");

        let mut cursor = std::io::Cursor::new(frame);
        let err = read_message(&mut cursor).await.unwrap_err();
        assert!(matches!(err, ClientError::FrameTooLarge(_)));
    }

    #[tokio::test]
    async fn test_truncated_frame_is_a_transport_fault() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&8u32.to_be_bytes());
        frame.extend_from_slice(b"shor");

        let mut cursor = std::io::Cursor::new(frame);
        let err = read_message(&mut cursor).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_typed_round_trip_through_framing() {
        let message = MasterMessage::kill();
        let payload = encode(&message).unwrap();

        let mut buffer = Vec::new();
        write_message(&mut buffer, &payload).await.unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        let received = read_message(&mut cursor).await.unwrap();
        let back: MasterMessage = decode(&received).unwrap();
        assert_eq!(back, message);
    }
}
