use bytes::{Buf, BufMut, BytesMut};

use crate::config::MAX_TAG_LENGTH;
use crate::error::{LevelError, Result};

/// Smallest buffer worth inspecting: payload length prefix plus slack for the tag header
pub const MIN_CONTAINER_LEN: usize = 8;

/// The outer on-disk unit: framed block bytes followed by their MAC tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub payload: Vec<u8>,
    pub tag: Vec<u8>,
}

impl Container {
    /// Total serialized size
    pub fn encoded_len(&self) -> usize {
        4 + self.payload.len() + 1 + self.tag.len()
    }

    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.write_to(&mut buf);
        buf.to_vec()
    }

    /// Append the wire layout to an existing buffer
    pub fn write_to(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_i32_le(self.payload.len() as i32);
        buf.put_slice(&self.payload);
        buf.put_u8(self.tag.len() as u8);
        buf.put_slice(&self.tag);
    }

    /// Split a buffer into payload and tag.
    ///
    /// The tag must end exactly at the end of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_CONTAINER_LEN {
            return Err(LevelError::TruncatedContainer);
        }

        let mut buf = data;
        let payload_len = buf.get_i32_le();
        if payload_len <= 0 || payload_len as usize > buf.remaining() {
            return Err(LevelError::InvalidPayloadLength(payload_len));
        }
        let payload = buf[..payload_len as usize].to_vec();
        buf.advance(payload_len as usize);

        if !buf.has_remaining() {
            return Err(LevelError::TruncatedContainer);
        }
        let tag_len = buf.get_u8() as usize;
        if tag_len == 0 || tag_len > MAX_TAG_LENGTH || tag_len != buf.remaining() {
            return Err(LevelError::InvalidTagLength(tag_len));
        }
        let tag = buf.to_vec();

        Ok(Self { payload, tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Container {
        Container {
            payload: vec![0xAA; 10],
            tag: vec![0x55; 32],
        }
    }

    #[test]
    fn test_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes.len(), 4 + 10 + 1 + 32);
        assert_eq!(&bytes[..4], &10i32.to_le_bytes());
        assert_eq!(bytes[14], 32);
    }

    #[test]
    fn test_parse_accepts_own_output() {
        let container = sample();
        assert_eq!(
            Container::from_bytes(&container.to_bytes()).ok(),
            Some(container)
        );
    }

    #[test]
    fn test_rejects_short_input() {
        assert!(matches!(
            Container::from_bytes(&[1, 0, 0, 0, 0, 1, 0]),
            Err(LevelError::TruncatedContainer)
        ));
    }

    #[test]
    fn test_rejects_zero_and_negative_payload_length() {
        let mut bytes = sample().to_bytes();
        bytes[..4].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidPayloadLength(0))
        ));
        bytes[..4].copy_from_slice(&(-7i32).to_le_bytes());
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidPayloadLength(-7))
        ));
    }

    #[test]
    fn test_rejects_payload_overrun() {
        let mut bytes = sample().to_bytes();
        bytes[..4].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidPayloadLength(1000))
        ));
    }

    #[test]
    fn test_rejects_missing_tag_header() {
        let container = Container {
            payload: vec![1; 6],
            tag: vec![],
        };
        let mut bytes = container.to_bytes();
        bytes.pop();
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::TruncatedContainer)
        ));
    }

    #[test]
    fn test_rejects_bad_tag_lengths() {
        let mut bytes = sample().to_bytes();
        bytes[14] = 0;
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidTagLength(0))
        ));
        bytes[14] = 65;
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidTagLength(65))
        ));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = sample().to_bytes();
        bytes.push(0);
        assert!(matches!(
            Container::from_bytes(&bytes),
            Err(LevelError::InvalidTagLength(32))
        ));
    }
}
