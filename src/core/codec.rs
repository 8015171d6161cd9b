use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::config::{MAX_CONTAINER_SIZE, MAX_TAG_LENGTH};
use crate::core::container::Container;
use crate::error::{LevelError, Result};

/// Frames containers out of an async byte stream.
///
/// Header checks run as soon as the relevant bytes arrive, so a bogus length
/// prefix is rejected before the codec buffers anything on its behalf.
#[derive(Debug, Clone, Copy)]
pub struct ContainerCodec {
    max_size: usize,
}

impl ContainerCodec {
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for ContainerCodec {
    fn default() -> Self {
        Self::new(MAX_CONTAINER_SIZE)
    }
}

impl Decoder for ContainerCodec {
    type Item = Container;
    type Error = LevelError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < 4 {
            return Ok(None);
        }

        let payload_len = i32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        if payload_len <= 0 {
            return Err(LevelError::InvalidPayloadLength(payload_len));
        }

        let tag_header = 4 + payload_len as usize;
        if tag_header + 1 > self.max_size {
            return Err(LevelError::OversizedContainer(tag_header + 1));
        }
        if src.len() <= tag_header {
            src.reserve(tag_header + 1 - src.len());
            return Ok(None);
        }

        let tag_len = src[tag_header] as usize;
        if tag_len == 0 || tag_len > MAX_TAG_LENGTH {
            return Err(LevelError::InvalidTagLength(tag_len));
        }

        let total = tag_header + 1 + tag_len;
        if total > self.max_size {
            return Err(LevelError::OversizedContainer(total));
        }
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        trace!(total, "Framed container from stream");
        let frame = src.split_to(total);
        Container::from_bytes(&frame).map(Some)
    }
}

impl Encoder<Container> for ContainerCodec {
    type Error = LevelError;

    fn encode(&mut self, item: Container, dst: &mut BytesMut) -> Result<()> {
        if item.encoded_len() > self.max_size {
            return Err(LevelError::OversizedContainer(item.encoded_len()));
        }
        item.write_to(dst);
        Ok(())
    }
}
