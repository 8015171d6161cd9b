use bytes::{Buf, BufMut, BytesMut};

use crate::config::{FORMAT_VERSION, IV_LENGTH, MAGIC_BYTES};
use crate::error::{LevelError, Result};

/// Bytes preceding the ciphertext: magic, version, IV length, IV, cipher length
pub const FRAME_HEADER_LEN: usize = 4 + 1 + 1 + IV_LENGTH + 4;

/// The authenticated inner block carrying the IV and ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedBlock {
    pub version: u8,
    pub iv: [u8; IV_LENGTH],
    pub cipher: Vec<u8>,
}

impl FramedBlock {
    /// Build a current-version block
    pub fn new(iv: [u8; IV_LENGTH], cipher: Vec<u8>) -> Self {
        Self {
            version: FORMAT_VERSION,
            iv,
            cipher,
        }
    }

    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + self.cipher.len());
        buf.put_slice(&MAGIC_BYTES);
        buf.put_u8(self.version);
        buf.put_u8(IV_LENGTH as u8);
        buf.put_slice(&self.iv);
        buf.put_i32_le(self.cipher.len() as i32);
        buf.put_slice(&self.cipher);
        buf.to_vec()
    }

    /// Parse a framed block.
    ///
    /// Only call this on bytes whose tag has already been verified.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut buf = data;

        if buf.remaining() < MAGIC_BYTES.len() + 2 {
            return Err(LevelError::TruncatedContainer);
        }

        let mut magic = [0u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != MAGIC_BYTES {
            return Err(LevelError::InvalidMagic);
        }

        let version = buf.get_u8();
        if version != FORMAT_VERSION {
            return Err(LevelError::UnsupportedVersion(version));
        }

        let iv_len = buf.get_u8();
        if iv_len as usize != IV_LENGTH {
            return Err(LevelError::InvalidIvLength(iv_len));
        }
        if buf.remaining() < IV_LENGTH + 4 {
            return Err(LevelError::TruncatedContainer);
        }
        let mut iv = [0u8; IV_LENGTH];
        buf.copy_to_slice(&mut iv);

        let cipher_len = buf.get_i32_le();
        if cipher_len <= 0 || cipher_len as usize > buf.remaining() {
            return Err(LevelError::InvalidCipherLength(cipher_len));
        }
        let cipher = buf[..cipher_len as usize].to_vec();

        Ok(Self {
            version,
            iv,
            cipher,
        })
    }
}
