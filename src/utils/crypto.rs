//! # Level Container Cryptography
//!
//! Encrypt-then-MAC sealing of arbitrary payloads into a [`Container`].
//!
//! - **Cipher**: AES-256-CBC with PKCS#7 padding, fresh random 16-byte IV per seal
//! - **MAC**: HMAC-SHA256 over the exact framed block bytes
//! - **Order on open**: container framing, then constant-time tag check, then
//!   framed block parsing, then decryption. Nothing about the framed block is
//!   interpreted before its tag verifies.
//!
//! ## Key Material
//! [`LevelCrypto::new`] uses two independent keys compiled into the binary, so
//! files exported by one build open in every other build. Anyone with access
//! to the binary can extract them: this deters casual editing of shipped level
//! files and is not a secret boundary. [`LevelCrypto::with_keys`] lets an
//! embedder supply its own keys; containers sealed that way only open with the
//! same keys.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::IV_LENGTH;
use crate::core::container::Container;
use crate::core::frame::FramedBlock;
use crate::error::{LevelError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag
pub const TAG_LENGTH: usize = 32;

/// AES block size; PKCS#7 always adds between 1 and 16 bytes
pub const BLOCK_SIZE: usize = 16;

const EMBEDDED_ENCRYPTION_KEY: [u8; 32] = [
    0x4c, 0x56, 0x4c, 0x2d, 0x65, 0x6e, 0x63, 0x2d, 0x9a, 0x1f, 0x73, 0xc4, 0x2e, 0xb8, 0x05, 0x61,
    0xd3, 0x7a, 0x48, 0x90, 0x1c, 0xe6, 0x5b, 0xaf, 0x33, 0x87, 0x0d, 0xf2, 0x6c, 0x19, 0xa4, 0x5e,
];

const EMBEDDED_MAC_KEY: [u8; 32] = [
    0x4c, 0x56, 0x4c, 0x2d, 0x6d, 0x61, 0x63, 0x2d, 0x27, 0xe9, 0x84, 0x3b, 0xc0, 0x5d, 0x12, 0xfa,
    0x68, 0xb1, 0x0e, 0x97, 0x4d, 0xa3, 0x7c, 0x26, 0xd8, 0x51, 0xef, 0x0a, 0x95, 0x3e, 0xc7, 0x14,
];

/// Seals and opens level containers
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LevelCrypto {
    enc_key: [u8; 32],
    mac_key: [u8; 32],
}

impl std::fmt::Debug for LevelCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelCrypto").finish_non_exhaustive()
    }
}

impl Default for LevelCrypto {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelCrypto {
    /// Crypto with the compiled-in keys
    pub fn new() -> Self {
        Self::with_keys(EMBEDDED_ENCRYPTION_KEY, EMBEDDED_MAC_KEY)
    }

    /// Crypto with caller-provided keys. The two keys should be independent.
    pub fn with_keys(enc_key: [u8; 32], mac_key: [u8; 32]) -> Self {
        Self { enc_key, mac_key }
    }

    /// Size of the container produced for a plaintext of `plaintext_len` bytes
    pub fn sealed_len(plaintext_len: usize) -> usize {
        let cipher_len = (plaintext_len / BLOCK_SIZE + 1) * BLOCK_SIZE;
        4 + crate::core::frame::FRAME_HEADER_LEN + cipher_len + 1 + TAG_LENGTH
    }

    /// Generate a cryptographically secure random IV
    pub fn generate_iv() -> Result<[u8; IV_LENGTH]> {
        let mut iv = [0u8; IV_LENGTH];
        getrandom::fill(&mut iv).map_err(|e| LevelError::RandomnessUnavailable(e.to_string()))?;
        Ok(iv)
    }

    /// Encrypt `plaintext` and wrap it in an authenticated container.
    ///
    /// Empty plaintexts are allowed and produce one block of padding.
    #[instrument(skip(self, plaintext), fields(len = plaintext.len()), level = "debug")]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let iv = Self::generate_iv()?;
        let cipher = Aes256CbcEnc::new_from_slices(&self.enc_key, &iv)
            .map_err(|_| LevelError::EncryptionFailure)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let frame = FramedBlock::new(iv, cipher);
        let container = self.seal(frame.to_bytes())?;
        debug!(container_len = container.encoded_len(), "Sealed level container");
        Ok(container.to_bytes())
    }

    /// Verify and decrypt a serialized container.
    ///
    /// Every malformed, truncated or tampered input yields an `Err`; this never panics.
    #[instrument(skip(self, data), fields(len = data.len()), level = "debug")]
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let container = Container::from_bytes(data)?;
        self.open(&container)
    }

    /// Attach a tag to already-framed bytes
    pub fn seal(&self, payload: Vec<u8>) -> Result<Container> {
        let tag = self.compute_tag(&payload)?;
        Ok(Container {
            payload,
            tag: tag.to_vec(),
        })
    }

    /// Authenticate a parsed container, then parse and decrypt its framed block
    pub fn open(&self, container: &Container) -> Result<Vec<u8>> {
        let expected = self.compute_tag(&container.payload)?;
        if !bool::from(expected.as_slice().ct_eq(container.tag.as_slice())) {
            warn!("Level container failed authentication");
            return Err(LevelError::AuthenticationFailed);
        }

        let frame = FramedBlock::from_bytes(&container.payload)?;
        Aes256CbcDec::new_from_slices(&self.enc_key, &frame.iv)
            .map_err(|_| LevelError::DecryptionFailure)?
            .decrypt_padded_vec_mut::<Pkcs7>(&frame.cipher)
            .map_err(|_| LevelError::DecryptionFailure)
    }

    fn compute_tag(&self, payload: &[u8]) -> Result<[u8; TAG_LENGTH]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.mac_key)
            .map_err(|_| LevelError::EncryptionFailure)?;
        mac.update(payload);
        let mut tag = [0u8; TAG_LENGTH];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(tag)
    }
}
