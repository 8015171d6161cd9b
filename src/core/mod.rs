//! # Core Container Components
//!
//! Low-level framing for the level container, plus a streaming codec.
//!
//! This module owns the binary layout. It knows nothing about keys or
//! ciphers: the framed block is opaque ciphertext plus the metadata needed to
//! decrypt it, and the container is an opaque payload plus its tag.
//!
//! ## Components
//! - **FramedBlock**: magic, version, IV and ciphertext
//! - **Container**: length-prefixed framed block followed by its MAC tag
//! - **ContainerCodec**: Tokio codec that frames one container from a byte stream
//!
//! ## Wire Format
//! ```text
//! Container:   [PayloadLen(4)] [Payload(N)] [TagLen(1)] [Tag(M)]
//! FramedBlock: [Magic(4) "LVL1"] [Version(1)] [IvLen(1)] [Iv(16)] [CipherLen(4)] [Cipher(K)]
//! ```
//! All integers are little-endian.
//!
//! ## Security
//! - Every declared length is checked against the bytes actually available
//! - The tag must consume the buffer exactly; trailing bytes are rejected
//! - Maximum container size: 16MB (enforced by the codec before buffering)

pub mod codec;
pub mod container;
pub mod frame;
