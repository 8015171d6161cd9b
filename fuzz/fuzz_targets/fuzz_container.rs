#![no_main]

use bytes::BytesMut;
use level_vault::core::codec::ContainerCodec;
use level_vault::core::frame::FramedBlock;
use level_vault::LevelCrypto;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let crypto = LevelCrypto::new();

    // Arbitrary bytes must never open, and must never panic
    assert!(crypto.decrypt(data).is_err());

    // Streaming decoder sees the same bytes
    let mut buf = BytesMut::from(data);
    let _ = ContainerCodec::default().decode_eof(&mut buf);

    // Frame parser on its own, as if the tag had verified
    let _ = FramedBlock::from_bytes(data);

    // Re-sealed arbitrary payloads authenticate but still must not panic
    if !data.is_empty() {
        if let Ok(container) = crypto.seal(data.to_vec()) {
            let _ = crypto.open(&container);
        }
    }
});
