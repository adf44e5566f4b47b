#![no_main]

use libfuzzer_sys::fuzz_target;
use lz77win::{compress, decompress, CodecConfig, MatchStrategy};

fuzz_target!(|data: &[u8]| {
    // First two bytes pick the window and strategy, the rest is the payload
    if data.len() < 2 {
        return;
    }
    let window = (u16::from_le_bytes([data[0], data[1]]) as usize & 0x0FFF).max(1);
    let strategy =
        if data[0] & 0x80 != 0 { MatchStrategy::BruteForce } else { MatchStrategy::HashChain };
    let config = CodecConfig::new(window).unwrap().with_strategy(strategy);
    let payload = &data[2..];

    let packed = compress(payload, &config).unwrap();
    let restored = decompress(&packed, &config).unwrap();
    assert_eq!(restored, payload);
});
