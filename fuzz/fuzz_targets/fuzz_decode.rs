#![no_main]

use libfuzzer_sys::fuzz_target;
use lz77win::{decompress, CodecConfig};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes may fail to decode - that's OK
    // We're looking for panics/crashes, not errors
    let _ = decompress(data, &CodecConfig::default());
});
