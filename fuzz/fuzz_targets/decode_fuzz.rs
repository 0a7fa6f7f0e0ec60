#![no_main]
use jimdecomp::engine::{DecodeStatus, decode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode to some result without panicking.
    let result = decode(data, 0);
    assert_eq!(result.end_offset, result.bytes_consumed);
    assert!(result.bytes_consumed <= data.len());
    if result.status == DecodeStatus::Completed {
        assert_eq!(data[result.end_offset - 1], 0xFF);
    }

    // Also from a start offset taken from the input itself.
    if let Some(&first) = data.first() {
        let start = first as usize % (data.len() + 1);
        let from_start = decode(data, start);
        assert_eq!(from_start.end_offset, start + from_start.bytes_consumed);
    }
});
