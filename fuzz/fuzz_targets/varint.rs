#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: decode_uvarint on arbitrary bytes.
//
// Catches bugs in:
// - Overlong encodings (more than 10 bytes, or a 10th byte above 1)
// - Non-minimal trailing zero groups
// - Empty and truncated input
fuzz_target!(|data: &[u8]| {
    if let Ok((value, used)) = dagv_wire::decode_uvarint(data) {
        assert!(used >= 1 && used <= data.len());
        assert_eq!(used, dagv_wire::uvarint_len(value));
    }
});
