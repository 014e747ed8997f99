#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: every u64 encodes to the one minimal form that decodes back.
fuzz_target!(|value: u64| {
    let mut buf = Vec::new();
    dagv_wire::encode_uvarint(value, &mut buf);
    let (decoded, used) = dagv_wire::decode_uvarint(&buf).expect("own encoding must decode");
    assert_eq!(decoded, value);
    assert_eq!(used, buf.len());
});
