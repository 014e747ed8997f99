#![no_main]

use dagv_types::ContentId;
use libfuzzer_sys::fuzz_target;

// Fuzz target: ContentId string and binary decoders.
//
// Only canonical input may decode, so anything accepted must re-encode to
// exactly the input it came from.
fuzz_target!(|data: &[u8]| {
    if let Ok(cid) = ContentId::from_bytes(data) {
        assert_eq!(cid.to_bytes(), data);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        match ContentId::decode(text) {
            Ok(cid) => assert_eq!(cid.to_string(), text),
            Err(defect) => assert_eq!(defect.input, text),
        }
    }
});
