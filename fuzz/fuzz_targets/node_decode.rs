#![no_main]

use dagv_types::DagNode;
use libfuzzer_sys::fuzz_target;

// Fuzz target: DagNode::decode on arbitrary bytes.
//
// Catches bugs in:
// - Link counts larger than the remaining input
// - Oversized link lengths
// - Truncated data sections and trailing bytes
fuzz_target!(|data: &[u8]| {
    if let Ok(node) = DagNode::decode(data) {
        assert_eq!(node.encode(), data);
    }
});
