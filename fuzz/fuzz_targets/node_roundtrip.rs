#![no_main]

use arbitrary::Arbitrary;
use dagv_types::{Codec, ContentId, DagNode};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    links: Vec<(bool, Vec<u8>)>,
    data: Vec<u8>,
}

// Fuzz target: encode an arbitrary node, decode it, compare.
fuzz_target!(|input: Input| {
    let links = input
        .links
        .iter()
        .map(|(raw, body)| {
            let codec = if *raw { Codec::Raw } else { Codec::DagNode };
            ContentId::for_block(codec, body)
        })
        .collect();
    let node = DagNode::new(links, input.data);
    let decoded = DagNode::decode(&node.encode()).expect("own encoding must decode");
    assert_eq!(decoded, node);
});
