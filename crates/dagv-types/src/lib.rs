#![warn(clippy::pedantic)]

pub mod block_store;
pub mod cid;
pub mod codec;
pub mod error;
pub mod links;
pub mod node;

pub use block_store::BlockStore;
pub use cid::ContentId;
pub use codec::{Codec, HashCode};
pub use error::{CidError, DecodeDefect, NodeError, StoreError};
pub use links::{DagLinkResolver, LinkResolver};
pub use node::DagNode;
