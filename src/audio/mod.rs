pub mod decode;
pub mod store;

pub use decode::decode;
pub use store::{BufferId, BufferStore, StoredBuffer};
