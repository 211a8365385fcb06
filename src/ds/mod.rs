mod entry_list;
pub mod hashed_queue;
pub mod reference_trace;
mod slot_arena;

pub use hashed_queue::HashedQueue;
pub use reference_trace::ReferenceTrace;
