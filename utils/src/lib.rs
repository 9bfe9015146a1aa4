//! Small helpers shared across the seqstore workspace.

mod human_size;

pub use human_size::human_readable_bytes;
