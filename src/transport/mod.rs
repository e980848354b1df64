/// Filesystem helpers for source discovery and partition writes.
pub mod fs;
