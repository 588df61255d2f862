pub mod entry;
pub mod reader;
pub mod writer;

/// Number of slots in every container directory.
pub const MAX_ENTRIES: usize = 256;
/// Size of one serialised directory record.
pub const ENTRY_SIZE: usize = 16;
/// The directory sits at the start of the file; payloads follow immediately.
pub const DIRECTORY_SIZE: usize = MAX_ENTRIES * ENTRY_SIZE;
