//! Reader and writer for the icon libraries (`*.ICO`) used by DWIN serial LCD panels.
//!
//! Despite the extension these are not Windows icons. A container is a 4096-byte
//! directory of 256 big-endian records followed by the JPEG payloads they point at.

pub mod binary_utils;
pub mod config;
pub mod containers;
pub mod error;
pub mod formats;
pub mod ico_creator;
pub mod ico_extractor;
pub mod icon_names;
pub mod manifest;
pub mod verify;

pub use containers::entry::IcoEntry;
pub use containers::reader::{extract_payload, read_directory, Directory, IcoReader};
pub use containers::writer::IcoBuilder;
pub use containers::{DIRECTORY_SIZE, ENTRY_SIZE, MAX_ENTRIES};
pub use error::{Error, Result};
