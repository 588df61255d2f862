use std::collections::HashMap;
use std::hash::Hasher;
use std::{fs::File, io::BufWriter, path::Path};

use serde::Serialize;
use twox_hash::XxHash64;

use crate::containers::entry::IcoEntry;
use crate::containers::reader::Directory;
use crate::error::Result;
use crate::icon_names::icon_name;

/// Describes the contents of one container
#[derive(Serialize, Debug)]
pub struct Manifest {
    pub source: String,
    pub total_len: u64,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    /// Extracted file name, if the payload was written out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub width: u16,
    pub height: u16,
    pub offset: u32,
    pub length: u32,
    pub reserved: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xxh64: Option<String>,
}

impl ManifestEntry {
    pub fn new(index: usize, entry: &IcoEntry) -> Self {
        ManifestEntry {
            index,
            name: icon_name(index),
            file: None,
            width: entry.width(),
            height: entry.height(),
            offset: entry.offset(),
            length: entry.length(),
            reserved: to_hex(entry.reserved()),
            xxh64: None,
        }
    }

    pub fn with_payload(mut self, data: &[u8]) -> Self {
        self.xxh64 = Some(format!("{:016x}", payload_hash(data)));
        self
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.file = Some(file);
        self
    }
}

impl Manifest {
    pub fn new(source: String, total_len: u64) -> Self {
        Manifest {
            source,
            total_len,
            entries: Vec::new(),
        }
    }

    /// Manifest of the used directory slots, without payload information.
    pub fn from_directory(source: String, total_len: u64, directory: &Directory) -> Self {
        let mut manifest = Manifest::new(source, total_len);
        manifest.entries = directory
            .used()
            .map(|(index, entry)| ManifestEntry::new(index, entry))
            .collect();
        manifest
    }

    /// Groups of entry indices whose payload hashes are identical.
    pub fn duplicates(&self) -> Vec<Vec<usize>> {
        let mut by_hash: HashMap<&str, Vec<usize>> = HashMap::new();
        for entry in &self.entries {
            if let Some(hash) = &entry.xxh64 {
                by_hash.entry(hash.as_str()).or_default().push(entry.index);
            }
        }

        let mut groups: Vec<Vec<usize>> = by_hash
            .into_values()
            .filter(|indices| indices.len() > 1)
            .collect();
        groups.sort();
        groups
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Calculate a 64-bit hash of a payload for duplicate detection
pub fn payload_hash(data: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(data);
    hasher.finish()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
