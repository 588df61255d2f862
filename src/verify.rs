use std::fmt;
use std::io::{Read, Seek};

use log::debug;

use crate::containers::reader::IcoReader;
use crate::error::Result;
use crate::formats::jpeg::decoded_dimensions;

/// Something wrong with a single entry of an otherwise readable container.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// Payload runs past the end of the file
    PastEof { index: usize, end: u64, total_len: u64 },
    /// Payload shares bytes with a lower-offset entry
    Overlap { index: usize, other: usize },
    /// Payload does not start after the directory
    InsideDirectory { index: usize, offset: u32 },
    Undecodable { index: usize, reason: String },
    DimensionMismatch {
        index: usize,
        recorded: (u16, u16),
        decoded: (u32, u32),
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::PastEof {
                index,
                end,
                total_len,
            } => write!(
                f,
                "entry {} ends at {} but the file is {} bytes",
                index, end, total_len
            ),
            Finding::Overlap { index, other } => {
                write!(f, "entry {} overlaps entry {}", index, other)
            }
            Finding::InsideDirectory { index, offset } => {
                write!(f, "entry {} points into the directory (offset {})", index, offset)
            }
            Finding::Undecodable { index, reason } => {
                write!(f, "entry {} does not decode: {}", index, reason)
            }
            Finding::DimensionMismatch {
                index,
                recorded,
                decoded,
            } => write!(
                f,
                "entry {} is recorded as {}x{} but decodes as {}x{}",
                index, recorded.0, recorded.1, decoded.0, decoded.1
            ),
        }
    }
}

/// Check layout and payloads of every used entry.
///
/// Layout problems are found from the directory alone; payloads are only decoded for
/// entries that fit inside the file.
pub fn verify_container<R: Read + Seek>(reader: &mut IcoReader<R>) -> Result<Vec<Finding>> {
    let total_len = reader.total_len();
    let directory_len = crate::containers::DIRECTORY_SIZE as u32;
    let mut findings = Vec::new();

    let mut spans: Vec<(u64, u64, usize)> = Vec::new();
    for (index, entry) in reader.directory().used() {
        let start = entry.offset() as u64;
        let end = start + entry.length() as u64;
        if entry.offset() < directory_len {
            findings.push(Finding::InsideDirectory {
                index,
                offset: entry.offset(),
            });
        }
        if end > total_len {
            findings.push(Finding::PastEof {
                index,
                end,
                total_len,
            });
        }
        spans.push((start, end, index));
    }

    spans.sort();
    // Furthest end so far, and the entry it belongs to
    let mut reach: Option<(u64, usize)> = None;
    for &(start, end, index) in &spans {
        match reach {
            Some((reach_end, other)) if start < reach_end => {
                findings.push(Finding::Overlap { index, other });
                if end > reach_end {
                    reach = Some((end, index));
                }
            }
            Some((reach_end, _)) if end <= reach_end => {}
            _ => reach = Some((end, index)),
        }
    }

    let used: Vec<(usize, (u16, u16))> = reader
        .directory()
        .used()
        .map(|(index, entry)| (index, (entry.width(), entry.height())))
        .collect();

    for (index, recorded) in used {
        let data = match reader.payload(index) {
            Ok(Some(data)) => data,
            // Already reported as a layout problem
            Ok(None) => continue,
            Err(e) if e.is_recoverable() => continue,
            Err(e) => return Err(e),
        };

        match decoded_dimensions(&data) {
            Ok(decoded) => {
                debug!("Entry {} decodes as {}x{}", index, decoded.0, decoded.1);
                if decoded != (recorded.0 as u32, recorded.1 as u32) {
                    findings.push(Finding::DimensionMismatch {
                        index,
                        recorded,
                        decoded,
                    });
                }
            }
            Err(e) => findings.push(Finding::Undecodable {
                index,
                reason: e.to_string(),
            }),
        }
    }

    Ok(findings)
}
