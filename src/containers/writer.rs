use std::io::Write;

use log::{debug, info, warn};

use crate::binary_utils::checked_u32;
use crate::containers::entry::IcoEntry;
use crate::containers::{DIRECTORY_SIZE, ENTRY_SIZE, MAX_ENTRIES};
use crate::error::{Error, Result};

/// Collects entries by slot index and lays them out as a container.
///
/// Building is two passes: every offset is worked out first, then the directory and the
/// payloads are written. Nothing is emitted unless the whole layout is valid.
#[derive(Clone, Debug)]
pub struct IcoBuilder {
    slots: Vec<Option<IcoEntry>>,
}

impl Default for IcoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IcoBuilder {
    pub fn new() -> Self {
        IcoBuilder {
            slots: vec![None; MAX_ENTRIES],
        }
    }

    /// Put an entry in a slot, returning whatever was there before.
    pub fn insert(&mut self, index: usize, entry: IcoEntry) -> Result<Option<IcoEntry>> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange(index))?;
        Ok(slot.replace(entry))
    }

    /// Turn raw file contents into an entry and store it at `index`.
    pub fn insert_source(&mut self, index: usize, data: Vec<u8>) -> Result<Option<IcoEntry>> {
        if index >= MAX_ENTRIES {
            return Err(Error::IndexOutOfRange(index));
        }
        let entry = IcoEntry::from_source(data)?;
        self.insert(index, entry)
    }

    pub fn remove(&mut self, index: usize) -> Option<IcoEntry> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&IcoEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &IcoEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entry| (index, entry)))
    }

    /// Work out where every payload goes without changing anything.
    fn layout(&self) -> Result<Vec<Option<u32>>> {
        let mut cursor = DIRECTORY_SIZE as u64;
        let mut offsets = Vec::with_capacity(MAX_ENTRIES);

        for (index, slot) in self.slots.iter().enumerate() {
            let Some(entry) = slot else {
                offsets.push(None);
                continue;
            };

            if entry.length() as usize != entry.data().len() {
                return Err(Error::LengthMismatch {
                    index,
                    recorded: entry.length(),
                    payload: entry.data().len(),
                });
            }

            offsets.push(Some(checked_u32(cursor, "offset")?));
            cursor += entry.data().len() as u64;
        }

        // The end of the last payload must still be addressable
        checked_u32(cursor, "offset")?;
        Ok(offsets)
    }

    /// Assign final offsets to every present entry.
    pub fn finalize_offsets(&mut self) -> Result<()> {
        let offsets = self.layout()?;
        for (slot, offset) in self.slots.iter_mut().zip(offsets) {
            if let (Some(entry), Some(offset)) = (slot.as_mut(), offset) {
                entry.set_offset(offset);
            }
        }
        Ok(())
    }

    /// Serialise the container: 4096-byte directory followed by payloads in index order.
    pub fn build(&mut self) -> Result<Vec<u8>> {
        self.finalize_offsets()?;

        // Encode every record before producing any output
        let mut directory = Vec::with_capacity(DIRECTORY_SIZE);
        let mut payload_len = 0usize;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(entry) => {
                    debug!("Index: {} - {}", index, entry);
                    directory.extend_from_slice(&entry.to_bytes()?);
                    payload_len += entry.data().len();
                }
                None => directory.extend_from_slice(&[0u8; ENTRY_SIZE]),
            }
        }
        debug_assert_eq!(directory.len(), DIRECTORY_SIZE);

        let mut output = directory;
        output.reserve(payload_len);
        for (_, entry) in self.iter() {
            output.extend_from_slice(entry.data());
        }

        info!(
            "Built container with {} entries, {} bytes",
            self.len(),
            output.len()
        );
        Ok(output)
    }

    /// Build and write the whole container to `writer`.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let data = self.build()?;
        writer.write_all(&data)?;
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<(usize, IcoEntry)> for IcoBuilder {
    /// Later duplicates replace earlier ones; out-of-range indices are dropped.
    fn from_iter<I: IntoIterator<Item = (usize, IcoEntry)>>(iter: I) -> Self {
        let mut builder = IcoBuilder::new();
        for (index, entry) in iter {
            if let Err(e) = builder.insert(index, entry) {
                warn!("Dropping entry: {}", e);
            }
        }
        builder
    }
}
