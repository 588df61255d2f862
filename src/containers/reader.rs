use std::io::{Read, Seek, SeekFrom};

use log::{debug, warn};

use crate::binary_utils::{read_up_to, stream_len};
use crate::containers::entry::IcoEntry;
use crate::containers::{DIRECTORY_SIZE, ENTRY_SIZE, MAX_ENTRIES};
use crate::error::{Error, Result};

/// The 256 decoded directory records of a container, in file order.
#[derive(Clone, Debug)]
pub struct Directory {
    entries: Vec<IcoEntry>,
}

impl Directory {
    /// Decode a full directory from the start of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < DIRECTORY_SIZE {
            return Err(Error::TruncatedDirectory {
                available: data.len(),
            });
        }

        let entries = data[..DIRECTORY_SIZE]
            .chunks_exact(ENTRY_SIZE)
            .map(IcoEntry::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Ok(Directory { entries })
    }

    pub fn get(&self, index: usize) -> Option<&IcoEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every slot with its index, used or not.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &IcoEntry)> {
        self.entries.iter().enumerate()
    }

    /// Slots holding a payload, in index order.
    pub fn used(&self) -> impl Iterator<Item = (usize, &IcoEntry)> {
        self.iter().filter(|(_, entry)| !entry.is_empty())
    }
}

impl std::ops::Index<usize> for Directory {
    type Output = IcoEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

/// Read the directory from position 0 of the stream.
pub fn read_directory<R: Read + Seek>(reader: &mut R) -> Result<Directory> {
    reader.seek(SeekFrom::Start(0))?;
    let data = read_up_to(reader, DIRECTORY_SIZE)?;
    let directory = Directory::from_bytes(&data)?;
    debug_assert_eq!(directory.len(), MAX_ENTRIES);
    Ok(directory)
}

/// Read the payload an entry points at.
///
/// Returns `Ok(None)` for unused slots and for lengths that could not possibly fit in a
/// stream of `total_len` bytes, without touching the stream.
pub fn extract_payload<R: Read + Seek>(
    reader: &mut R,
    entry: &IcoEntry,
    total_len: u64,
) -> Result<Option<Vec<u8>>> {
    if entry.is_empty() || entry.length() as u64 >= total_len {
        return Ok(None);
    }

    let expected = entry.length() as usize;
    reader.seek(SeekFrom::Start(entry.offset() as u64))?;
    let data = read_up_to(reader, expected)?;
    if data.len() < expected {
        return Err(Error::ShortRead {
            expected,
            available: data.len(),
        });
    }

    Ok(Some(data))
}

/// A container opened for reading.
pub struct IcoReader<R> {
    reader: R,
    total_len: u64,
    directory: Directory,
}

impl<R: Read + Seek> IcoReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let total_len = stream_len(&mut reader)?;
        let directory = read_directory(&mut reader)?;
        Ok(IcoReader {
            reader,
            total_len,
            directory,
        })
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn total_len(&self) -> u64 {
        self.total_len
    }

    /// Payload of the entry at `index`, or `None` if that slot is skipped.
    pub fn payload(&mut self, index: usize) -> Result<Option<Vec<u8>>> {
        let entry = self
            .directory
            .get(index)
            .ok_or(Error::IndexOutOfRange(index))?;
        extract_payload(&mut self.reader, entry, self.total_len)
    }

    /// Extract every usable entry in index order, with its payload attached.
    ///
    /// Entries whose payload runs past the end of the stream are logged and left out.
    pub fn extract_all(&mut self) -> Result<Vec<(usize, IcoEntry)>> {
        let mut extracted = Vec::new();

        for index in 0..self.directory.len() {
            let entry = &self.directory[index];
            if entry.is_empty() {
                continue;
            }

            match extract_payload(&mut self.reader, entry, self.total_len) {
                Ok(Some(data)) => {
                    debug!("Index: {} - {}", index, entry);
                    let mut entry = entry.clone();
                    entry.set_data(data);
                    extracted.push((index, entry));
                }
                Ok(None) => {
                    warn!(
                        "Skipping entry {}: length {} does not fit in a {} byte file",
                        index,
                        entry.length(),
                        self.total_len
                    );
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping entry {}: {}", index, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(extracted)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn record(width: u16, height: u16, offset: u32, length: u32) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[0..2].copy_from_slice(&width.to_be_bytes());
        buf[2..4].copy_from_slice(&height.to_be_bytes());
        buf[4..8].copy_from_slice(&offset.to_be_bytes());
        buf[8..11].copy_from_slice(&length.to_be_bytes()[1..]);
        buf
    }

    fn container(records: &[(usize, [u8; 16])], payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; DIRECTORY_SIZE];
        for (index, rec) in records {
            data[index * 16..index * 16 + 16].copy_from_slice(rec);
        }
        data.extend_from_slice(payload);
        data
    }

    /// Records every seek so tests can tell which offsets were touched.
    struct SeekLog<T> {
        inner: Cursor<T>,
        seeks: Vec<u64>,
    }

    impl<T: AsRef<[u8]>> Read for SeekLog<T> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl<T: AsRef<[u8]>> Seek for SeekLog<T> {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            let at = self.inner.seek(pos)?;
            if let SeekFrom::Start(_) = pos {
                self.seeks.push(at);
            }
            Ok(at)
        }
    }

    #[test]
    fn truncated_directory_is_rejected() {
        let data = vec![0u8; DIRECTORY_SIZE - 1];
        match read_directory(&mut Cursor::new(data)) {
            Err(Error::TruncatedDirectory { available }) => {
                assert_eq!(available, DIRECTORY_SIZE - 1)
            }
            other => panic!("expected TruncatedDirectory, got {:?}", other),
        }
    }

    #[test]
    fn empty_directory_reads_256_slots() {
        let mut cursor = Cursor::new(vec![0u8; DIRECTORY_SIZE]);
        let directory = read_directory(&mut cursor).unwrap();
        assert_eq!(directory.len(), MAX_ENTRIES);
        assert_eq!(directory.used().count(), 0);
    }

    #[test]
    fn extracts_in_index_order() {
        let data = container(
            &[
                (7, record(4, 4, 4096 + 3, 2)),
                (2, record(8, 8, 4096, 3)),
            ],
            b"abcXY",
        );
        let mut reader = IcoReader::new(Cursor::new(data)).unwrap();
        let extracted = reader.extract_all().unwrap();

        let indices: Vec<_> = extracted.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![2, 7]);
        assert_eq!(extracted[0].1.data(), b"abc");
        assert_eq!(extracted[1].1.data(), b"XY");
        assert_eq!(extracted[1].1.width(), 4);
    }

    #[test]
    fn empty_slot_is_never_read() {
        // Slot 3 has a plausible offset but no length
        let data = container(
            &[
                (1, record(1, 1, 4096, 4)),
                (3, record(1, 1, 4100, 0)),
                (4, record(1, 1, 4100, 4)),
            ],
            b"11114444",
        );
        let mut reader = IcoReader::new(SeekLog {
            inner: Cursor::new(data),
            seeks: Vec::new(),
        })
        .unwrap();
        reader.reader.seeks.clear();

        let extracted = reader.extract_all().unwrap();
        assert!(extracted.iter().all(|(i, _)| *i != 3));
        assert_eq!(extracted.len(), 2);

        let log = reader.into_inner();
        // Entries 1 and 4 only
        assert_eq!(log.seeks, vec![4096, 4100]);
    }

    #[test]
    fn oversized_length_is_skipped() {
        let data = container(&[(0, record(1, 1, 0, 0x00FF_FFFF))], b"x");
        let total = data.len() as u64;
        let mut cursor = Cursor::new(data);
        let directory = read_directory(&mut cursor).unwrap();
        assert_eq!(extract_payload(&mut cursor, &directory[0], total).unwrap(), None);

        // Exactly the file size is also rejected
        let data = container(&[(0, record(1, 1, 0, 4097))], b"x");
        let mut reader = IcoReader::new(Cursor::new(data)).unwrap();
        assert_eq!(reader.payload(0).unwrap(), None);
        assert!(reader.extract_all().unwrap().is_empty());
    }

    #[test]
    fn short_read_skips_only_that_entry() {
        let data = container(
            &[
                (0, record(1, 1, 4096, 2)),
                (1, record(1, 1, 4098, 50)),
            ],
            b"okpartial",
        );
        let mut reader = IcoReader::new(Cursor::new(data)).unwrap();
        assert!(matches!(
            reader.payload(1),
            Err(Error::ShortRead {
                expected: 50,
                available: 7
            })
        ));

        let extracted = reader.extract_all().unwrap();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].1.data(), b"ok");
    }

    #[test]
    fn payload_index_out_of_range() {
        let mut reader = IcoReader::new(Cursor::new(vec![0u8; DIRECTORY_SIZE])).unwrap();
        assert!(matches!(
            reader.payload(MAX_ENTRIES),
            Err(Error::IndexOutOfRange(256))
        ));
    }
}
