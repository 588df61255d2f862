//! One directory slot of a DWIN icon container.
//!
//! On disk every slot is a 16-byte big-endian record:
//!
//! | bytes    | field    |
//! |----------|----------|
//! | 0..2     | width    |
//! | 2..4     | height   |
//! | 4..8     | offset   |
//! | 8..11    | length   |
//! | 11..16   | reserved |

use std::fmt;
use std::io::Cursor;

use crate::binary_utils::{
    read_u16_be, read_u24_be, read_u32_be, write_u16_be, write_u24_be, write_u32_be, U24_MAX,
};
use crate::containers::ENTRY_SIZE;
use crate::error::{Error, Result};
use crate::formats::jpeg;

const WIDTH_POS: usize = 0;
const HEIGHT_POS: usize = 2;
const OFFSET_POS: usize = 4;
const LENGTH_POS: usize = 8;
const RESERVED_POS: usize = 11;
pub const RESERVED_LEN: usize = ENTRY_SIZE - RESERVED_POS;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcoEntry {
    width: u16,
    height: u16,
    offset: u32,
    length: u32,
    /// Unknown purpose, always zero in stock files. Carried through untouched.
    reserved: [u8; RESERVED_LEN],
    data: Vec<u8>,
}

impl IcoEntry {
    /// Decode a single directory record.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let record: &[u8; ENTRY_SIZE] = data
            .try_into()
            .map_err(|_| Error::MalformedEntry { len: data.len() })?;

        let mut reserved = [0u8; RESERVED_LEN];
        reserved.copy_from_slice(&record[RESERVED_POS..]);

        Ok(IcoEntry {
            width: read_u16_be(record, WIDTH_POS),
            height: read_u16_be(record, HEIGHT_POS),
            offset: read_u32_be(record, OFFSET_POS),
            length: read_u24_be(record, LENGTH_POS),
            reserved,
            data: Vec::new(),
        })
    }

    /// Encode this entry as a directory record. The payload is not part of it.
    pub fn to_bytes(&self) -> Result<[u8; ENTRY_SIZE]> {
        let mut buffer = [0u8; ENTRY_SIZE];
        write_u16_be(&mut buffer, self.width, WIDTH_POS);
        write_u16_be(&mut buffer, self.height, HEIGHT_POS);
        write_u32_be(&mut buffer, self.offset, OFFSET_POS);
        write_u24_be(&mut buffer, self.length, LENGTH_POS, "length")?;
        buffer[RESERVED_POS..].copy_from_slice(&self.reserved);
        Ok(buffer)
    }

    /// Build a fresh entry around a JPEG image, reading its dimensions from the SOF0 segment.
    ///
    /// Images without the marker get 0x0 dimensions.
    pub fn from_image(data: Vec<u8>) -> Result<Self> {
        let (width, height) = jpeg::scan_dimensions(&mut Cursor::new(&data));
        Self::with_dimensions(width, height, data)
    }

    pub fn with_dimensions(width: u16, height: u16, data: Vec<u8>) -> Result<Self> {
        if data.len() as u64 > U24_MAX as u64 {
            return Err(Error::FieldOverflow {
                field: "length",
                value: data.len() as u64,
                bits: 24,
            });
        }

        Ok(IcoEntry {
            width,
            height,
            offset: 0,
            length: data.len() as u32,
            reserved: [0; RESERVED_LEN],
            data,
        })
    }

    /// Turn the raw contents of a source file into an entry.
    ///
    /// A bare 16-byte directory record with a zero length is decoded as-is so a slot can
    /// be carried over with its reserved bytes; anything else is treated as an image.
    pub fn from_source(data: Vec<u8>) -> Result<Self> {
        if let Some(entry) = bare_record(&data)? {
            return Ok(entry);
        }
        Self::from_image(data)
    }

    /// Like [`IcoEntry::from_source`], but an image without a readable frame header is an
    /// error rather than a 0x0 entry.
    pub fn from_source_strict(data: Vec<u8>) -> Result<Self> {
        if let Some(entry) = bare_record(&data)? {
            return Ok(entry);
        }
        let (width, height) =
            jpeg::scan_sof0(&mut Cursor::new(&data)).ok_or(Error::MissingDimensions)?;
        Self::with_dimensions(width, height, data)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn reserved(&self) -> &[u8; RESERVED_LEN] {
        &self.reserved
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Slots with no payload are unused.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Sets where the payload lives in the finished container.
    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

/// A placeholder record. Sixteen bytes that claim a payload are payload themselves.
fn bare_record(data: &[u8]) -> Result<Option<IcoEntry>> {
    if data.len() != ENTRY_SIZE || jpeg::has_soi(data) {
        return Ok(None);
    }
    let entry = IcoEntry::from_bytes(data)?;
    Ok(entry.is_empty().then_some(entry))
}

impl fmt::Display for IcoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} - {} bytes - offset: {}",
            self.width, self.height, self.length, self.offset
        )
    }
}
