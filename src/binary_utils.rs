use std::io::{self, Read, Seek, SeekFrom};

use crate::error::{Error, Result};

/// Largest value a 24-bit field can hold.
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Reads a 16-bit big-endian value at `pos`.
pub fn read_u16_be(data: &[u8], pos: usize) -> u16 {
    (data[pos] as u16) << 8 | data[pos + 1] as u16
}

/// Reads a 24-bit big-endian value at `pos` into the low 24 bits of a u32.
pub fn read_u24_be(data: &[u8], pos: usize) -> u32 {
    (data[pos] as u32) << 16 | (data[pos + 1] as u32) << 8 | data[pos + 2] as u32
}

/// Reads a 32-bit big-endian value at `pos`.
pub fn read_u32_be(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

pub fn write_u16_be(data: &mut [u8], value: u16, pos: usize) {
    data[pos] = (value >> 8) as u8;
    data[pos + 1] = (value & 0xFF) as u8;
}

/// Writes the low 24 bits of `value` big-endian at `pos`.
/// Fails instead of truncating when the value needs more than 24 bits.
pub fn write_u24_be(data: &mut [u8], value: u32, pos: usize, field: &'static str) -> Result<()> {
    if value > U24_MAX {
        return Err(Error::FieldOverflow {
            field,
            value: value as u64,
            bits: 24,
        });
    }

    data[pos] = ((value >> 16) & 0xFF) as u8;
    data[pos + 1] = ((value >> 8) & 0xFF) as u8;
    data[pos + 2] = (value & 0xFF) as u8;
    Ok(())
}

pub fn write_u32_be(data: &mut [u8], value: u32, pos: usize) {
    data[pos..pos + 4].copy_from_slice(&value.to_be_bytes());
}

/// Narrows a wide value into a u32 field, rejecting anything that would not fit.
pub fn checked_u32(value: u64, field: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FieldOverflow {
        field,
        value,
        bits: 32,
    })
}

/// Total size of a seekable stream. The stream position is restored afterwards.
pub fn stream_len<S: Seek>(stream: &mut S) -> io::Result<u64> {
    let current = stream.stream_position()?;
    let end = stream.seek(SeekFrom::End(0))?;
    if current != end {
        stream.seek(SeekFrom::Start(current))?;
    }
    Ok(end)
}

/// Reads up to `length` bytes. A shorter result means the stream ran out.
pub fn read_up_to<R: Read>(reader: &mut R, length: usize) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(length);
    reader.take(length as u64).read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_big_endian_fields() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        assert_eq!(read_u16_be(&data, 0), 0x1234);
        assert_eq!(read_u24_be(&data, 1), 0x34_5678);
        assert_eq!(read_u32_be(&data, 1), 0x3456_789A);
    }

    #[test]
    fn u24_write_keeps_neighbours() {
        let mut data = [0xAAu8; 5];
        write_u24_be(&mut data, 0x0A_0B0C, 1, "length").unwrap();
        assert_eq!(data, [0xAA, 0x0A, 0x0B, 0x0C, 0xAA]);
        assert_eq!(read_u24_be(&data, 1), 0x0A_0B0C);
    }

    #[test]
    fn u24_write_rejects_wide_values() {
        let mut data = [0u8; 3];
        write_u24_be(&mut data, U24_MAX, 0, "length").unwrap();
        assert_eq!(data, [0xFF; 3]);

        let err = write_u24_be(&mut data, U24_MAX + 1, 0, "length").unwrap_err();
        assert!(matches!(
            err,
            Error::FieldOverflow {
                field: "length",
                bits: 24,
                ..
            }
        ));
        // Untouched on failure
        assert_eq!(data, [0xFF; 3]);
    }

    #[test]
    fn checked_u32_bounds() {
        assert_eq!(checked_u32(u32::MAX as u64, "offset").unwrap(), u32::MAX);
        assert!(checked_u32(u32::MAX as u64 + 1, "offset").is_err());
    }

    #[test]
    fn stream_len_restores_position() {
        let mut cursor = Cursor::new(vec![0u8; 42]);
        cursor.set_position(7);
        assert_eq!(stream_len(&mut cursor).unwrap(), 42);
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn read_up_to_stops_at_eof() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        assert_eq!(read_up_to(&mut cursor, 2).unwrap(), vec![1, 2]);
        assert_eq!(read_up_to(&mut cursor, 10).unwrap(), vec![3]);
    }
}
