//! Just enough JPEG to size an icon.

use std::io::{Cursor, Read};

use image::GenericImageView;

use crate::error::Result;

/// Start of image
const SOI: [u8; 2] = [0xFF, 0xD8];
const MARKER_PREFIX: u8 = 0xFF;
/// Baseline start of frame (SOF0)
const SOF0: u8 = 0xC0;
/// Segment length (2), sample precision (1), height (2), width (2), components (1)
const SOF_BLOCK_LEN: usize = 8;
const SOF_HEIGHT_POS: usize = 3;
const SOF_WIDTH_POS: usize = 5;

pub fn has_soi(data: &[u8]) -> bool {
    data.starts_with(&SOI)
}

/// Scan for the SOF0 marker and return `(width, height)` from the frame header.
///
/// The reader is left just past the 8-byte block that follows the marker. Returns `None`
/// when the marker never shows up or the reader fails.
pub fn scan_sof0<R: Read>(reader: &mut R) -> Option<(u16, u16)> {
    let mut bytes = reader.by_ref().bytes();
    let mut previous = None;

    loop {
        let byte = bytes.next()?.ok()?;
        if previous == Some(MARKER_PREFIX) && byte == SOF0 {
            break;
        }
        previous = Some(byte);
    }
    drop(bytes);

    // A frame header cut short by EOF reads as zeros
    let mut block = [0u8; SOF_BLOCK_LEN];
    let mut filled = 0;
    while filled < SOF_BLOCK_LEN {
        match reader.read(&mut block[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return None,
        }
    }

    let height = u16::from_be_bytes([block[SOF_HEIGHT_POS], block[SOF_HEIGHT_POS + 1]]);
    let width = u16::from_be_bytes([block[SOF_WIDTH_POS], block[SOF_WIDTH_POS + 1]]);
    Some((width, height))
}

/// Like [`scan_sof0`], but falls back to `(0, 0)` when the dimensions cannot be found.
pub fn scan_dimensions<R: Read>(reader: &mut R) -> (u16, u16) {
    scan_sof0(reader).unwrap_or_else(|| {
        log::warn!("No SOF0 marker found, using 0x0 dimensions");
        (0, 0)
    })
}

/// Fully decode an image and return its `(width, height)`.
pub fn decoded_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let image = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;
    Ok(image.dimensions())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{self, Read};

    /// Marker-level JPEG skeleton. Scannable, not decodable.
    pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    /// A real, decodable JPEG.
    pub(crate) fn encoded_jpeg(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![0x80u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut out)
            .encode(&pixels, width, height, image::ColorType::Rgb8)
            .unwrap();
        out
    }

    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "closed"))
        }
    }

    #[test]
    fn reads_frame_header() {
        let data = [
            0x12, 0x34, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64, 0x00, 0xC8, 0x03, 0x99,
        ];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(scan_sof0(&mut cursor), Some((200, 100)));
        // Left just past the frame block
        assert_eq!(cursor.position(), 12);
    }

    #[test]
    fn skeleton_dimensions() {
        let data = tiny_jpeg(160, 120);
        assert_eq!(scan_dimensions(&mut Cursor::new(&data)), (160, 120));
    }

    #[test]
    fn other_markers_are_ignored() {
        // DHT (FF C4) and a stray C0 not preceded by FF
        let data = [
            0xFF, 0xC4, 0xC0, 0x00, 0xFF, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x01, 0x00, 0x02, 0x00,
            0x01,
        ];
        assert_eq!(scan_sof0(&mut Cursor::new(&data[..])), Some((0x200, 0x100)));
    }

    #[test]
    fn missing_marker_falls_back_to_zero() {
        let data = [0xFF, 0xD8, 0xFF, 0xC4, 0x00, 0x00];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(scan_sof0(&mut cursor), None);
        cursor.set_position(0);
        assert_eq!(scan_dimensions(&mut cursor), (0, 0));
        assert_eq!(scan_dimensions(&mut Cursor::new(&[][..])), (0, 0));
    }

    #[test]
    fn unreadable_stream_is_zero() {
        assert_eq!(scan_dimensions(&mut Unreadable), (0, 0));
    }

    #[test]
    fn truncated_frame_block_reads_zeros() {
        let data = [0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x64];
        assert_eq!(scan_sof0(&mut Cursor::new(&data[..])), Some((0, 100)));
    }

    #[test]
    fn scanner_agrees_with_decoder() {
        let data = encoded_jpeg(24, 16);
        assert!(has_soi(&data));
        assert_eq!(scan_dimensions(&mut Cursor::new(&data)), (24, 16));
        assert_eq!(decoded_dimensions(&data).unwrap(), (24, 16));
    }

    #[test]
    fn decoder_rejects_garbage() {
        assert!(decoded_dimensions(&tiny_jpeg(8, 8)).is_err());
    }
}
