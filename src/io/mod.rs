//! Board persistence: the bit-packed board encoding and the compressed text
//! container around it.

use crate::{board::Pcb, error::DecodeError, parts::PartLibrary};

mod binary;
pub mod container;

pub use binary::{decode, encode};

/// Encodes, compresses and base64-encodes a board.
pub fn board_to_text(board: &Pcb, compression_level: u32) -> crate::Result<String> {
    let compressed = container::compress(&encode(board), compression_level)?;
    Ok(container::to_base64(&compressed))
}

pub fn board_from_text(text: &str, library: &PartLibrary) -> crate::Result<Pcb> {
    let compressed = container::from_base64(text)?;
    let bytes = container::decompress(&compressed)?;
    Ok(decode(&bytes, library)?)
}

#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Cursor over a byte slice. Reads past the end fail with
/// [`DecodeError::UnexpectedEnd`].
#[derive(Debug)]
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.bytes.len()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .bytes
            .get(self.offset)
            .ok_or(DecodeError::UnexpectedEnd {
                offset: self.offset,
            })?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let high = self.read_u8()?;
        let low = self.read_u8()?;
        Ok(u16::from_be_bytes([high, low]))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{parts::test::test_library, vector::Vec2i, Direction};

    #[test]
    fn reader_reports_offsets() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0x8102);
        writer.write_u8(7);
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![0x81, 0x02, 7]);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u16().unwrap(), 0x8102);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert!(reader.is_empty());
        assert!(matches!(
            reader.read_u8(),
            Err(DecodeError::UnexpectedEnd { offset: 3 })
        ));
    }

    #[test]
    fn text_round_trip() {
        let library = test_library();
        let mut board = Pcb::with_size(3, 2);
        board.place(library.part("resistor", 1).unwrap(), Vec2i::new(2, 0));
        board.etch(Vec2i::new(0, 1), Direction::East);
        board.etch(Vec2i::new(1, 1), Direction::East);

        let text = board_to_text(&board, 6).unwrap();
        let decoded = board_from_text(&text, &library).unwrap();
        assert_eq!(encode(&decoded), encode(&board));
        assert!(board_from_text("@@@", &library).is_err());
        assert!(board_from_text("AAAA", &library).is_err());
    }
}
