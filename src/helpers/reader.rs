use crate::error::MergerError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

/// Signature of an OLE compound document (legacy `.xls` or an encrypted package)
const COMPOUND_FILE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// A unified reader over a local workbook file or an uploaded in-memory buffer
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Uploaded bytes; the buffer is shared so every open gets its own cursor
    Memory(Cursor<Arc<[u8]>>),
}

impl UnifiedReader {
    /// Opens a local file
    pub(crate) fn open(path: &Path) -> Result<UnifiedReader, MergerError> {
        let file = File::open(path)?;
        Ok(UnifiedReader::Local(BufReader::new(file)))
    }

    /// Wraps uploaded bytes; the cursor starts at offset 0
    pub(crate) fn memory(bytes: Arc<[u8]>) -> UnifiedReader {
        UnifiedReader::Memory(Cursor::new(bytes))
    }

    /// Checks for the compound document signature and rewinds to the start afterwards
    pub(crate) fn is_compound_file(&mut self) -> Result<bool, MergerError> {
        self.rewind()?;
        let mut signature = [0u8; 8];
        let mut filled = 0usize;
        while filled < signature.len() {
            match self.read(&mut signature[filled..])? {
                0 => break,
                count => filled += count,
            }
        }
        self.rewind()?;
        Ok(filled == signature.len() && signature == COMPOUND_FILE_SIGNATURE)
    }
}

impl Read for UnifiedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            UnifiedReader::Local(reader) => reader.read(buf),
            UnifiedReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for UnifiedReader {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            UnifiedReader::Local(reader) => reader.seek(pos),
            UnifiedReader::Memory(reader) => reader.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_local_file() {
        let result = UnifiedReader::open(Path::new("Cargo.toml"));
        assert!(result.is_ok(), "Failed to open local file: {:?}", result.err());

        let result = UnifiedReader::open(Path::new("non_existent_file.xlsx"));
        assert!(result.is_err(), "Should fail to open non-existent file");
    }

    #[test]
    fn test_compound_signature() {
        let mut bytes = COMPOUND_FILE_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"payload");
        let mut reader = UnifiedReader::memory(Arc::from(bytes));
        assert!(reader.is_compound_file().unwrap());
        assert_eq!(reader.stream_position().unwrap(), 0);

        let mut reader = UnifiedReader::memory(Arc::from(&b"PK\x03\x04"[..]));
        assert!(!reader.is_compound_file().unwrap());
    }

    #[test]
    fn test_memory_readers_start_at_zero() {
        let bytes: Arc<[u8]> = Arc::from(&b"abcdef"[..]);
        let mut first = UnifiedReader::memory(bytes.clone());
        let mut buffer = [0u8; 4];
        first.read_exact(&mut buffer).unwrap();

        let mut second = UnifiedReader::memory(bytes);
        let mut buffer = [0u8; 2];
        second.read_exact(&mut buffer).unwrap();
        assert_eq!(&buffer, b"ab");
    }
}
