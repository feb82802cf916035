//! Byte access to uploaded files

use std::path::Path;

use super::error::IngestResult;

/// Supplies file size and bytes for a path. The pipeline only needs these
/// two operations from whatever stores the uploads.
pub trait SourceReader: Send + Sync {
    fn size(&self, path: &Path) -> IngestResult<u64>;

    fn read(&self, path: &Path) -> IngestResult<Vec<u8>>;
}

/// Reads files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileReader;

impl SourceReader for LocalFileReader {
    fn size(&self, path: &Path) -> IngestResult<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn read(&self, path: &Path) -> IngestResult<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_local_reader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let reader = LocalFileReader;
        assert_eq!(reader.size(file.path()).unwrap(), 8);
        assert_eq!(reader.read(file.path()).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_missing_file() {
        let reader = LocalFileReader;
        assert!(reader.size(Path::new("/definitely/not/here.csv")).is_err());
    }
}
