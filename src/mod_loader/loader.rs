//! MOD File Loader
//!
//! Reads module files from disk and decodes them with the format parser.

use crate::mod_parser::{FormatParser, ModParser};
use crate::song::Song;
use crate::{ModError, Result};
use std::fs;
use std::path::Path;

/// Loads MOD files from disk
pub struct ModFileLoader;

impl ModFileLoader {
    /// Load and decode a module file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Song> {
        let data = Self::read(path)?;
        ModParser::new().parse(&data)
    }

    /// Read the raw bytes of a module file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).map_err(|e| {
            ModError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file '{}': {}", path.display(), e),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mod_parser::DecodeError;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let err = ModFileLoader::load("/nonexistent/song.mod").unwrap_err();
        assert!(matches!(err, ModError::Io(_)));
        assert!(err.to_string().contains("/nonexistent/song.mod"));
    }

    #[test]
    fn test_truncated_file_reports_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 100]).unwrap();
        assert!(matches!(
            ModFileLoader::load(file.path()),
            Err(ModError::Decode(DecodeError::Truncated { .. }))
        ));
    }
}
