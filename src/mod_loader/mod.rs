//! MOD File Loader Domain
//!
//! Handles file I/O for loading module files from disk.

pub mod loader;

pub use loader::ModFileLoader;

use crate::song::Song;
use crate::Result;
use std::path::Path;

/// Convenience function to load a module file from disk
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Song> {
    ModFileLoader::load(path)
}
