//! Filesystem helpers.

use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used while a file is being written.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Write `bytes` to `dest` via a temporary sibling and a rename, so readers
/// only ever see the old file or the complete new one.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = partial_path(dest);
    let result = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, dest));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}
