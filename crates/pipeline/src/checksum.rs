use std::fs;
use std::io;
use std::path::Path;

use md5::{Digest, Md5};

/// Digest of the file's byte content at call time, as lowercase hex.
///
/// Reads the whole file in one pass with no retry and no locking; a file
/// being written concurrently may yield a partial snapshot. An empty file
/// hashes to the fixed digest of zero bytes.
pub fn file_md5(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Md5::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}
