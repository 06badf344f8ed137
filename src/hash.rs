// src/hash.rs

//! SHA-256 helpers for source archive verification and package ids

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Buffer size for streaming file hashes (64 KB)
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Hash bytes, returning lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hash everything a reader yields, returning lowercase hex
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file on disk
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {}", path.display(), e)))?;
    sha256_reader(file)
        .map_err(|e| Error::IoError(format!("Failed to hash {}: {}", path.display(), e)))
}

/// Check that a string is a well-formed SHA-256 hex digest
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Verify a file against an expected SHA-256 digest (case-insensitive)
pub fn verify_sha256(path: &Path, expected: &str) -> Result<bool> {
    if !is_sha256_hex(expected) {
        return Err(Error::ParseError(format!(
            "Invalid sha256 checksum '{}'",
            expected
        )));
    }
    let actual = sha256_file(path)?;
    Ok(actual.eq_ignore_ascii_case(expected))
}
