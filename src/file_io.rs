// src/file_io.rs
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Reads a whole file into memory. The codec works on complete buffers only.
pub fn read_file_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
	let path = path.as_ref();
	let data = fs::read(path)
		.with_context(|| format!("I/O error while reading {}", path.display()))?;

	debug!("Read {} bytes from {}", data.len(), path.display());
	Ok(data)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_read_file_bytes() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"d3:fooi1ee").unwrap();
		assert_eq!(read_file_bytes(file.path()).unwrap(), b"d3:fooi1ee");
	}

	#[test]
	fn test_missing_file_has_context() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("nope.torrent");
		let err = read_file_bytes(&missing).unwrap_err();
		assert!(err.to_string().contains("nope.torrent"));
	}
}
