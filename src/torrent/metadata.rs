use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use log::debug;

use crate::bencode::{decode_with, BInteger, BValue, BencodeError, DecodeOptions};
use crate::file_io::read_file_bytes;
use crate::torrent::calculate_info_hash;

/// Decodes a buffer that must hold a torrent metainfo dictionary.
///
/// The buffer has to start with `d` and end with `e`, and the outermost value
/// has to be a dictionary; otherwise this fails with `NotATorrentDictionary`.
pub fn decode_torrent(
    buf: &[u8],
    options: &DecodeOptions,
) -> Result<BTreeMap<Vec<u8>, BValue>, BencodeError> {
    if buf.first() != Some(&b'd') || buf.last() != Some(&b'e') {
        return Err(BencodeError::NotATorrentDictionary);
    }

    decode_with(buf, options)?
        .into_dict()
        .ok_or(BencodeError::NotATorrentDictionary)
}

/// What the `info` command reports about a .torrent file.
///
/// Fields are read as-is; a missing or oddly typed field is `None` rather than
/// an error, since judging a torrent's contents is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torrent {
    pub announce: Option<String>,       // The tracker URL
    pub info: Option<TorrentInfo>,      // Torrent metadata
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    pub name: Option<String>,
    pub length: Option<BInteger>,       // Total size of the file(s)
    pub piece_length: Option<BInteger>,
    pub piece_count: usize,             // SHA-1 hashes are 20 bytes each
    pub info_hash: [u8; 20],
}

impl Torrent {
    /// Reads a .torrent file into memory and summarizes it.
    pub fn from_file<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Self> {
        let path = path.as_ref();
        let buf = read_file_bytes(path)?;

        Self::from_bytes(&buf, options)
            .with_context(|| format!("Bencode error in {}", path.display()))
    }

    pub fn from_bytes(buf: &[u8], options: &DecodeOptions) -> Result<Self, BencodeError> {
        let root_dict = decode_torrent(buf, options)?;
        debug!("Torrent root has {} keys", root_dict.len());

        let announce = root_dict
            .get(b"announce".as_slice())
            .and_then(BValue::as_str)
            .map(str::to_string);

        let info = match root_dict.get(b"info".as_slice()) {
            Some(value @ BValue::Dict(_)) => Some(TorrentInfo::from_bvalue(value)),
            _ => None,
        };

        Ok(Torrent { announce, info })
    }
}

impl TorrentInfo {
    /// `info` must be the `info` dictionary itself.
    pub fn from_bvalue(info: &BValue) -> Self {
        let name = info.get(b"name").and_then(BValue::as_str).map(str::to_string);
        let piece_length = info.get(b"piece length").and_then(BValue::as_integer).cloned();
        let piece_count = info
            .get(b"pieces")
            .and_then(BValue::as_bytes)
            .map_or(0, |pieces| pieces.len() / 20);

        let length = match info.get(b"length").and_then(BValue::as_integer) {
            Some(length) => Some(length.clone()),
            None => total_files_length(info),
        };

        TorrentInfo {
            name,
            length,
            piece_length,
            piece_count,
            info_hash: calculate_info_hash(info),
        }
    }
}

/// Sum of `files[*].length` for multi-file torrents.
fn total_files_length(info: &BValue) -> Option<BInteger> {
    let files = info.get(b"files")?.as_list()?;

    let mut total = BInteger::zero();
    for file in files {
        total = &total + file.get(b"length")?.as_integer()?;
    }
    Some(total)
}
