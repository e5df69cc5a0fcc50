// lib.rs - Library interface for the bencode codec

pub mod bencode;
pub mod config;
pub mod engine;
pub mod file_io;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::{
    bvalue_to_json, decode, decode_at, decode_bencode, decode_with, encode, encode_into, to_bytes,
    to_value, BInteger, BValue, BencodeError, DecodeOptions,
};
pub use torrent::{decode_torrent, Torrent, TorrentInfo};
