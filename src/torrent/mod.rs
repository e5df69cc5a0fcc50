pub mod metadata;
pub mod infohash;

pub use infohash::calculate_info_hash;
pub use metadata::{decode_torrent, Torrent, TorrentInfo};
