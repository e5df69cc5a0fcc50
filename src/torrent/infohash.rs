// infohash.rs
use crate::bencode::{encode_bvalue, BValue};

use sha1::{Digest, Sha1};

/// SHA-1 over the canonical encoding of the `info` dictionary.
///
/// The dictionary is re-encoded rather than hashed from the original bytes, so
/// a metainfo file whose `info` keys were written unsorted hashes the same as
/// its canonical form.
pub fn calculate_info_hash(info: &BValue) -> [u8; 20] {
    let encoded = encode_bvalue(info);

    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let result = hasher.finalize();

    let mut hash_bytes = [0u8; 20];
    hash_bytes.copy_from_slice(&result);
    hash_bytes
}
