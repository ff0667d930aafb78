//! Hash Function
//!
//! The key-placement hash shared by builder and reader. The two sides must
//! agree bit for bit, so the algorithm lives here as a single pure routine;
//! known-answer vectors in the test suite freeze it, and any accidental
//! change to the algorithm fails those tests immediately.

/// Hash a key for bucket placement (djb2 over the key's UTF-8 bytes)
pub fn table_hash(key: &str) -> u32 {
    let mut hash_value: u32 = 5381;
    for byte in key.bytes() {
        hash_value = hash_value.wrapping_mul(33).wrapping_add(byte as u32);
    }

    hash_value
}
