//! Classic Bloom filter: a fixed bit buffer indexed by a seeded hash family.
//!
//! Inserted items are always reported present; items never inserted are
//! usually reported absent, with a false-positive rate fixed by the filter's
//! dimensions. Items are byte sequences; encode them consistently.
//!
//! ```
//! use classic_bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::new_for_capacity(1000, 0.01).unwrap();
//! filter.insert("dog");
//! filter.insert(b"cat");
//! assert!(filter.contains("dog"));
//! assert!(filter.contains("cat"));
//! assert_eq!((9586, 7), (filter.size(), filter.hash_count()));
//! ```
//!
//! Bits are never cleared, so there is no removal. Use [`SharedBloomFilter`]
//! to insert from several threads without a lock.

mod bits;
mod classic;
mod error;
pub mod hash;
pub mod params;
mod shared;

pub use bits::BitBuffer;
pub use classic::BloomFilter;
pub use error::{Error, Result};
pub use hash::{DoubleHashing, HashKernels, SeededMurmur3};
pub use params::{FilterParams, MAX_HASH_COUNT, MAX_SIZE};
pub use shared::SharedBloomFilter;

/// Approximate set membership: insert, then ask "might this be present?".
pub trait Membership {
    fn insert(&mut self, item: &[u8]);
    fn contains(&self, item: &[u8]) -> bool;
}
