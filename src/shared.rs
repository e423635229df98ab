use crate::bits::{locate, words_for, BitBuffer};
use crate::classic::BloomFilter;
use crate::error::Result;
use crate::hash::{HashKernels, SeededMurmur3};
use crate::params::{false_positive_rate, FilterParams};
use crate::Membership;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Bloom filter that can be inserted into through a shared reference.
///
/// Bits live in atomic words and inserts use `fetch_or`, so concurrent
/// inserts never lose each other's bits. A `contains` racing an insert may
/// or may not observe it; inserts that happen-before the query are always seen.
/// Bit positions are identical to [`BloomFilter`] with the same kernels, and the
/// two convert into each other without changing membership.
#[derive(Debug)]
pub struct SharedBloomFilter<H = SeededMurmur3> {
    data: Box<[AtomicU64]>,
    size: usize,
    hash_count: u32,
    hash_kernels: H,
}

impl SharedBloomFilter {
    pub fn new(size: usize, hash_count: u32) -> Result<Self> {
        Self::with_hash_kernels(size, hash_count, SeededMurmur3::default())
    }

    pub fn new_for_capacity(expected_count: usize, target_fp_rate: f64) -> Result<Self> {
        let params = FilterParams::for_capacity(expected_count, target_fp_rate)?;
        Ok(Self::with_params(params, SeededMurmur3::default()))
    }
}

impl<H: HashKernels> SharedBloomFilter<H> {
    pub fn with_hash_kernels(size: usize, hash_count: u32, hash_kernels: H) -> Result<Self> {
        Ok(Self::with_params(FilterParams::new(size, hash_count)?, hash_kernels))
    }

    pub fn with_params(params: FilterParams, hash_kernels: H) -> Self {
        debug!(size = params.size(), hash_count = params.hash_count(), "new shared bloom filter");
        let data = (0..words_for(params.size()))
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            data,
            size: params.size(),
            hash_count: params.hash_count(),
            hash_kernels,
        }
    }

    pub fn insert<T: AsRef<[u8]> + ?Sized>(&self, item: &T) {
        self.hash_kernels
            .hash_iter(item.as_ref(), self.hash_count, self.size)
            .for_each(|i| {
                let (word, mask) = locate(i);
                self.data[word].fetch_or(mask, Ordering::Relaxed);
            })
    }

    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        self.hash_kernels
            .hash_iter(item.as_ref(), self.hash_count, self.size)
            .all(|i| {
                let (word, mask) = locate(i);
                self.data[word].load(Ordering::Relaxed) & mask != 0
            })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn hash_kernels(&self) -> &H {
        &self.hash_kernels
    }

    pub fn estimated_fp_rate(&self, inserted_count: usize) -> f64 {
        false_positive_rate(self.size, self.hash_count, inserted_count)
    }

    /// Copies the current bits into a plain [`BloomFilter`].
    pub fn snapshot(&self) -> BloomFilter<H>
    where
        H: Clone,
    {
        let words = self.data.iter().map(|word| word.load(Ordering::Relaxed)).collect();
        BloomFilter::from_parts(
            BitBuffer::from_words(words, self.size),
            self.hash_count,
            self.hash_kernels.clone(),
        )
    }

    pub fn into_filter(self) -> BloomFilter<H> {
        let words = self
            .data
            .into_vec()
            .into_iter()
            .map(AtomicU64::into_inner)
            .collect();
        BloomFilter::from_parts(BitBuffer::from_words(words, self.size), self.hash_count, self.hash_kernels)
    }
}

impl<H: HashKernels> From<BloomFilter<H>> for SharedBloomFilter<H> {
    fn from(filter: BloomFilter<H>) -> Self {
        let (bits, hash_count, hash_kernels) = filter.into_parts();
        let data = bits
            .words()
            .iter()
            .map(|word| AtomicU64::new(*word))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            data,
            size: bits.len(),
            hash_count,
            hash_kernels,
        }
    }
}

impl<H: HashKernels> Membership for SharedBloomFilter<H> {
    fn insert(&mut self, item: &[u8]) {
        SharedBloomFilter::insert(self, item)
    }

    fn contains(&self, item: &[u8]) -> bool {
        SharedBloomFilter::contains(self, item)
    }
}
