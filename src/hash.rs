use byteorder::{ByteOrder, LittleEndian};
use rand::random;

/// Seed used by kernels built with `Default`.
pub const DEFAULT_SEED: u32 = 0;

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3, x86 32-bit variant.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        h ^= mix_k(LittleEndian::read_u32(block));
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let k = tail
            .iter()
            .rev()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte));
        h ^= mix_k(k);
    }

    fmix32(h ^ data.len() as u32)
}

#[inline(always)]
fn mix_k(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// A trait for creating the bit index iterator of an item.
///
/// `hash_iter(item, k, n)` must yield exactly `k` indices, each below `n`,
/// and the same sequence every time for the same kernel value and item.
pub trait HashKernels {
    type HI<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    fn hash_iter<'a>(&'a self, item: &'a [u8], k: u32, n: usize) -> Self::HI<'a>;
}

/// One MurmurHash3 evaluation per index, index `i` seeded with `seed + i`.
///
/// The hash is read as a signed 32-bit value and reduced with a floor
/// modulo, so with seed 0 the indices match `mmh3.hash(item, i) % n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeededMurmur3 {
    seed: u32,
}

impl SeededMurmur3 {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Kernels with a random seed, so independent filters disagree on
    /// which items collide.
    pub fn random() -> Self {
        Self::new(random())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for SeededMurmur3 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl HashKernels for SeededMurmur3 {
    type HI<'a> = SeededHashIter<'a>;

    fn hash_iter<'a>(&'a self, item: &'a [u8], k: u32, n: usize) -> Self::HI<'a> {
        SeededHashIter {
            item,
            seed: self.seed,
            k,
            n,
            counter: 0,
        }
    }
}

pub struct SeededHashIter<'a> {
    item: &'a [u8],
    seed: u32,
    k: u32,
    n: usize,
    counter: u32,
}

impl<'a> Iterator for SeededHashIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.k == self.counter {
            return None;
        }
        let h = murmur3_32(self.item, self.seed.wrapping_add(self.counter));
        self.counter += 1;
        Some(i64::from(h as i32).rem_euclid(self.n as i64) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remain = (self.k - self.counter) as usize;
        (remain, Some(remain))
    }
}

/// [Kirsch-Mitzenmacher](https://www.eecs.harvard.edu/~michaelm/postscripts/tr-02-05.pdf)
/// double hashing: two MurmurHash3 evaluations per item, `index_i = h1 + i * h2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoubleHashing {
    seed: u32,
}

impl DoubleHashing {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn random() -> Self {
        Self::new(random())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for DoubleHashing {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl HashKernels for DoubleHashing {
    type HI<'a> = DoubleHashIter;

    fn hash_iter<'a>(&'a self, item: &'a [u8], k: u32, n: usize) -> Self::HI<'a> {
        let h1 = murmur3_32(item, self.seed);
        let h2 = murmur3_32(item, h1);
        DoubleHashIter::new(h1, h2, k, n)
    }
}

pub struct DoubleHashIter {
    h1: u64,
    h2: u64,
    k: u32,
    n: u64,
    counter: u32,
}

impl DoubleHashIter {
    fn new(h1: u32, h2: u32, k: u32, n: usize) -> Self {
        Self {
            h1: u64::from(h1),
            h2: u64::from(h2),
            k,
            n: n as u64,
            counter: 0,
        }
    }
}

impl Iterator for DoubleHashIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.k == self.counter {
            return None;
        }
        let r = self
            .h1
            .wrapping_add(self.h2.wrapping_mul(u64::from(self.counter)))
            % self.n;
        self.counter += 1;
        Some(r as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remain = (self.k - self.counter) as usize;
        (remain, Some(remain))
    }
}
