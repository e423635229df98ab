use crate::bits::{words_for, BitBuffer};
use crate::error::{Error, Result};
use crate::hash::{HashKernels, SeededMurmur3};
use crate::params::{false_positive_rate, FilterParams, MAX_SIZE};
use crate::Membership;
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::convert::TryFrom;
use std::io::{self, Read, Write};
use tracing::debug;

// size: u64, hash_count: u32
const HEADER_LEN: usize = 12;

/// Classic insert-only Bloom filter over byte-sequence items.
///
/// `contains` never returns `false` for an inserted item; it may return `true`
/// for an item that was never inserted. There is no removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BloomFilter<H = SeededMurmur3> {
    bits: BitBuffer,      // filter data
    hash_count: u32,      // hash positions per item
    hash_kernels: H,      // bit index family
}

impl BloomFilter {
    /// Creates an empty filter of `size` bits with `hash_count` bit positions per item.
    ///
    /// Fails with [`Error::InvalidArgument`] if either is zero or `size`
    /// exceeds [`MAX_SIZE`].
    pub fn new(size: usize, hash_count: u32) -> Result<Self> {
        Self::with_hash_kernels(size, hash_count, SeededMurmur3::default())
    }

    /// Creates an empty filter sized for `expected_count` items at a false
    /// positive rate of `target_fp_rate`, in ]0.0, 1.0[.
    ///
    /// See [`crate::params`] for the formulas and rounding.
    pub fn new_for_capacity(expected_count: usize, target_fp_rate: f64) -> Result<Self> {
        let params = FilterParams::for_capacity(expected_count, target_fp_rate)?;
        Ok(Self::with_params(params, SeededMurmur3::default()))
    }

    /// Reads a filter written by [`BloomFilter::save`].
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        Self::load_with(reader, SeededMurmur3::default())
    }

    /// Parses a filter produced by [`BloomFilter::to_bytes`]. Trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, SeededMurmur3::default())
    }
}

impl<H: HashKernels> BloomFilter<H> {
    pub fn with_hash_kernels(size: usize, hash_count: u32, hash_kernels: H) -> Result<Self> {
        Ok(Self::with_params(FilterParams::new(size, hash_count)?, hash_kernels))
    }

    pub fn with_params(params: FilterParams, hash_kernels: H) -> Self {
        debug!(size = params.size(), hash_count = params.hash_count(), "new bloom filter");
        let bits = BitBuffer::from_words(vec![0; words_for(params.size())], params.size());
        Self {
            bits,
            hash_count: params.hash_count(),
            hash_kernels,
        }
    }

    pub(crate) fn from_parts(bits: BitBuffer, hash_count: u32, hash_kernels: H) -> Self {
        Self {
            bits,
            hash_count,
            hash_kernels,
        }
    }

    pub(crate) fn into_parts(self) -> (BitBuffer, u32, H) {
        (self.bits, self.hash_count, self.hash_kernels)
    }

    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) {
        let bits = &mut self.bits;
        self.hash_kernels
            .hash_iter(item.as_ref(), self.hash_count, bits.len())
            .for_each(|i| bits.insert(i))
    }

    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        self.hash_kernels
            .hash_iter(item.as_ref(), self.hash_count, self.bits.len())
            .all(|i| self.bits.test(i))
    }

    pub fn size(&self) -> usize {
        self.bits.len()
    }

    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    pub fn params(&self) -> FilterParams {
        FilterParams::validated(self.size(), self.hash_count)
    }

    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    pub fn hash_kernels(&self) -> &H {
        &self.hash_kernels
    }

    /// Share of bits currently set.
    pub fn fill_ratio(&self) -> f64 {
        self.bits.count_ones() as f64 / self.size() as f64
    }

    /// Theoretical false-positive rate once `inserted_count` distinct items are in.
    pub fn estimated_fp_rate(&self, inserted_count: usize) -> f64 {
        false_positive_rate(self.size(), self.hash_count, inserted_count)
    }

    /// Little-endian `[size: u64][hash_count: u32][bits]`, bits packed as in
    /// [`BitBuffer::to_bytes`]. The hash kernels are not part of the layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0; HEADER_LEN];
        LittleEndian::write_u64(&mut buf[0..8], self.size() as u64);
        LittleEndian::write_u32(&mut buf[8..12], self.hash_count);
        buf.extend(self.bits.to_bytes());
        buf
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let buf = self.to_bytes();
        writer.write_all(&buf)?;
        debug!(bytes = buf.len(), "saved bloom filter");
        Ok(())
    }

    /// Reads a filter indexed by `hash_kernels`, which must match the ones it was saved with.
    pub fn load_with<R: Read>(mut reader: R, hash_kernels: H) -> Result<Self> {
        let size = reader.read_u64::<LittleEndian>().map_err(truncated)?;
        let hash_count = reader.read_u32::<LittleEndian>().map_err(truncated)?;
        let size = usize::try_from(size)
            .ok()
            .filter(|size| *size <= MAX_SIZE)
            .ok_or_else(|| Error::invalid_argument(format!("stored size {} exceeds the maximum of {} bits", size, MAX_SIZE)))?;
        let params = FilterParams::new(size, hash_count)?;

        let mut raw_data = vec![0; (params.size() + 7) / 8];
        reader.read_exact(&mut raw_data).map_err(truncated)?;
        let bits = BitBuffer::from_bytes(params.size(), &raw_data)?;
        debug!(size, hash_count, bytes = HEADER_LEN + raw_data.len(), "loaded bloom filter");
        Ok(Self::from_parts(bits, hash_count, hash_kernels))
    }

    pub fn from_bytes_with(bytes: &[u8], hash_kernels: H) -> Result<Self> {
        let mut reader = bytes;
        let filter = Self::load_with(&mut reader, hash_kernels)?;
        if !reader.is_empty() {
            return Err(Error::invalid_data(format!("{} trailing bytes", reader.len())));
        }
        Ok(filter)
    }
}

fn truncated(err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::invalid_data("truncated bloom filter data")
    } else {
        Error::Io(err)
    }
}

impl<H: HashKernels> Membership for BloomFilter<H> {
    fn insert(&mut self, item: &[u8]) {
        BloomFilter::insert(self, item)
    }

    fn contains(&self, item: &[u8]) -> bool {
        BloomFilter::contains(self, item)
    }
}

impl<'a, H: HashKernels, T: AsRef<[u8]> + ?Sized + 'a> Extend<&'a T> for BloomFilter<H> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.insert(item))
    }
}
