use crate::error::{Error, Result};
use crate::params::MAX_SIZE;
use std::mem::size_of;

type Word = u64;
const BITS_PER_WORD: usize = size_of::<Word>() * 8;

#[inline(always)]
pub(crate) fn words_for(len: usize) -> usize {
    len / BITS_PER_WORD + (len % BITS_PER_WORD != 0) as usize
}

#[inline(always)]
fn bytes_for(len: usize) -> usize {
    len / 8 + (len % 8 != 0) as usize
}

#[inline(always)]
pub(crate) fn locate(index: usize) -> (usize, Word) {
    (index / BITS_PER_WORD, 1 << (index % BITS_PER_WORD))
}

/// Fixed-length sequence of single-bit cells, packed into 64-bit words.
///
/// Cells start at 0 and can only be set to 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitBuffer {
    data: Vec<Word>,
    len: usize,
}

#[allow(clippy::len_without_is_empty)]
impl BitBuffer {
    /// Creates a buffer of `len` cells, all zero. `len` must be positive and
    /// at most [`MAX_SIZE`].
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid_argument("bit buffer length must be positive"));
        }
        if len > MAX_SIZE {
            return Err(Error::invalid_argument(format!(
                "bit buffer length {} exceeds the maximum of {}",
                len, MAX_SIZE
            )));
        }
        Ok(Self {
            data: vec![0; words_for(len)],
            len,
        })
    }

    pub(crate) fn from_words(data: Vec<Word>, len: usize) -> Self {
        debug_assert_eq!(data.len(), words_for(len));
        Self { data, len }
    }

    pub(crate) fn words(&self) -> &[Word] {
        &self.data
    }

    /// Rebuilds a buffer from the packed layout produced by [`BitBuffer::to_bytes`].
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::new(len)?;
        let expected = bytes_for(len);
        if bytes.len() != expected {
            return Err(Error::invalid_data(format!(
                "expected {} bytes for {} bits, found {}",
                expected,
                len,
                bytes.len()
            )));
        }
        for (word, chunk) in buffer.data.iter_mut().zip(bytes.chunks(size_of::<Word>())) {
            *word = chunk
                .iter()
                .enumerate()
                .fold(0, |acc, (i, byte)| acc | (Word::from(*byte) << (i * 8)));
        }
        let tail = len % BITS_PER_WORD;
        if tail != 0 {
            let last = buffer.data[buffer.data.len() - 1];
            if last >> tail != 0 {
                return Err(Error::invalid_data("padding bits past the buffer length are set"));
            }
        }
        Ok(buffer)
    }

    /// Packs cells 8 per byte, cell `i` at byte `i / 8`, bit `i % 8`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .take(bytes_for(self.len))
            .collect()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Cell values in index order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.test(i))
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.test(index))
    }

    /// Sets the cell at `index` to 1. Setting an already set cell is a no-op.
    pub fn set(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.insert(index);
        Ok(())
    }

    // index must already be reduced below len
    #[inline(always)]
    pub(crate) fn test(&self, index: usize) -> bool {
        let (word, mask) = locate(index);
        self.data[word] & mask != 0
    }

    #[inline(always)]
    pub(crate) fn insert(&mut self, index: usize) {
        let (word, mask) = locate(index);
        self.data[word] |= mask;
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index, len: self.len })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length() {
        assert!(matches!(BitBuffer::new(0), Err(Error::InvalidArgument(_))));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn huge_length() {
        assert!(matches!(BitBuffer::new(usize::MAX - 10), Err(Error::InvalidArgument(_))));
        assert!(matches!(BitBuffer::new(MAX_SIZE + 1), Err(Error::InvalidArgument(_))));
        assert!(matches!(BitBuffer::from_bytes(usize::MAX, &[]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn sizing_does_not_overflow() {
        assert_eq!(usize::MAX / 64 + 1, words_for(usize::MAX));
        assert_eq!(usize::MAX / 8 + 1, bytes_for(usize::MAX));
        assert_eq!(2, words_for(65));
        assert_eq!(1, words_for(64));
        assert_eq!(2, bytes_for(9));
    }

    #[test]
    fn iter() {
        let mut buffer = BitBuffer::new(70).unwrap();
        [1, 3, 64, 69].iter().for_each(|&i| buffer.set(i).unwrap());
        let cells: Vec<bool> = buffer.iter().collect();
        assert_eq!(70, cells.len());
        assert_eq!(
            vec![1, 3, 64, 69],
            cells.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i).collect::<Vec<_>>()
        );
    }

    #[test]
    fn starts_cleared() {
        let buffer = BitBuffer::new(130).unwrap();
        assert_eq!(130, buffer.len());
        assert_eq!(0, buffer.count_ones());
        assert!((0..130).all(|i| !buffer.get(i).unwrap()));
    }

    #[test]
    fn set_and_get() {
        let mut buffer = BitBuffer::new(100).unwrap();
        buffer.set(0).unwrap();
        buffer.set(2).unwrap();
        buffer.set(63).unwrap();
        buffer.set(64).unwrap();
        buffer.set(99).unwrap();
        assert!(buffer.get(0).unwrap());
        assert!(!buffer.get(1).unwrap());
        assert!(buffer.get(2).unwrap());
        assert!(!buffer.get(3).unwrap());
        assert!(buffer.get(63).unwrap());
        assert!(buffer.get(64).unwrap());
        assert!(buffer.get(99).unwrap());
        assert_eq!(5, buffer.count_ones());
    }

    #[test]
    fn set_is_idempotent() {
        let mut buffer = BitBuffer::new(10).unwrap();
        buffer.set(7).unwrap();
        let once = buffer.clone();
        buffer.set(7).unwrap();
        assert_eq!(once, buffer);
        assert_eq!(1, buffer.count_ones());
    }

    #[test]
    fn out_of_range() {
        let mut buffer = BitBuffer::new(10).unwrap();
        assert!(matches!(buffer.get(10), Err(Error::IndexOutOfRange { index: 10, len: 10 })));
        assert!(matches!(buffer.set(64), Err(Error::IndexOutOfRange { index: 64, len: 10 })));
        assert_eq!(0, buffer.count_ones());
    }

    #[test]
    fn byte_layout() {
        let mut buffer = BitBuffer::new(12).unwrap();
        buffer.set(0).unwrap();
        buffer.set(9).unwrap();
        buffer.set(11).unwrap();
        assert_eq!(vec![0b0000_0001, 0b0000_1010], buffer.to_bytes());
    }

    #[test]
    fn with_raw_data() {
        let mut buffer = BitBuffer::new(100).unwrap();
        [0, 2, 31, 64, 65, 99].iter().for_each(|&i| buffer.set(i).unwrap());
        let raw_data = buffer.to_bytes();
        assert_eq!(13, raw_data.len());
        let restored = BitBuffer::from_bytes(100, &raw_data).unwrap();
        assert_eq!(buffer, restored);
    }

    #[test]
    fn raw_data_length_mismatch() {
        assert!(matches!(BitBuffer::from_bytes(100, &[0; 12]), Err(Error::InvalidData(_))));
        assert!(matches!(BitBuffer::from_bytes(100, &[0; 14]), Err(Error::InvalidData(_))));
    }

    #[test]
    fn raw_data_padding_set() {
        // bit 12 is past a 12-cell buffer
        assert!(matches!(BitBuffer::from_bytes(12, &[0, 0b0001_0000]), Err(Error::InvalidData(_))));
        assert!(BitBuffer::from_bytes(12, &[0, 0b0000_1000]).is_ok());
    }
}
