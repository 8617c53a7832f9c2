//! # Growable Bitsets
//!
//! [`BitSet`] is the signature type of the engine. Bit `i` is set iff
//! component id `i` is present.
//!
//! ## Layout
//! The set is a vector of 32-bit [`Word`]s. Word `w` holds bits
//! `[w * 32, w * 32 + 32)`, least significant bit first.
//!
//! ## Zero extension
//! Every operation treats words past the end of the vector as zero:
//! - reads past the capacity return `false`,
//! - binary operations between sets of different lengths behave as if the
//!   shorter one was padded with zeros,
//! - equality and hashing ignore trailing zero words.
//!
//! Storage only ever grows. Setting or toggling bit `i` resizes the vector
//! to at least `⌈(i + 1) / 32⌉` words, preserving existing bits.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::engine::types::{Word, WORD_BITS, words_for_bit};


/// Dynamically growable bit vector of 32-bit words.
#[derive(Clone, Default)]
pub struct BitSet {
    words: Vec<Word>,
}

#[inline]
fn split(index: usize) -> (usize, Word) {
    (index / WORD_BITS, 1 << (index % WORD_BITS))
}

impl BitSet {
    /// Creates an empty set with no allocated words.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Creates an empty set with `words` zeroed words allocated.
    pub fn with_capacity(words: usize) -> Self {
        Self { words: vec![0; words] }
    }

    /// Raw backing words, least significant first.
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Number of allocated words.
    #[inline]
    pub fn word_len(&self) -> usize {
        self.words.len()
    }

    /// Number of addressable bits before the next growth.
    #[inline]
    pub fn bit_capacity(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    fn grow(&mut self, index: usize) {
        let needed = words_for_bit(index);
        if needed > self.words.len() {
            self.words.resize(needed, 0);
        }
    }

    /// Returns `true` if bit `index` is set. Out-of-range reads are `false`.
    #[inline]
    pub fn has(&self, index: usize) -> bool {
        let (word, bit) = split(index);
        self.words.get(word).map_or(false, |w| w & bit != 0)
    }

    /// Sets bit `index`, growing storage if needed.
    pub fn or(&mut self, index: usize) -> &mut Self {
        self.grow(index);
        let (word, bit) = split(index);
        self.words[word] |= bit;
        self
    }

    /// Flips bit `index`, growing storage if needed.
    pub fn xor(&mut self, index: usize) -> &mut Self {
        self.grow(index);
        let (word, bit) = split(index);
        self.words[word] ^= bit;
        self
    }

    /// Returns an independent copy of this set.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns a set with every allocated bit flipped.
    ///
    /// The complement covers the current word capacity only.
    pub fn not(&self) -> Self {
        Self { words: self.words.iter().map(|w| !w).collect() }
    }

    fn zip_with(&self, other: &BitSet, len: usize, op: impl Fn(Word, Word) -> Word) -> Self {
        let words = (0..len)
            .map(|i| {
                let a = self.words.get(i).copied().unwrap_or(0);
                let b = other.words.get(i).copied().unwrap_or(0);
                op(a, b)
            })
            .collect();
        Self { words }
    }

    /// Bits set in either set. Sized to the larger operand.
    pub fn union(&self, other: &BitSet) -> Self {
        self.zip_with(other, self.words.len().max(other.words.len()), |a, b| a | b)
    }

    /// Bits set in both sets. Sized to the smaller operand.
    pub fn intersection(&self, other: &BitSet) -> Self {
        self.zip_with(other, self.words.len().min(other.words.len()), |a, b| a & b)
    }

    /// Bits set in `self` but not in `other`. Sized to `self`.
    pub fn difference(&self, other: &BitSet) -> Self {
        self.zip_with(other, self.words.len(), |a, b| a & !b)
    }

    /// Bits set in exactly one of the two sets. Sized to the larger operand.
    pub fn symmetric_difference(&self, other: &BitSet) -> Self {
        self.zip_with(other, self.words.len().max(other.words.len()), |a, b| a ^ b)
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    pub fn contains(&self, other: &BitSet) -> bool {
        other.words.iter().enumerate().all(|(i, &b)| {
            let a = self.words.get(i).copied().unwrap_or(0);
            a & b == b
        })
    }

    /// Returns `true` if the two sets share at least one bit.
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Returns `true` if both sets hold exactly the same bits.
    #[inline]
    pub fn equals(&self, other: &BitSet) -> bool {
        self == other
    }

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Ascending list of set bit indices.
    pub fn values(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        for (word_index, &word) in self.words.iter().enumerate() {
            let base = word_index * WORD_BITS;
            let mut bits = word;
            while bits != 0 {
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                out.push(base + tz);
            }
        }
        out
    }

    /// Words with trailing zero words removed.
    fn significant_words(&self) -> &[Word] {
        let end = self
            .words
            .iter()
            .rposition(|&w| w != 0)
            .map_or(0, |i| i + 1);
        &self.words[..end]
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant_words() == other.significant_words()
    }
}

impl Eq for BitSet {}

impl Hash for BitSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_words().hash(state);
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<usize> for BitSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        for index in iter {
            self.or(index);
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values()).finish()
    }
}

/// Hexadecimal, most significant word first, each word zero padded.
impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = self.significant_words();
        if words.is_empty() {
            return f.write_str("0");
        }
        let mut iter = words.iter().rev();
        if let Some(top) = iter.next() {
            write!(f, "{top:x}")?;
        }
        for word in iter {
            write!(f, "{word:08x}")?;
        }
        Ok(())
    }
}
