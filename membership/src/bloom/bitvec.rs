// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Fixed-length bit storage backing the filters.

use std::fmt::Debug;

use crate::error::Error;

const WORD_BITS: u64 = 64;

/// Number of bits held by each segment of a [`SegmentedBitSet`].
pub const SEGMENT_BITS: u64 = 1 << 30;

/// Zero-initialized, fixed-length bit storage addressed by ordinals in `[0, len)`.
///
/// Bits are grouped into `u64` words; word `w` holds ordinals `64 * w .. 64 * w + 64`, with
/// ordinal `i` at mask `1 << (i % 64)`. Bits past `len` in the last word are always zero.
pub trait BitVector: Clone + Debug + PartialEq {
    /// The largest length this storage can address.
    const MAX_BITS: u64;
    /// Width in bytes of the serialized length field.
    const LENGTH_BYTES: usize;

    /// Allocates `num_bits` zeroed bits.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` exceeds [`Self::MAX_BITS`].
    fn with_len(num_bits: u64) -> Self;

    /// Rebuilds storage of `num_bits` bits from its words in order.
    ///
    /// Missing words are zero, extra words are ignored, and bits past `num_bits` are masked off.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` exceeds [`Self::MAX_BITS`].
    fn from_words<I: IntoIterator<Item = u64>>(num_bits: u64, words: I) -> Self;

    /// Returns the fixed number of bits.
    fn len(&self) -> u64;

    /// Returns whether the storage holds no bits at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    fn get(&self, index: u64) -> bool;

    /// Sets the bit at `index` to 1.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    fn set(&mut self, index: u64);

    /// Resets every bit to 0.
    fn clear(&mut self);

    /// Bitwise-ORs `other` into `self`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::IncompatibleFilter`] if the lengths differ.
    fn union_in_place(&mut self, other: &Self) -> Result<(), Error>;

    /// Returns the number of bits set to 1.
    fn count_ones(&self) -> u64;

    /// Iterates the backing words in ordinal order.
    fn words(&self) -> impl Iterator<Item = u64> + '_;
}

/// Bit storage addressable by a signed 32-bit index, backed by a single word array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    num_bits: u64,
    words: Vec<u64>,
}

impl BitSet {
    fn word_and_mask(&self, index: u64) -> (usize, u64) {
        assert!(
            index < self.num_bits,
            "bit index {index} out of range for length {}",
            self.num_bits
        );
        ((index / WORD_BITS) as usize, 1u64 << (index % WORD_BITS))
    }

    fn mask_tail(&mut self) {
        let excess_bits = self.num_bits % WORD_BITS;
        if excess_bits != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << excess_bits) - 1;
            }
        }
    }
}

impl BitVector for BitSet {
    const MAX_BITS: u64 = i32::MAX as u64;
    const LENGTH_BYTES: usize = 4;

    fn with_len(num_bits: u64) -> Self {
        assert!(
            num_bits <= Self::MAX_BITS,
            "num_bits must not exceed {}",
            Self::MAX_BITS
        );
        BitSet {
            num_bits,
            words: vec![0u64; num_bits.div_ceil(WORD_BITS) as usize],
        }
    }

    fn from_words<I: IntoIterator<Item = u64>>(num_bits: u64, words: I) -> Self {
        let mut bits = Self::with_len(num_bits);
        for (slot, word) in bits.words.iter_mut().zip(words) {
            *slot = word;
        }
        bits.mask_tail();
        bits
    }

    fn len(&self) -> u64 {
        self.num_bits
    }

    fn get(&self, index: u64) -> bool {
        let (word, mask) = self.word_and_mask(index);
        self.words[word] & mask != 0
    }

    fn set(&mut self, index: u64) {
        let (word, mask) = self.word_and_mask(index);
        self.words[word] |= mask;
    }

    fn clear(&mut self) {
        self.words.fill(0);
    }

    fn union_in_place(&mut self, other: &Self) -> Result<(), Error> {
        if self.num_bits != other.num_bits {
            return Err(Error::length_mismatch(self.num_bits, other.num_bits));
        }
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
        Ok(())
    }

    fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    fn words(&self) -> impl Iterator<Item = u64> + '_ {
        self.words.iter().copied()
    }
}

/// Bit storage addressable by 64-bit ordinals.
///
/// The bits live in an arena of [`BitSet`] segments of [`SEGMENT_BITS`] bits each (the last one
/// may be shorter). Ordinal `i` lives in segment `i / SEGMENT_BITS` at offset
/// `i % SEGMENT_BITS`. The segment layout is fixed at allocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedBitSet {
    num_bits: u64,
    segment_bits: u64,
    segments: Vec<BitSet>,
}

impl SegmentedBitSet {
    fn with_segment_bits(num_bits: u64, segment_bits: u64) -> Self {
        debug_assert!(segment_bits > 0 && segment_bits % WORD_BITS == 0);
        debug_assert!(segment_bits <= BitSet::MAX_BITS);
        assert!(
            num_bits <= Self::MAX_BITS,
            "num_bits must not exceed {}",
            Self::MAX_BITS
        );

        let num_segments = num_bits.div_ceil(segment_bits);
        let segments = (0..num_segments)
            .map(|segment| BitSet::with_len((num_bits - segment * segment_bits).min(segment_bits)))
            .collect();
        SegmentedBitSet {
            num_bits,
            segment_bits,
            segments,
        }
    }

    fn from_words_with_segment_bits<I: IntoIterator<Item = u64>>(
        num_bits: u64,
        segment_bits: u64,
        words: I,
    ) -> Self {
        let mut bits = Self::with_segment_bits(num_bits, segment_bits);
        let mut words = words.into_iter();
        for segment in &mut bits.segments {
            for slot in &mut segment.words {
                match words.next() {
                    Some(word) => *slot = word,
                    None => return bits,
                }
            }
            segment.mask_tail();
        }
        bits
    }

    /// Returns the number of segments in the arena.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Maps an ordinal to its `(segment, offset)` pair.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn locate(&self, index: u64) -> (usize, u64) {
        assert!(
            index < self.num_bits,
            "bit index {index} out of range for length {}",
            self.num_bits
        );
        (
            (index / self.segment_bits) as usize,
            index % self.segment_bits,
        )
    }
}

impl BitVector for SegmentedBitSet {
    const MAX_BITS: u64 = i64::MAX as u64;
    const LENGTH_BYTES: usize = 8;

    fn with_len(num_bits: u64) -> Self {
        Self::with_segment_bits(num_bits, SEGMENT_BITS)
    }

    fn from_words<I: IntoIterator<Item = u64>>(num_bits: u64, words: I) -> Self {
        Self::from_words_with_segment_bits(num_bits, SEGMENT_BITS, words)
    }

    fn len(&self) -> u64 {
        self.num_bits
    }

    fn get(&self, index: u64) -> bool {
        let (segment, offset) = self.locate(index);
        self.segments[segment].get(offset)
    }

    fn set(&mut self, index: u64) {
        let (segment, offset) = self.locate(index);
        self.segments[segment].set(offset);
    }

    fn clear(&mut self) {
        self.segments.iter_mut().for_each(BitSet::clear);
    }

    fn union_in_place(&mut self, other: &Self) -> Result<(), Error> {
        if self.num_bits != other.num_bits {
            return Err(Error::length_mismatch(self.num_bits, other.num_bits));
        }
        if self.segment_bits != other.segment_bits {
            return Err(Error::incompatible("bit vector segment layouts differ")
                .with_context("self", self.segment_bits)
                .with_context("other", other.segment_bits));
        }
        for (segment, other_segment) in self.segments.iter_mut().zip(&other.segments) {
            segment.union_in_place(other_segment)?;
        }
        Ok(())
    }

    fn count_ones(&self) -> u64 {
        self.segments.iter().map(BitSet::count_ones).sum()
    }

    fn words(&self) -> impl Iterator<Item = u64> + '_ {
        self.segments.iter().flat_map(|segment| segment.words())
    }
}
