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

use super::BitSet;
use super::BitVector;
use super::BloomKey;
use super::MAX_NUM_HASHES;
use super::MIN_NUM_HASHES;
use super::SegmentedBitSet;
use super::buckets::Buckets;
use crate::error::Error;
use crate::hash::Murmur3;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (inserted keys always return `true`)
/// - A false positive rate fixed by the sizing chosen at construction
/// - Constant space usage
///
/// The storage flavor is a type parameter: [`BitSet`] (the default) addresses up to
/// `i32::MAX` bits, [`SegmentedBitSet`] (see [`BigBloomFilter`]) up to `i64::MAX`.
///
/// Use [`super::BloomFilterBuilder`] to construct instances.
///
/// Mutation requires `&mut self`; concurrent `contains` calls through shared references are
/// safe as long as nobody mutates the filter meanwhile.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter<B = BitSet> {
    /// Number of hash functions to use (k)
    pub(super) num_hashes: u32,
    /// Bit storage; its length is the bucket space (m)
    pub(super) bits: B,
}

/// A Bloom filter over 64-bit addressable, segmented storage.
pub type BigBloomFilter = BloomFilter<SegmentedBitSet>;

impl<B: BitVector> BloomFilter<B> {
    /// Wraps existing state without deriving any parameters.
    ///
    /// # Panics
    ///
    /// Panics if `num_hashes` is 0 or above `i32::MAX`, or if `bits` is empty.
    pub fn from_parts(num_hashes: u32, bits: B) -> Self {
        assert!(
            (MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&num_hashes),
            "num_hashes must be between {MIN_NUM_HASHES} and {MAX_NUM_HASHES}"
        );
        assert!(!bits.is_empty(), "bit vector must not be empty");
        BloomFilter { num_hashes, bits }
    }

    /// Returns a filter that reports every key as present.
    ///
    /// Useful as a stand-in where a real filter is not available.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilter;
    /// let filter: BloomFilter = BloomFilter::always_matching();
    /// assert!(filter.contains("anything"));
    /// assert!(filter.contains(b""));
    /// ```
    pub fn always_matching() -> Self {
        let mut bits = B::with_len(64);
        for index in 0..64 {
            bits.set(index);
        }
        BloomFilter {
            num_hashes: 1,
            bits,
        }
    }

    /// Tests whether a key is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Key was **possibly** inserted (or false positive)
    /// - `false`: Key was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    /// filter.insert("apple");
    ///
    /// assert!(filter.contains("apple"));
    /// assert!(!filter.contains("grape"));
    /// ```
    pub fn contains<K: BloomKey + ?Sized>(&self, key: &K) -> bool {
        self.buckets(key).all(|bucket| self.bits.get(bucket))
    }

    /// Inserts a key into the filter.
    ///
    /// After insertion, `contains(key)` will always return `true`.
    pub fn insert<K: BloomKey + ?Sized>(&mut self, key: &K) {
        for bucket in self.buckets(key) {
            self.bits.set(bucket);
        }
    }

    /// Inserts a key and reports whether it was new to this filter.
    ///
    /// Returns `true` if at least one of the key's buckets was unset before the call. All
    /// buckets are checked before any is set, so a bucket repeated within one key cannot
    /// make the key look present. Like [`contains`](Self::contains), a key never seen before
    /// can still return `false` when other keys already covered its buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    /// assert!(filter.insert_if_absent("apple"));
    /// assert!(!filter.insert_if_absent("apple"));
    /// ```
    pub fn insert_if_absent<K: BloomKey + ?Sized>(&mut self, key: &K) -> bool {
        let buckets: Vec<u64> = self.buckets(key).collect();
        let present = buckets.iter().all(|&bucket| self.bits.get(bucket));
        for bucket in buckets {
            self.bits.set(bucket);
        }
        !present
    }

    /// Returns the bucket ordinals this filter uses for `key`.
    pub fn hash_buckets<K: BloomKey + ?Sized>(&self, key: &K) -> Vec<u64> {
        self.buckets(key).collect()
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// After merging, this filter recognizes keys from either filter (plus any false
    /// positives from either).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::IncompatibleFilter`] if the filters differ in hash
    /// count or bit length; `self` is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilterBuilder;
    /// let mut f1 = BloomFilterBuilder::with_bits_per_element(100, 10).build().unwrap();
    /// let mut f2 = BloomFilterBuilder::with_bits_per_element(100, 10).build().unwrap();
    ///
    /// f1.insert("a");
    /// f2.insert("b");
    ///
    /// f1.union(&f2).unwrap();
    /// assert!(f1.contains("a"));
    /// assert!(f1.contains("b"));
    /// ```
    pub fn union(&mut self, other: &Self) -> Result<(), Error> {
        if self.num_hashes != other.num_hashes {
            tracing::debug!(
                num_hashes = self.num_hashes,
                other_num_hashes = other.num_hashes,
                "rejecting union of filters with different hash counts"
            );
            return Err(Error::incompatible("hash count mismatch")
                .with_context("self", self.num_hashes)
                .with_context("other", other.num_hashes));
        }
        self.bits.union_in_place(&other.bits).inspect_err(|err| {
            tracing::debug!(%err, "rejecting union of filters with different bit vectors");
        })
    }

    /// Returns a new filter holding the union of this filter and `others`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::IncompatibleFilter`] if any of `others` is not
    /// compatible with this filter.
    pub fn merge<'a, I>(&self, others: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a Self>,
        B: 'a,
    {
        let mut merged = self.clone();
        for other in others {
            merged.union(other)?;
        }
        Ok(merged)
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same number of hash functions and the same
    /// bit length.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.num_hashes == other.num_hashes && self.bits.len() == other.bits.len()
    }

    /// Resets every bit, keeping the size and hash count.
    pub fn reset(&mut self) {
        self.bits.clear();
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the number of buckets (bits) in the filter.
    pub fn num_buckets(&self) -> u64 {
        self.bits.len()
    }

    /// Returns the backing bit storage.
    pub fn bit_vector(&self) -> &B {
        &self.bits
    }

    /// Returns the number of unset bits.
    pub fn empty_bucket_count(&self) -> u64 {
        self.bits.len() - self.bits.count_ones()
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.bits.count_ones() as f64 / self.bits.len() as f64
    }

    /// Estimates the current false positive probability as `load_factor^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }

    fn buckets<K: BloomKey + ?Sized>(&self, key: &K) -> Buckets {
        Buckets::new(&Murmur3, &key.key_bytes(), self.num_hashes, self.bits.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn small_filter() -> BloomFilter {
        BloomFilter::from_parts(3, BitSet::with_len(1024))
    }

    #[test]
    fn test_insert_and_contains() {
        let mut filter = small_filter();
        assert!(!filter.contains("apple"));
        filter.insert("apple");
        assert!(filter.contains("apple"));
        assert!(filter.contains(&String::from("apple")));
        assert_eq!(filter.empty_bucket_count(), 1024 - filter.bit_vector().count_ones());
    }

    #[test]
    fn test_string_and_bytes_are_distinct_keys() {
        let mut filter = small_filter();
        filter.insert(b"apple");
        assert!(filter.contains(b"apple"));
        assert!(filter.contains(&b"apple".to_vec()));
        assert_eq!(filter.hash_buckets(b"apple").len(), 3);
        assert_ne!(filter.hash_buckets(b"apple"), filter.hash_buckets("apple"));
    }

    #[test]
    fn test_insert_if_absent() {
        let mut filter = small_filter();
        assert!(filter.insert_if_absent("apple"));
        assert!(!filter.insert_if_absent("apple"));
        assert!(filter.contains("apple"));
    }

    #[test]
    fn test_insert_if_absent_with_repeated_bucket() {
        // A one-bit filter maps every hash to bucket 0.
        let mut filter = BloomFilter::from_parts(4, BitSet::with_len(1));
        assert_eq!(filter.hash_buckets("k"), vec![0, 0, 0, 0]);
        assert!(filter.insert_if_absent("k"));
        assert!(!filter.insert_if_absent("k"));
    }

    #[test]
    fn test_always_matching() {
        let filter: BloomFilter = BloomFilter::always_matching();
        assert_eq!(filter.num_hashes(), 1);
        assert_eq!(filter.num_buckets(), 64);
        assert_eq!(filter.empty_bucket_count(), 0);
        for key in ["", "a", "b", "anything at all"] {
            assert!(filter.contains(key));
        }
        assert!(filter.contains(b""));

        let big = BigBloomFilter::always_matching();
        assert!(big.contains(""));
        assert!(big.contains("xyz"));
    }

    #[test]
    fn test_reset() {
        let mut filter = small_filter();
        filter.insert("test");
        filter.reset();
        assert!(!filter.contains("test"));
        assert_eq!(filter.empty_bucket_count(), 1024);
        assert_eq!(filter.num_buckets(), 1024);
    }

    #[test]
    fn test_union_rejects_different_hash_counts() {
        let mut left = small_filter();
        let right = BloomFilter::from_parts(4, BitSet::with_len(1024));
        left.insert("kept");
        let before = left.clone();

        let err = left.union(&right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
        assert_eq!(left, before);
        assert!(!left.is_compatible(&right));
    }

    #[test]
    fn test_union_rejects_different_lengths() {
        let mut left = small_filter();
        let right = BloomFilter::from_parts(3, BitSet::with_len(2048));
        let err = left.union(&right).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
        assert!(!left.is_compatible(&right));
    }

    #[test]
    fn test_merge_is_non_mutating() {
        let mut a = small_filter();
        let mut b = small_filter();
        let mut c = small_filter();
        a.insert("a");
        b.insert("b");
        c.insert("c");

        let before = a.clone();
        let merged = a.merge([&b, &c]).unwrap();
        for key in ["a", "b", "c"] {
            assert!(merged.contains(key));
        }
        assert_eq!(a, before);

        let unchanged = a.merge(&[] as &[BloomFilter]).unwrap();
        assert_eq!(unchanged, a);

        let odd = BloomFilter::from_parts(5, BitSet::with_len(1024));
        let err = a.merge([&b, &odd]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
    }

    #[test]
    fn test_statistics() {
        let mut filter = small_filter();
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);
        filter.insert("test");
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    #[should_panic(expected = "num_hashes must be between")]
    fn test_from_parts_rejects_zero_hashes() {
        BloomFilter::from_parts(0, BitSet::with_len(8));
    }

    #[test]
    #[should_panic(expected = "bit vector must not be empty")]
    fn test_from_parts_rejects_empty_bits() {
        BloomFilter::from_parts(1, BitSet::with_len(0));
    }
}
