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

//! Bloom filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! a key is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If a key was inserted, `contains()` will always return `true`
//! - **Possible false positives**: `contains()` may return `true` for keys never inserted
//! - **Fixed size**: The bit vector never grows; there is no deletion
//!
//! # Usage
//!
//! ```rust
//! use membership::bloom::BloomFilter;
//! use membership::bloom::BloomFilterBuilder;
//!
//! // 10 bits per element for 1000 elements, with the best hash count for that ratio
//! let mut filter = BloomFilterBuilder::with_bits_per_element(1000, 10).build()?;
//!
//! filter.insert("apple");
//! filter.insert(b"raw bytes");
//!
//! assert!(filter.contains("apple"));
//! assert!(!filter.contains("grape"));
//!
//! let bytes = filter.serialize();
//! let restored = BloomFilter::deserialize(&bytes)?;
//! assert_eq!(filter, restored);
//! # Ok::<(), membership::error::Error>(())
//! ```
//!
//! # Sizing
//!
//! Sizing is table-driven. [`compute_specification`] turns a target false positive
//! probability into the fewest bits per element that meet it, then the fewest hash functions
//! for that many bits. [`best_num_hashes`] gives the optimal hash count for a fixed ratio.
//! Every filter holds `num_elements * bits_per_element + 20` bits.
//!
//! # Storage flavors
//!
//! [`BloomFilter`] is generic over its [`BitVector`]. The default, [`BitSet`], is one word
//! array of at most `i32::MAX` bits. [`BigBloomFilter`] uses [`SegmentedBitSet`], an arena of
//! fixed-size segments addressed by 64-bit ordinals. Both flavors share every operation; only
//! the width of the serialized length differs.
//!
//! # Implementation Details
//!
//! - MurmurHash3 (or any [`crate::hash::KeyHasher`]) supplies two base hashes per key
//! - Double hashing (Kirsch-Mitzenmacher method) derives all k bucket ordinals from them
//! - String keys are hashed as UTF-16 big-endian with a byte-order mark, see [`BloomKey`]
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"
//! - Kirsch and Mitzenmacher (2008). "Less Hashing, Same Performance: Building a Better Bloom
//!   Filter"

mod bitvec;
mod buckets;
mod builder;
mod calculations;
mod filter;
mod key;
mod serialization;

pub use self::bitvec::BitSet;
pub use self::bitvec::BitVector;
pub use self::bitvec::SEGMENT_BITS;
pub use self::bitvec::SegmentedBitSet;
pub use self::buckets::hash_buckets;
pub use self::buckets::hash_buckets_with;
pub use self::builder::BloomFilterBuilder;
pub use self::builder::EXTRA_BITS;
pub use self::builder::MAX_NUM_HASHES;
pub use self::builder::MIN_NUM_HASHES;
pub use self::calculations::BloomSpecification;
pub use self::calculations::best_num_hashes;
pub use self::calculations::compute_specification;
pub use self::calculations::false_positive_probability;
pub use self::filter::BigBloomFilter;
pub use self::filter::BloomFilter;
pub use self::key::BloomKey;
