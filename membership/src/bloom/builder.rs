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

use super::BigBloomFilter;
use super::BitVector;
use super::BloomFilter;
use super::BloomSpecification;
use super::best_num_hashes;
use super::compute_specification;
use crate::error::Error;

/// Smallest explicit hash count accepted by [`BloomFilterBuilder::num_hashes`].
pub const MIN_NUM_HASHES: u32 = 1;
/// Largest explicit hash count; the serialized form stores it as a signed 32-bit integer.
pub const MAX_NUM_HASHES: u32 = i32::MAX as u32;
/// Slack bits added to every filter on top of `num_elements * bits_per_element`.
pub const EXTRA_BITS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing {
    BitsPerElement(u32),
    Accuracy(f64),
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two sizing modes:
/// - [`with_bits_per_element()`](Self::with_bits_per_element): a fixed number of bits per
///   expected element, with the best hash count for that ratio
/// - [`with_accuracy()`](Self::with_accuracy): the smallest table entry meeting a target false
///   positive probability
///
/// Either mode accepts an explicit [`num_hashes()`](Self::num_hashes) override. The filter holds
/// `num_elements * bits_per_element + 20` bits.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    num_elements: u64,
    sizing: Sizing,
    num_hashes: Option<u32>,
}

impl BloomFilterBuilder {
    /// Creates a builder allotting `bits_per_element` bits to each of `num_elements` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_bits_per_element(1000, 10).build().unwrap();
    /// assert_eq!(filter.num_buckets(), 10_020);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_bits_per_element(num_elements: u64, bits_per_element: u32) -> Self {
        BloomFilterBuilder {
            num_elements,
            sizing: Sizing::BitsPerElement(bits_per_element),
            num_hashes: None,
        }
    }

    /// Creates a builder sized for `num_elements` elements at a false positive probability of
    /// at most `max_fpp`, as far as the sizing table allows.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
    /// assert_eq!(filter.num_buckets(), 10_020);
    /// assert_eq!(filter.num_hashes(), 5);
    /// ```
    pub fn with_accuracy(num_elements: u64, max_fpp: f64) -> Self {
        BloomFilterBuilder {
            num_elements,
            sizing: Sizing::Accuracy(max_fpp),
            num_hashes: None,
        }
    }

    /// Overrides the hash count the sizing mode would pick.
    pub fn num_hashes(mut self, num_hashes: u32) -> Self {
        self.num_hashes = Some(num_hashes);
        self
    }

    /// Resolves the hash count and bits per element this builder will use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::InvalidArgument`] if `num_elements` is 0, the
    /// probability is not in (0.0, 1.0], or an explicit hash count is outside
    /// [`MIN_NUM_HASHES`, `MAX_NUM_HASHES`].
    pub fn specification(&self) -> Result<BloomSpecification, Error> {
        if self.num_elements == 0 {
            return Err(Error::invalid_argument("num_elements must be greater than 0"));
        }

        let spec = match self.sizing {
            Sizing::BitsPerElement(bits_per_element) => {
                BloomSpecification::new(best_num_hashes(bits_per_element), bits_per_element)
            }
            Sizing::Accuracy(max_fpp) => {
                if !(max_fpp > 0.0 && max_fpp <= 1.0) {
                    return Err(Error::invalid_argument(
                        "max_fpp must be between 0.0 and 1.0 (inclusive of 1.0)",
                    )
                    .with_context("max_fpp", max_fpp));
                }
                compute_specification(max_fpp)
            }
        };

        match self.num_hashes {
            None => Ok(spec),
            Some(num_hashes) if (MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&num_hashes) => {
                Ok(BloomSpecification::new(num_hashes, spec.bits_per_element()))
            }
            Some(num_hashes) => Err(Error::invalid_argument(format!(
                "num_hashes must be between {MIN_NUM_HASHES} and {MAX_NUM_HASHES}"
            ))
            .with_context("num_hashes", num_hashes)),
        }
    }

    /// Builds a filter over bounded storage.
    ///
    /// # Errors
    ///
    /// Fails as [`specification()`](Self::specification) does, or if the filter would need
    /// more than `i32::MAX` bits.
    pub fn build(self) -> Result<BloomFilter, Error> {
        self.build_with()
    }

    /// Builds a filter over 64-bit addressable storage.
    ///
    /// # Errors
    ///
    /// Fails as [`specification()`](Self::specification) does, or if the filter would need
    /// more than `i64::MAX` bits.
    pub fn build_big(self) -> Result<BigBloomFilter, Error> {
        self.build_with()
    }

    fn build_with<B: BitVector>(self) -> Result<BloomFilter<B>, Error> {
        let spec = self.specification()?;
        let num_bits = self
            .num_elements
            .checked_mul(u64::from(spec.bits_per_element()))
            .and_then(|bits| bits.checked_add(EXTRA_BITS))
            .filter(|&bits| bits <= B::MAX_BITS)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "filter size exceeds the addressable maximum of {} bits",
                    B::MAX_BITS
                ))
                .with_context("num_elements", self.num_elements)
                .with_context("bits_per_element", spec.bits_per_element())
            })?;

        tracing::debug!(
            num_elements = self.num_elements,
            bits_per_element = spec.bits_per_element(),
            num_hashes = spec.num_hashes(),
            num_bits,
            "building bloom filter"
        );
        Ok(BloomFilter::from_parts(
            spec.num_hashes(),
            B::with_len(num_bits),
        ))
    }
}
