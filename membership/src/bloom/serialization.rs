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

//! Binary format of a [`BloomFilter`].
//!
//! ```text
//! offset  size               field
//! 0       4                  hash count, big-endian i32
//! 4       LENGTH_BYTES       bit length, big-endian i32 (BitSet) or i64 (SegmentedBitSet)
//! 4 + L   ceil(length / 8)   bits, ordinal i at byte i / 8 under mask 1 << (i % 8)
//! ```
//!
//! Padding bits past the length in the last byte are zero.

use super::BitVector;
use super::BloomFilter;
use crate::codec::FilterBytes;
use crate::codec::FilterSlice;
use crate::error::Error;

const HASH_COUNT_BYTES: usize = 4;

impl<B: BitVector> BloomFilter<B> {
    /// Serializes the filter to a byte vector.
    ///
    /// Encoding the same state twice yields identical bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use membership::bloom::{BloomFilter, BloomFilterBuilder};
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build().unwrap();
    /// filter.insert("test");
    ///
    /// let bytes = filter.serialize();
    /// let restored = BloomFilter::deserialize(&bytes).unwrap();
    /// assert_eq!(filter, restored);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let num_bits = self.bits.len();
        let mut remaining = num_bits.div_ceil(8) as usize;
        let mut bytes = FilterBytes::with_capacity(HASH_COUNT_BYTES + B::LENGTH_BYTES + remaining);

        bytes.write_i32_be(self.num_hashes as i32);
        if B::LENGTH_BYTES == 4 {
            bytes.write_i32_be(num_bits as i32);
        } else {
            bytes.write_i64_be(num_bits as i64);
        }

        for word in self.bits.words() {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(8);
            bytes.write(&word.to_le_bytes()[..take]);
            remaining -= take;
        }

        bytes.into_bytes()
    }

    /// Deserializes a filter from bytes produced by [`serialize`](Self::serialize) for the same
    /// storage flavor.
    ///
    /// The hash count and bits are taken as-is; no sizing is re-derived.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ErrorKind::InvalidData`] if:
    /// - The data is truncated, or longer than its length field implies
    /// - The hash count is not positive
    /// - The bit length is not positive or exceeds the storage's maximum
    /// - Padding bits past the bit length are set
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        decode(bytes).inspect_err(|err| {
            tracing::debug!(%err, len = bytes.len(), "rejecting serialized bloom filter");
        })
    }
}

fn decode<B: BitVector>(bytes: &[u8]) -> Result<BloomFilter<B>, Error> {
    let mut cursor = FilterSlice::new(bytes);

    let num_hashes = cursor
        .read_i32_be()
        .map_err(|_| Error::insufficient_data("num_hashes"))?;
    if num_hashes <= 0 {
        return Err(
            Error::deserial("num_hashes must be positive").with_context("num_hashes", num_hashes)
        );
    }

    let num_bits = if B::LENGTH_BYTES == 4 {
        cursor.read_i32_be().map(i64::from)
    } else {
        cursor.read_i64_be()
    }
    .map_err(|_| Error::insufficient_data("num_bits"))?;
    if num_bits <= 0 || num_bits as u64 > B::MAX_BITS {
        return Err(Error::deserial(format!(
            "num_bits must be between 1 and {}",
            B::MAX_BITS
        ))
        .with_context("num_bits", num_bits));
    }
    let num_bits = num_bits as u64;

    let num_bytes = num_bits.div_ceil(8);
    let remaining = cursor.remaining() as u64;
    if remaining < num_bytes {
        return Err(Error::insufficient_data(format!(
            "bit array needs {num_bytes} bytes, found {remaining}"
        )));
    }
    if remaining > num_bytes {
        return Err(Error::deserial(format!(
            "{} trailing bytes after bit array",
            remaining - num_bytes
        )));
    }
    let payload = cursor
        .read_slice(num_bytes as usize)
        .map_err(|_| Error::insufficient_data("bit_array"))?;

    let excess_bits = num_bits % 8;
    if excess_bits != 0 {
        let last = payload[payload.len() - 1];
        if last >> excess_bits != 0 {
            return Err(Error::deserial("padding bits past num_bits are set")
                .with_context("last_byte", format!("{last:#04x}")));
        }
    }

    let words = payload.chunks(8).map(|chunk| {
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        u64::from_le_bytes(buf)
    });
    Ok(BloomFilter::from_parts(
        num_hashes as u32,
        B::from_words(num_bits, words),
    ))
}
