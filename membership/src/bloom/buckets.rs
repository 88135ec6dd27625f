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

use std::iter::FusedIterator;

use super::BloomKey;
use crate::hash::KeyHasher;
use crate::hash::Murmur3;

/// Returns the `num_hashes` bucket ordinals in `[0, num_buckets)` for `key`, using the default
/// hasher.
///
/// # Panics
///
/// Panics if `num_buckets` is 0 or larger than `i64::MAX`.
///
/// # Examples
///
/// ```
/// # use membership::bloom::hash_buckets;
/// let buckets = hash_buckets("apple", 4, 1000);
/// assert_eq!(buckets.len(), 4);
/// assert!(buckets.iter().all(|&b| b < 1000));
/// assert_eq!(buckets, hash_buckets("apple", 4, 1000));
/// ```
pub fn hash_buckets<K: BloomKey + ?Sized>(key: &K, num_hashes: u32, num_buckets: u64) -> Vec<u64> {
    hash_buckets_with(&Murmur3, key, num_hashes, num_buckets)
}

/// Like [`hash_buckets`], with a caller-supplied hash function.
///
/// # Panics
///
/// Panics if `num_buckets` is 0 or larger than `i64::MAX`.
pub fn hash_buckets_with<H, K>(hasher: &H, key: &K, num_hashes: u32, num_buckets: u64) -> Vec<u64>
where
    H: KeyHasher + ?Sized,
    K: BloomKey + ?Sized,
{
    Buckets::new(hasher, &key.key_bytes(), num_hashes, num_buckets).collect()
}

/// Iterator over the bucket ordinals of one key.
///
/// Two base hashes are computed up front: `h1` with seed 0 and `h2` seeded with `h1`. Bucket
/// `i` is then `|(h1 + i * h2) mod m|` in wrapping signed 64-bit arithmetic, so any number of
/// buckets costs two hash evaluations (Kirsch and Mitzenmacher, "Less Hashing, Same
/// Performance").
#[derive(Debug, Clone)]
pub(crate) struct Buckets {
    h1: i64,
    h2: i64,
    next: u32,
    num_hashes: u32,
    num_buckets: i64,
}

impl Buckets {
    pub fn new<H: KeyHasher + ?Sized>(
        hasher: &H,
        bytes: &[u8],
        num_hashes: u32,
        num_buckets: u64,
    ) -> Self {
        assert!(
            num_buckets > 0 && num_buckets <= i64::MAX as u64,
            "num_buckets must be in [1, i64::MAX], got {num_buckets}"
        );
        let h1 = hasher.hash64(bytes, 0);
        let h2 = hasher.hash64(bytes, h1);
        Buckets {
            h1: h1 as i64,
            h2: h2 as i64,
            next: 0,
            num_hashes,
            num_buckets: num_buckets as i64,
        }
    }
}

impl Iterator for Buckets {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.num_hashes {
            return None;
        }
        let i = i64::from(self.next);
        self.next += 1;
        let combined = self.h1.wrapping_add(i.wrapping_mul(self.h2));
        Some((combined % self.num_buckets).unsigned_abs())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.num_hashes - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Buckets {}

impl FusedIterator for Buckets {}
