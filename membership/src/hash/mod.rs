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

//! Hash primitives used to derive bucket positions.
//!
//! A filter never hashes a key more than twice: once with seed 0 and once more seeded with the
//! first result. Any 64-bit non-cryptographic hash with good avalanche behavior can fill that
//! role through [`KeyHasher`]; [`Murmur3`] is the default.
//!
//! Filters can only be merged, or shared between processes, when they were populated with the
//! same hasher.

mod murmurhash;

pub(crate) use self::murmurhash::MurmurHash3X64128;

/// A seeded 64-bit hash over raw key bytes.
pub trait KeyHasher {
    /// Hashes `bytes` with the given `seed`.
    ///
    /// Must be deterministic across calls, processes and machines.
    fn hash64(&self, bytes: &[u8], seed: u64) -> u64;
}

/// MurmurHash3 x64/128, truncated to its first 64-bit half.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Murmur3;

impl KeyHasher for Murmur3 {
    fn hash64(&self, bytes: &[u8], seed: u64) -> u64 {
        use std::hash::Hasher;

        let mut hasher = MurmurHash3X64128::with_seed(seed);
        hasher.write(bytes);
        hasher.finish()
    }
}

impl<H: KeyHasher + ?Sized> KeyHasher for &H {
    fn hash64(&self, bytes: &[u8], seed: u64) -> u64 {
        (**self).hash64(bytes, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur3_is_first_half() {
        let key = b"The quick brown fox jumps over the lazy dog";
        assert_eq!(Murmur3.hash64(key, 0), 0xe34bbc7bbc071b6c);
    }

    #[test]
    fn test_seed_changes_hash() {
        let key = b"apple";
        let h1 = Murmur3.hash64(key, 0);
        let h2 = Murmur3.hash64(key, h1);
        assert_eq!(h1, 0xe59668c380f21c67);
        assert_eq!(h2, 0x5d67e18c75e5c2d0);
        assert_eq!(h2, Murmur3.hash64(key, h1));
    }

    #[test]
    fn test_empty_input_is_deterministic() {
        assert_eq!(Murmur3.hash64(&[], 0), Murmur3.hash64(&[], 0));
        // Seed 0 over empty input mixes nothing in.
        assert_eq!(Murmur3.hash64(&[], 0), 0);
        assert_ne!(Murmur3.hash64(&[], 1), 0);
    }
}
