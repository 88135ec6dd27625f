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

use std::borrow::Cow;

/// Big-endian byte-order mark written ahead of every non-empty string key.
const BYTE_ORDER_MARK: [u8; 2] = [0xfe, 0xff];

/// A value that can be inserted into or looked up in a Bloom filter.
///
/// The bytes returned here are exactly what gets hashed, so two filters agree on a key only if
/// they agree on its encoding. Byte keys are hashed as-is. String keys are encoded as UTF-16
/// big-endian with a leading byte-order mark, independent of platform or locale; the empty
/// string encodes to no bytes at all.
///
/// Under the default [`Murmur3`](crate::hash::Murmur3) hasher an empty key hashes to 0 under both
/// seeds, so every one of its buckets is bucket 0.
pub trait BloomKey {
    /// Returns the bytes that identify this key.
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

impl BloomKey for [u8] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> BloomKey for [u8; N] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl BloomKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl BloomKey for str {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(utf16_bytes(self))
    }
}

impl BloomKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        self.as_str().key_bytes()
    }
}

impl<K: BloomKey + ?Sized> BloomKey for &K {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        (**self).key_bytes()
    }
}

fn utf16_bytes(s: &str) -> Vec<u8> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut bytes = Vec::with_capacity(BYTE_ORDER_MARK.len() + 2 * s.len());
    bytes.extend_from_slice(&BYTE_ORDER_MARK);
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    bytes
}
