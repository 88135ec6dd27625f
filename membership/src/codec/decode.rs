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

use std::io;
use std::io::Cursor;

use byteorder::BigEndian;
use byteorder::ReadBytesExt;

/// A wrapper around a byte slice that reads the big-endian values written by
/// [`super::FilterBytes`].
pub(crate) struct FilterSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> FilterSlice<'a> {
    /// Creates a new `FilterSlice` from the given byte slice.
    pub fn new(slice: &'a [u8]) -> Self {
        FilterSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Returns the number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        let len = self.slice.get_ref().len();
        len.saturating_sub(self.slice.position() as usize)
    }

    /// Reads a 32-bit signed integer in big-endian byte order.
    pub fn read_i32_be(&mut self) -> io::Result<i32> {
        self.slice.read_i32::<BigEndian>()
    }

    /// Reads a 64-bit signed integer in big-endian byte order.
    pub fn read_i64_be(&mut self) -> io::Result<i64> {
        self.slice.read_i64::<BigEndian>()
    }

    /// Borrows the next `n` bytes and advances past them.
    pub fn read_slice(&mut self, n: usize) -> io::Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        let start = self.slice.position() as usize;
        let inner: &'a [u8] = *self.slice.get_ref();
        self.slice.set_position((start + n) as u64);
        Ok(&inner[start..start + n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_values_and_slices() {
        let data = [0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 1, 0, 0xaa, 0xbb];
        let mut slice = FilterSlice::new(&data);
        assert_eq!(slice.read_i32_be().unwrap(), 7);
        assert_eq!(slice.read_i64_be().unwrap(), 256);
        assert_eq!(slice.remaining(), 2);
        assert_eq!(slice.read_slice(2).unwrap(), &[0xaa, 0xbb]);
        assert_eq!(slice.remaining(), 0);
    }

    #[test]
    fn test_truncated_reads_fail() {
        let mut slice = FilterSlice::new(&[0, 1]);
        assert!(slice.read_i32_be().is_err());

        let mut slice = FilterSlice::new(&[0, 1, 2]);
        assert!(slice.read_slice(4).is_err());
        assert_eq!(slice.remaining(), 3);
    }
}
