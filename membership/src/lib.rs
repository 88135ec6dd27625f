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

//! # Membership
//!
//! Probabilistic set-membership structures. The [`bloom`] module provides Bloom filters sized
//! from a precomputed false-positive table, backed either by a bounded bit vector or by a
//! segmented one addressable with 64-bit ordinals.
//!
//! ```rust
//! use membership::bloom::BloomFilterBuilder;
//!
//! let mut filter = BloomFilterBuilder::with_bits_per_element(1000, 10).build()?;
//! filter.insert("apple");
//! assert!(filter.contains("apple"));
//! # Ok::<(), membership::error::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod error;
pub mod hash;

mod codec;
