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

//! Table-driven Bloom filter sizing.
//!
//! The tables below were tuned empirically and are kept verbatim rather than regenerated from
//! the closed-form estimate.

const MIN_BITS_PER_ELEMENT: usize = 2;
const MAX_BITS_PER_ELEMENT: usize = 19;
const MIN_HASHES: usize = 1;
const MAX_HASHES: usize = 13;

/// Hash count minimizing the false-positive rate, indexed by bits per element.
///
/// Entries 0 and 1 are placeholders.
const OPT_HASHES_PER_BITS: [u32; 27] = [
    1, 1, 1, 2, 3, 3, 4, 5, 5, 6, 7, 8, 8, 9, 10, 10, 11, 12, 12, 13, 14, 15, 16, 17, 18, 19, 20,
];

/// False-positive rates: row `i` uses `i` bits per element, column `j` uses `j` hash functions.
///
/// Rows 0 and 1 and column 0 are placeholders.
const PROBS: [&[f64]; 21] = [
    &[1.0],
    &[1.0, 1.0],
    &[1.0, 0.393, 0.400],
    &[1.0, 0.283, 0.237, 0.253],
    &[1.0, 0.221, 0.155, 0.147, 0.160],
    &[1.0, 0.181, 0.109, 0.092, 0.092, 0.101],
    &[1.0, 0.154, 0.0804, 0.0609, 0.0561, 0.0578, 0.0638],
    &[1.0, 0.133, 0.0618, 0.0423, 0.0359, 0.0347, 0.0364],
    &[1.0, 0.118, 0.0489, 0.0306, 0.024, 0.0217, 0.0216, 0.0229],
    &[
        1.0, 0.105, 0.0397, 0.0228, 0.0166, 0.0141, 0.0133, 0.0135, 0.0145,
    ],
    &[
        1.0, 0.0952, 0.0329, 0.0174, 0.0118, 0.00943, 0.00844, 0.00819, 0.00846,
    ],
    &[
        1.0, 0.0869, 0.0276, 0.0136, 0.00864, 0.0065, 0.00552, 0.00513, 0.00509,
    ],
    &[
        1.0, 0.08, 0.0236, 0.0108, 0.00646, 0.00459, 0.00371, 0.00329, 0.00314,
    ],
    &[
        1.0, 0.074, 0.0203, 0.00875, 0.00492, 0.00332, 0.00255, 0.00217, 0.00199, 0.00194,
    ],
    &[
        1.0, 0.0689, 0.0177, 0.00718, 0.00381, 0.00244, 0.00179, 0.00146, 0.00129, 0.00121,
        0.0012,
    ],
    &[
        1.0, 0.0645, 0.0156, 0.00596, 0.003, 0.00183, 0.00128, 0.001, 0.000852, 0.000775,
        0.000744,
    ],
    &[
        1.0, 0.0606, 0.0138, 0.005, 0.00239, 0.00139, 0.000935, 0.000702, 0.000574, 0.000505,
        0.00047, 0.000459,
    ],
    &[
        1.0, 0.0571, 0.0123, 0.00423, 0.00193, 0.00107, 0.000692, 0.000499, 0.000394, 0.000335,
        0.000302, 0.000287, 0.000284,
    ],
    &[
        1.0, 0.054, 0.0111, 0.00362, 0.00158, 0.000839, 0.000519, 0.00036, 0.000275, 0.000226,
        0.000198, 0.000183, 0.000176,
    ],
    &[
        1.0, 0.0513, 0.00998, 0.00312, 0.0013, 0.000663, 0.000394, 0.000264, 0.000194, 0.000155,
        0.000132, 0.000118, 0.000111, 0.000109,
    ],
    &[
        1.0, 0.0488, 0.00906, 0.0027, 0.00108, 0.00053, 0.000303, 0.000196, 0.00014, 0.000108,
        8.89e-05, 7.77e-05, 7.12e-05, 6.79e-05, 6.71e-05,
    ],
];

/// The two sizing parameters of a Bloom filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomSpecification {
    num_hashes: u32,
    bits_per_element: u32,
}

impl BloomSpecification {
    /// Creates a specification from explicit values.
    pub fn new(num_hashes: u32, bits_per_element: u32) -> Self {
        BloomSpecification {
            num_hashes,
            bits_per_element,
        }
    }

    /// Returns the number of hash functions (k).
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the number of bits allotted to each expected element.
    pub fn bits_per_element(&self) -> u32 {
        self.bits_per_element
    }

    /// Returns the closed-form false-positive estimate for this specification.
    pub fn false_positive_probability(&self) -> f64 {
        false_positive_probability(self.bits_per_element, self.num_hashes)
    }
}

/// Returns the hash count that minimizes the false-positive rate for `bits_per_element`.
///
/// Ratios past the end of the table get the table's last entry.
///
/// # Examples
///
/// ```
/// # use membership::bloom::best_num_hashes;
/// assert_eq!(best_num_hashes(10), 7);
/// assert_eq!(best_num_hashes(1000), 20);
/// ```
pub fn best_num_hashes(bits_per_element: u32) -> u32 {
    let index = (bits_per_element as usize).min(OPT_HASHES_PER_BITS.len() - 1);
    OPT_HASHES_PER_BITS[index]
}

/// Picks the cheapest specification whose tabulated false-positive rate does not exceed
/// `max_fpp`.
///
/// Bits per element are minimized first, then the hash count for that many bits. Requests
/// looser than the table's loosest entry get the minimum configuration (2 bits, 1 hash);
/// requests tighter than its tightest entry get the maximum configuration (19 bits, 13 hashes),
/// which then does not meet the requested bound.
///
/// # Examples
///
/// ```
/// # use membership::bloom::compute_specification;
/// let spec = compute_specification(0.01);
/// assert_eq!(spec.bits_per_element(), 10);
/// assert_eq!(spec.num_hashes(), 5);
/// ```
pub fn compute_specification(max_fpp: f64) -> BloomSpecification {
    if max_fpp >= PROBS[MIN_BITS_PER_ELEMENT][MIN_HASHES] {
        return BloomSpecification::new(
            OPT_HASHES_PER_BITS[MIN_BITS_PER_ELEMENT],
            MIN_BITS_PER_ELEMENT as u32,
        );
    }
    if max_fpp < PROBS[MAX_BITS_PER_ELEMENT][MAX_HASHES] {
        tracing::warn!(
            max_fpp,
            best_available = PROBS[MAX_BITS_PER_ELEMENT][MAX_HASHES],
            "requested false positive probability is below the table minimum"
        );
        return BloomSpecification::new(MAX_HASHES as u32, MAX_BITS_PER_ELEMENT as u32);
    }

    let mut bits = MIN_BITS_PER_ELEMENT;
    let mut k = OPT_HASHES_PER_BITS[bits] as usize;
    while PROBS[bits][k] > max_fpp {
        bits += 1;
        k = OPT_HASHES_PER_BITS[bits] as usize;
    }
    // Enough bits now; drop hashes while the bound still holds.
    while PROBS[bits][k - 1] <= max_fpp {
        k -= 1;
    }

    BloomSpecification::new(k as u32, bits as u32)
}

/// Closed-form false-positive estimate `(1 - e^(-k / c))^k` for `c` bits per element and `k`
/// hash functions.
pub fn false_positive_probability(bits_per_element: u32, num_hashes: u32) -> f64 {
    let k = f64::from(num_hashes);
    let c = f64::from(bits_per_element);
    (1.0 - (-k / c).exp()).powf(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        for (bits, row) in PROBS.iter().enumerate().skip(MIN_BITS_PER_ELEMENT) {
            let k = OPT_HASHES_PER_BITS[bits] as usize;
            assert!(k < row.len(), "row {bits} has no column for k={k}");
        }
        assert_eq!(PROBS[MAX_BITS_PER_ELEMENT].len(), MAX_HASHES + 1);
    }

    #[test]
    fn test_best_num_hashes() {
        assert_eq!(best_num_hashes(0), 1);
        assert_eq!(best_num_hashes(1), 1);
        assert_eq!(best_num_hashes(2), 1);
        assert_eq!(best_num_hashes(5), 3);
        assert_eq!(best_num_hashes(10), 7);
        assert_eq!(best_num_hashes(26), 20);
        assert_eq!(best_num_hashes(27), 20);
        assert_eq!(best_num_hashes(u32::MAX), 20);
    }

    #[test]
    fn test_loose_request_gets_minimum() {
        assert_eq!(compute_specification(1.0), BloomSpecification::new(1, 2));
        assert_eq!(compute_specification(0.393), BloomSpecification::new(1, 2));
        assert_eq!(compute_specification(0.5), BloomSpecification::new(1, 2));
    }

    #[test]
    fn test_tight_request_gets_maximum() {
        assert_eq!(compute_specification(0.000109), BloomSpecification::new(13, 19));
        assert_eq!(compute_specification(1e-9), BloomSpecification::new(13, 19));
    }

    #[test]
    fn test_prefers_fewer_bits_then_fewer_hashes() {
        // 9 bits reach 0.0133 at best, so 10 bits are needed; 5 hashes already give 0.00943.
        assert_eq!(compute_specification(0.01), BloomSpecification::new(5, 10));
        // 5 bits with 3 hashes give 0.092; 2 hashes would be 0.109.
        assert_eq!(compute_specification(0.1), BloomSpecification::new(3, 5));
        assert_eq!(compute_specification(0.001), BloomSpecification::new(7, 15));
    }

    #[test]
    fn test_false_positive_probability() {
        let p = false_positive_probability(10, 7);
        assert!((p - 0.00819).abs() < 1e-4, "{p}");
        assert_eq!(
            BloomSpecification::new(7, 10).false_positive_probability(),
            false_positive_probability(10, 7)
        );
    }
}
