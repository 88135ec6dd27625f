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

use googletest::assert_that;
use googletest::prelude::eq;
use googletest::prelude::lt;
use membership::bloom::BitSet;
use membership::bloom::BitVector;
use membership::bloom::BloomFilter;
use membership::bloom::BloomFilterBuilder;
use membership::bloom::hash_buckets;
use membership::error::ErrorKind;

fn false_positive_rate(filter: &BloomFilter, samples: usize) -> f64 {
    let hits = (0..samples)
        .filter(|i| filter.contains(&format!("absent-{i}")))
        .count();
    hits as f64 / samples as f64
}

#[test]
fn test_thousand_elements_ten_bits_each() {
    let mut filter = BloomFilterBuilder::with_bits_per_element(1000, 10)
        .build()
        .unwrap();
    assert_eq!(filter.num_buckets(), 1000 * 10 + 20);
    assert_eq!(filter.num_buckets(), 10_020);

    for i in 0..1000 {
        filter.insert(&format!("key-{i}"));
    }
    for i in 0..1000 {
        assert!(filter.contains(&format!("key-{i}")), "key-{i}");
    }

    assert_that!(false_positive_rate(&filter, 100_000), lt(0.02));
}

#[test]
fn test_false_positive_bound_from_probability() {
    let max_fpp = 0.01;
    let mut filter = BloomFilterBuilder::with_accuracy(10_000, max_fpp)
        .build()
        .unwrap();
    for i in 0..10_000 {
        filter.insert(&format!("key-{i}"));
    }

    // sampling noise at 100k draws is about 3e-4
    assert_that!(false_positive_rate(&filter, 100_000), lt(max_fpp * 1.2));
}

#[test]
fn test_no_false_negatives_across_states() {
    let mut filter = BloomFilterBuilder::with_accuracy(500, 0.05).build().unwrap();
    let mut inserted = vec![];
    for i in 0..500 {
        let key = format!("user:{i}");
        filter.insert(&key);
        inserted.push(key);
        if i % 50 == 0 {
            assert!(inserted.iter().all(|k| filter.contains(k)));
        }
    }
    assert!(inserted.iter().all(|k| filter.contains(k)));
}

#[test]
fn test_insert_if_absent_reports_new_keys() {
    let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.001).build().unwrap();
    let newly_seen = (0..1000)
        .filter(|i| filter.insert_if_absent(&format!("key-{i}")))
        .count();
    // false positives can only hide new keys, never invent them
    assert!(newly_seen <= 1000);
    assert!(newly_seen > 990, "{newly_seen}");
    assert_eq!(
        (0..1000)
            .filter(|i| filter.insert_if_absent(&format!("key-{i}")))
            .count(),
        0
    );
}

#[test]
fn test_union_semantics() {
    let builder = BloomFilterBuilder::with_bits_per_element(200, 8);
    let mut a = builder.clone().build().unwrap();
    let mut b = builder.build().unwrap();
    for i in 0..200 {
        a.insert(&format!("a-{i}"));
        b.insert(&format!("b-{i}"));
    }

    let ab = a.merge([&b]).unwrap();
    let ba = b.merge([&a]).unwrap();
    assert_eq!(ab, ba);

    let probes: Vec<String> = (0..200)
        .flat_map(|i| [format!("a-{i}"), format!("b-{i}"), format!("c-{i}")])
        .collect();
    for key in &probes {
        if a.contains(key) || b.contains(key) {
            assert!(ab.contains(key), "{key}");
        }
    }

    a.union(&b).unwrap();
    assert_eq!(a, ab);
}

#[test]
fn test_merge_requires_same_hash_count() {
    let a = BloomFilterBuilder::with_bits_per_element(100, 10)
        .build()
        .unwrap();
    let b = BloomFilterBuilder::with_bits_per_element(100, 10)
        .num_hashes(3)
        .build()
        .unwrap();
    assert_eq!(a.num_buckets(), b.num_buckets());

    let err = a.merge([&b]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);

    let mut a = a;
    let err = a.union(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
}

#[test]
fn test_filter_buckets_match_free_function() {
    let filter = BloomFilterBuilder::with_bits_per_element(1000, 10)
        .build()
        .unwrap();
    for key in ["", "a", "hello world"] {
        assert_eq!(
            filter.hash_buckets(key),
            hash_buckets(key, filter.num_hashes(), filter.num_buckets())
        );
    }
}

#[test]
fn test_always_matching_filter() {
    let filter: BloomFilter = BloomFilter::always_matching();
    assert!(filter.contains(""));
    assert!(filter.contains(b""));
    for i in 0..1000 {
        assert!(filter.contains(&format!("random-{i}")));
    }
    assert_that!(filter.bit_vector().count_ones(), eq(64_u64));
}

#[test]
fn test_from_parts_bypasses_sizing() {
    let filter = BloomFilter::from_parts(9, BitSet::with_len(77));
    assert_eq!(filter.num_hashes(), 9);
    assert_eq!(filter.num_buckets(), 77);
}

#[test]
fn test_clamped_specification_still_builds() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let filter = BloomFilterBuilder::with_accuracy(100, 1e-12).build().unwrap();
    assert_eq!(filter.num_hashes(), 13);
    assert_eq!(filter.num_buckets(), 100 * 19 + 20);
}
