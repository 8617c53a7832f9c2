use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use archgraph::engine::bitset::BitSet;

fn hash_of(set: &BitSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    set.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn values_round_trip_in_ascending_order() {
    let ids = [97usize, 3, 0, 31, 32, 64, 5, 200];
    let mut set = BitSet::new();
    for &id in &ids {
        set.or(id);
    }

    let mut expected = ids.to_vec();
    expected.sort_unstable();
    assert_eq!(set.values(), expected);
    assert_eq!(set.len(), ids.len());
}

#[test]
fn growth_preserves_bits_and_zero_fills() {
    let mut set = BitSet::with_capacity(1);
    set.or(1);
    assert_eq!(set.word_len(), 1);

    set.or(100);
    assert_eq!(set.word_len(), 4);
    assert!(set.has(1));
    assert!(set.has(100));
    assert!(!set.has(64));
    assert_eq!(set.words()[1], 0);
    assert_eq!(set.words()[2], 0);
}

#[test]
fn out_of_range_reads_are_false() {
    let set = BitSet::new();
    assert!(!set.has(0));
    assert!(!set.has(10_000));
    assert!(set.is_empty());
}

#[test]
fn xor_toggles_and_grows() {
    let mut set = BitSet::new();
    set.xor(40);
    assert!(set.has(40));
    assert_eq!(set.word_len(), 2);
    set.xor(40);
    assert!(!set.has(40));
    assert!(set.is_empty());
    // Storage never shrinks.
    assert_eq!(set.word_len(), 2);
}

#[test]
fn copy_equals_original() {
    let set: BitSet = [1usize, 33, 65].into_iter().collect();
    let copy = set.copy();
    assert!(copy.equals(&set));
    assert!(set.equals(&copy));
}

#[test]
fn equality_and_hash_ignore_trailing_zero_words() {
    let mut small = BitSet::with_capacity(1);
    small.or(3);
    let mut large = BitSet::with_capacity(8);
    large.or(3);

    assert_eq!(small, large);
    assert_eq!(hash_of(&small), hash_of(&large));

    large.or(200);
    assert_ne!(small, large);
}

#[test]
fn set_operations_between_different_sizes() {
    let a: BitSet = [0usize, 2, 40].into_iter().collect();
    let b: BitSet = [2usize, 3].into_iter().collect();

    let union = a.union(&b);
    assert_eq!(union.values(), vec![0, 2, 3, 40]);
    assert_eq!(union.word_len(), 2);

    let intersection = a.intersection(&b);
    assert_eq!(intersection.values(), vec![2]);
    assert_eq!(intersection.word_len(), 1);

    let difference = a.difference(&b);
    assert_eq!(difference.values(), vec![0, 40]);
    assert_eq!(difference.word_len(), a.word_len());

    let symmetric = a.symmetric_difference(&b);
    assert_eq!(symmetric.values(), vec![0, 3, 40]);
    assert_eq!(symmetric.word_len(), 2);
}

#[test]
fn contains_and_intersects() {
    let a: BitSet = [1usize, 2, 70].into_iter().collect();
    let sub: BitSet = [1usize, 70].into_iter().collect();
    let other: BitSet = [5usize].into_iter().collect();
    let empty = BitSet::new();

    assert!(a.contains(&sub));
    assert!(!sub.contains(&a));
    assert!(a.contains(&empty));
    assert!(a.contains(&a));

    assert!(a.intersects(&sub));
    assert!(!a.intersects(&other));
    assert!(!a.intersects(&empty));
}

#[test]
fn contains_treats_missing_words_as_zero() {
    let short: BitSet = [1usize].into_iter().collect();
    let mut long = BitSet::with_capacity(4);
    long.or(1);

    assert!(short.contains(&long));
    long.or(100);
    assert!(!short.contains(&long));
}

#[test]
fn union_with_complement_covers_addressed_range() {
    let set: BitSet = [0usize, 7, 45].into_iter().collect();
    let full = set.union(&set.not());
    let expected: Vec<usize> = (0..set.bit_capacity()).collect();
    assert_eq!(full.values(), expected);
}

#[test]
fn display_is_hex_most_significant_first() {
    let mut set = BitSet::new();
    assert_eq!(set.to_string(), "0");
    set.or(0).or(32);
    assert_eq!(set.to_string(), "100000001");
}
