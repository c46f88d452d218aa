use std::sync::Arc;

use quickcheck_macros::quickcheck;
use stablecall::{ArgEq, Params, SkipMask};

#[quickcheck]
fn prop_f64_reflexive(bits: u64) -> bool {
    let x = f64::from_bits(bits);
    x.same(&x)
}

#[quickcheck]
fn prop_f64_symmetric(a: u64, b: u64) -> bool {
    let x = f64::from_bits(a);
    let y = f64::from_bits(b);
    x.same(&y) == y.same(&x)
}

#[quickcheck]
fn prop_string_matches_eq(a: String, b: String) -> bool {
    a.same(&b) == (a == b)
}

#[quickcheck]
fn prop_vec_reflexive(xs: Vec<u32>) -> bool {
    xs.same(&xs)
}

#[quickcheck]
fn prop_skip_never_adds_mismatch(a: (u32, u32), b: (u32, u32)) -> bool {
    // Masking positions can only turn a mismatch into a match.
    let unmasked = a.unchanged(&b, &SkipMask::EMPTY);
    let masked = a.unchanged(&b, &SkipMask::new(0b11, 2));
    !unmasked || masked
}

#[test]
fn test_float_bit_semantics() {
    assert!(f64::NAN.same(&f64::NAN));
    assert!(f32::NAN.same(&f32::NAN));
    assert!(!0.0f64.same(&-0.0f64));
    assert!(0.5f32.same(&0.5f32));
}

#[test]
fn test_array_elementwise() {
    assert!([1u32, 2, 3].same(&[1, 2, 3]));
    assert!(![1u32, 2, 3].same(&[1, 2, 4]));
    assert!([f64::NAN].same(&[f64::NAN]));
}

#[test]
fn test_option_and_slice() {
    assert!(Some(7u32).same(&Some(7)));
    assert!(!Some(7u32).same(&None));
    assert!(None::<u32>.same(&None));
    assert!(vec![1u8, 2].same(&vec![1, 2]));
    assert!(!vec![1u8].same(&vec![1, 2]));
}

#[test]
fn test_arc_identity_short_circuit() {
    let a = Arc::new(5u32);
    assert!(a.same(&a.clone()));
    assert!(Arc::new(5u32).same(&Arc::new(5u32)));
    assert!(!Arc::new(5u32).same(&Arc::new(6u32)));
}

#[test]
fn test_skip_mask_positions() {
    let mask = SkipMask::new(0b101, 3);
    assert!(mask.skips(0));
    assert!(!mask.skips(1));
    assert!(mask.skips(2));
    // Beyond the skip count, positions always compare.
    assert!(!mask.skips(3));
}

#[test]
fn test_masked_neutralizes_positions() {
    let old = (1u32, 2u32);
    let new = (9u32, 3u32);
    let mask = SkipMask::new(0b01, 1);
    assert_eq!(old.masked(&new, &mask), (1, 3));
}

#[test]
fn test_unchanged_respects_mask() {
    let old = (1u32, 2u32, 3u32);
    let mask = SkipMask::new(0b001, 1);
    assert!(old.unchanged(&(9, 2, 3), &mask));
    assert!(!old.unchanged(&(1, 9, 3), &mask));
    assert!(!old.unchanged(&(1, 2, 9), &mask));
}
