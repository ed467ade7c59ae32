use super::*;

#[test]
fn fnv_split_writes_hash_the_same() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"drape");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'd');
    b.write_bytes(b"rape");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_str_is_length_prefixed() {
    let mut a = Fnv1a64::new_default();
    a.write_str("ab");
    a.write_str("c");
    let mut b = Fnv1a64::new_default();
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(add_sat_u8(200, 100), 255);
}

