use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(200, 0), 0);
}

#[test]
fn luma_of_white_and_black() {
    assert!((luma_u8(255, 255, 255) - 255.0).abs() < 1e-3);
    assert_eq!(luma_u8(0, 0, 0), 0.0);
    assert!(luma_u8(0, 255, 0) > luma_u8(255, 0, 0));
}

#[test]
fn round_to_u8_saturates() {
    assert_eq!(round_to_u8(-4.0), 0);
    assert_eq!(round_to_u8(254.6), 255);
    assert_eq!(round_to_u8(300.0), 255);
    assert_eq!(round_to_u8(f32::NAN), 0);
}

#[test]
fn reflect101_mirrors_without_repeating_edge() {
    assert_eq!(reflect101(-1, 5), 1);
    assert_eq!(reflect101(-2, 5), 2);
    assert_eq!(reflect101(0, 5), 0);
    assert_eq!(reflect101(4, 5), 4);
    assert_eq!(reflect101(5, 5), 3);
    assert_eq!(reflect101(6, 5), 2);
    assert_eq!(reflect101(17, 1), 0);
}
