use super::{ScaleError, scale, scale_to_byte};

#[test]
fn test_scale_midpoint() {
    assert_eq!(scale::<i32>(0.0, 10.0, 5.0, 0.0, 100.0, true), Ok(50));
}

#[test]
fn test_scale_clamps_above_range() {
    assert_eq!(scale::<i32>(0.0, 10.0, 15.0, 0.0, 100.0, true), Ok(100));
    assert_eq!(scale::<i32>(0.0, 10.0, -3.0, 0.0, 100.0, true), Ok(0));
}

#[test]
fn test_scale_extrapolates_without_clamp() {
    assert_eq!(scale::<i32>(0.0, 10.0, 15.0, 0.0, 100.0, false), Ok(150));
    assert_eq!(scale::<i32>(0.0, 10.0, -5.0, 0.0, 100.0, false), Ok(-50));
}

#[test]
fn test_scale_truncates_toward_zero() {
    // 1/3 * 100 = 33.33..
    assert_eq!(scale::<u8>(0.0, 3.0, 1.0, 0.0, 100.0, true), Ok(33));
    // -1.1 must become -1, not -2
    assert_eq!(scale::<i16>(-1.0, 1.0, -0.11, -10.0, 10.0, true), Ok(-1));
}

#[test]
fn test_scale_descending_ranges() {
    assert_eq!(scale::<i32>(10.0, 0.0, 2.5, 0.0, 100.0, true), Ok(75));
    assert_eq!(scale::<i32>(0.0, 10.0, 2.5, 100.0, 0.0, true), Ok(75));
    assert_eq!(scale::<i32>(10.0, 0.0, 20.0, 0.0, 100.0, true), Ok(0));
}

#[test]
fn test_scale_rejects_degenerate_range() {
    assert_eq!(
        scale::<i32>(4.0, 4.0, 4.0, 0.0, 100.0, true),
        Err(ScaleError::DegenerateRange)
    );
    assert_eq!(scale_to_byte(1.0, 1.0, 0.0), Err(ScaleError::DegenerateRange));
}

#[test]
fn test_scale_rejects_unrepresentable_output() {
    assert_eq!(
        scale::<u8>(0.0, 10.0, 15.0, 0.0, 255.0, false),
        Err(ScaleError::OutOfDomain)
    );
    assert_eq!(
        scale::<u8>(0.0, 10.0, f64::NAN, 0.0, 255.0, true),
        Err(ScaleError::OutOfDomain)
    );
}

#[test]
fn test_scale_to_byte_bounds() {
    assert_eq!(scale_to_byte(0.0, 100.0, 0.0), Ok(0));
    assert_eq!(scale_to_byte(0.0, 100.0, 100.0), Ok(255));
    assert_eq!(scale_to_byte(0.0, 100.0, 250.0), Ok(255));
    assert_eq!(scale_to_byte(-100.0, 100.0, 0.0), Ok(127));
}
