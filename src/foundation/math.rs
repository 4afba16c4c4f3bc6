pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y).min(255) as u8
}

/// Map a unit-interval value to an 8-bit alpha, rounding and clamping to `[0, 255]`.
pub fn unit_to_alpha(v: f64) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    (255.0 * v).round().clamp(0.0, 255.0) as u8
}
