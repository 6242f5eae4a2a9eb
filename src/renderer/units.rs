//! Unit conversion
//!
//! The Slides API sizes and places page elements in EMU (English Metric
//! Units), an integral unit. Geometry arrives in inches or centimeters and
//! is converted here before any remote call.

/// EMU per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per centimeter
pub const EMU_PER_CM: i64 = 360_000;

/// Convert inches to EMU, truncating toward zero.
pub fn inches_to_emu(inches: f64) -> i64 {
    truncate_to_emu(inches * EMU_PER_INCH as f64)
}

/// Convert centimeters to EMU, truncating toward zero.
pub fn cm_to_emu(cm: f64) -> i64 {
    truncate_to_emu(cm * EMU_PER_CM as f64)
}

/// Convert EMU back to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert EMU back to centimeters.
pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMU_PER_CM as f64
}

/// Truncate toward zero after absorbing a few ulps of float noise, so that
/// `emu -> inches -> emu` lands on the same integer.
fn truncate_to_emu(raw: f64) -> i64 {
    let nearest = raw.round();
    if (raw - nearest).abs() <= raw.abs() * f64::EPSILON * 4.0 {
        nearest as i64
    } else {
        raw.trunc() as i64
    }
}
