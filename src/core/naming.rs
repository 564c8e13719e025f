//! Filename construction from computed field values.
//!
//! Values are rendered in minimal decimal form (no trailing zeros, no
//! decimal point on whole numbers), the decimal point is swapped for a
//! filesystem-friendly mark, and the result is wrapped in the configured
//! prefix and suffix.

use crate::config::NamingConfig;
use crate::core::schedule::MAX_PRECISION;

/// Render a value rounded to `precision` digits in minimal decimal form.
///
/// The fractional part is trimmed of trailing zeros and dropped entirely
/// when zero, so `39.0` becomes `"39"` and `50.50` becomes `"50.5"`.
/// Rounding is half away from zero. Precisions above [`MAX_PRECISION`]
/// are clamped.
///
/// # Example
///
/// ```
/// use scan_renamer::core::naming::format_value;
///
/// assert_eq!(format_value(4.0, 3), "4");
/// assert_eq!(format_value(52.23456, 3), "52.235");
/// ```
pub fn format_value(value: f64, precision: u8) -> String {
    let precision = precision.min(MAX_PRECISION);
    let scale = 10i64.pow(u32::from(precision));
    let scaled = (value * scale as f64).round() as i64;

    let whole = (scaled / scale).abs();
    let frac = (scaled % scale).abs();

    let mut out = String::new();
    if scaled < 0 {
        out.push('-');
    }
    out.push_str(&whole.to_string());

    if frac > 0 {
        let digits = format!("{:0width$}", frac, width = precision as usize);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }

    out
}

/// Render a value with the decimal point replaced by `decimal_mark`.
pub fn format_field(value: f64, precision: u8, decimal_mark: &str) -> String {
    format_value(value, precision).replace('.', decimal_mark)
}

/// Build the full target filename for a computed field value.
///
/// # Arguments
///
/// * `naming` - Prefix, suffix and decimal mark to apply
/// * `value` - Field value to encode in the name
/// * `precision` - Decimal digits the value is rounded to
///
/// # Example
///
/// ```
/// use scan_renamer::config::NamingConfig;
/// use scan_renamer::core::naming::file_name;
///
/// let naming = NamingConfig::default();
/// assert_eq!(file_name(&naming, 39.0, 2), "COSO_FC_54,5K_39mT.DAT");
/// ```
pub fn file_name(naming: &NamingConfig, value: f64, precision: u8) -> String {
    format!(
        "{}{}{}",
        naming.prefix,
        format_field(value, precision, &naming.decimal_mark),
        naming.suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_whole_numbers() {
        assert_eq!(format_value(39.0, 2), "39");
        assert_eq!(format_value(4.0, 3), "4");
        assert_eq!(format_value(0.0, 3), "0");
        assert_eq!(format_value(-1.0, 2), "-1");
    }

    #[test]
    fn test_format_value_fractions() {
        assert_eq!(format_value(50.5, 3), "50.5");
        assert_eq!(format_value(58.5, 3), "58.5");
        assert_eq!(format_value(52.2, 3), "52.2");
        assert_eq!(format_value(54.3, 3), "54.3");
        assert_eq!(format_value(-0.5, 2), "-0.5");
    }

    #[test]
    fn test_format_value_trims_trailing_zeros() {
        assert_eq!(format_value(50.500, 3), "50.5");
        assert_eq!(format_value(1.200, 3), "1.2");
        assert_eq!(format_value(1.25, 3), "1.25");
    }

    #[test]
    fn test_format_value_rounds_half_away_from_zero() {
        assert_eq!(format_value(52.23456, 3), "52.235");
        assert_eq!(format_value(2.5, 0), "3");
        assert_eq!(format_value(-2.5, 0), "-3");
        assert_eq!(format_value(1.0006, 3), "1.001");
    }

    #[test]
    fn test_format_value_clamps_precision() {
        assert_eq!(format_value(1.5, 200), "1.5");
    }

    #[test]
    fn test_format_field_replaces_mark() {
        assert_eq!(format_field(50.5, 3, ","), "50,5");
        assert_eq!(format_field(50.5, 3, "p"), "50p5");
        assert_eq!(format_field(39.0, 2, ","), "39");
    }

    #[test]
    fn test_format_field_round_trip() {
        use crate::core::schedule::round_to;

        // Undoing the mark substitution and parsing recovers the rounded
        // value exactly.
        for &(value, precision) in &[
            (39.0, 2u8),
            (4.0, 3),
            (50.5, 3),
            (52.23456, 3),
            (-0.5, 2),
            (58.5, 3),
        ] {
            let text = format_field(value, precision, ",");
            let parsed: f64 = text.replace(',', ".").parse().unwrap();
            assert_eq!(parsed, round_to(value, precision), "{}", text);
        }
    }

    #[test]
    fn test_file_name_default_naming() {
        let naming = NamingConfig::default();
        assert_eq!(file_name(&naming, 39.0, 2), "COSO_FC_54,5K_39mT.DAT");
        assert_eq!(file_name(&naming, 0.0, 2), "COSO_FC_54,5K_0mT.DAT");
        assert_eq!(file_name(&naming, 4.0, 3), "COSO_FC_54,5K_4mT.DAT");
        assert_eq!(file_name(&naming, 50.5, 3), "COSO_FC_54,5K_50,5mT.DAT");
    }

    #[test]
    fn test_file_name_custom_naming() {
        let naming = NamingConfig {
            prefix: "RUN_".to_string(),
            suffix: "mT.dat".to_string(),
            decimal_mark: "p".to_string(),
        };
        assert_eq!(file_name(&naming, 52.2, 3), "RUN_52p2mT.dat");
    }
}
