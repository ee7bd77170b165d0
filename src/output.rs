//! Text output helpers.
//!
//! Downstream analysis scripts parse the files this crate writes, so numbers
//! are rendered the way a default-configured C++ `ostream` renders them
//! (`%g` style: significant digits, trailing zeros stripped, exponent form
//! outside `1e-4 ..= 10^precision`).

use crate::constants::POSITION_PRECISION;
use glam::DVec3;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Render `value` with `precision` significant digits in `%g` style.
pub fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, value))
    }
}

fn strip_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// `x\ty\tz\n` at position precision.
pub fn position_line(position: DVec3) -> String {
    format!(
        "{}\t{}\t{}\n",
        format_g(position.x, POSITION_PRECISION),
        format_g(position.y, POSITION_PRECISION),
        format_g(position.z, POSITION_PRECISION)
    )
}

/// Truncate/create `path` and write every line in order.
pub fn write_lines<I, S>(path: &Path, lines: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        out.write_all(line.as_ref().as_bytes())?;
    }
    out.flush()
}

/// Open `path` in append mode (creating it) and write `text`.
pub fn append_text(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_g_matches_stream_defaults() {
        assert_eq!(format_g(0.0, 6), "0");
        assert_eq!(format_g(100000.0, 6), "100000");
        assert_eq!(format_g(1000000.0, 6), "1e+06");
        assert_eq!(format_g(0.01, 6), "0.01");
        assert_eq!(format_g(1.5, 6), "1.5");
        assert_eq!(format_g(0.0001, 6), "0.0001");
        assert_eq!(format_g(0.00001, 6), "1e-05");
        assert_eq!(format_g(1.234e-12, 6), "1.234e-12");
        assert_eq!(format_g(-2.5e7, 6), "-2.5e+07");
        assert_eq!(format_g(123456789.0, 6), "1.23457e+08");
        assert_eq!(format_g(1.23456789, 6), "1.23457");
    }

    #[test]
    fn format_g_rounding_can_bump_the_exponent() {
        // 999999.7 rounds to 1.00000e+06 at six digits
        assert_eq!(format_g(999999.7, 6), "1e+06");
        assert_eq!(format_g(9.9999999, 6), "10");
    }

    #[test]
    fn format_g_position_precision() {
        assert_eq!(format_g(339_500_000.123, 10), "339500000.1");
        assert_eq!(format_g(-1.0, 10), "-1");
    }

    #[test]
    fn format_g_non_finite() {
        assert_eq!(format_g(f64::NAN, 6), "nan");
        assert_eq!(format_g(f64::INFINITY, 6), "inf");
        assert_eq!(format_g(f64::NEG_INFINITY, 6), "-inf");
    }

    #[test]
    fn position_line_is_tab_separated() {
        let line = position_line(DVec3::new(1.0, -2.5, 3.0e8));
        assert_eq!(line, "1\t-2.5\t300000000\n");
    }
}
