//! Base-1024 human readable byte sizes: `42675243822` <-> `"39.74GB"`.

use std::num::ParseFloatError;

use thiserror::Error;

pub const SIZE_NAMES: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

const DIVISOR: f64 = 1024.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("empty size string")]
    Empty,
    #[error("invalid size {input:?}")]
    InvalidNumber {
        input: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Format `bytes` in the largest unit that keeps the number at or above one, with
/// `precision` digits after the point.
pub fn format_human_size(bytes: i64, precision: usize) -> String {
    let mut n = bytes.unsigned_abs() as f64;
    let mut unit = 0;
    while n >= DIVISOR && unit < SIZE_NAMES.len() - 1 {
        n /= DIVISOR;
        unit += 1;
    }
    if bytes < 0 {
        n = -n;
    }
    format!("{n:.precision$}{}", SIZE_NAMES[unit])
}

/// Parse strings such as `"13B"`, `"1.5g"`, `"-110m"` or a bare `"128"`.
///
/// Only the first letter of the unit matters and case is ignored. The scaled value
/// is truncated toward zero.
pub fn parse_human_size(s: &str) -> Result<i64, SizeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(SizeError::Empty);
    }

    let (number, shift) = match s.find(|c: char| "bBkKmMgGtTpPeE".contains(c)) {
        Some(i) if i > 0 => {
            let shift = match s.as_bytes()[i].to_ascii_lowercase() {
                b'k' => 10,
                b'm' => 20,
                b'g' => 30,
                b't' => 40,
                b'p' => 50,
                b'e' => 60,
                _ => 0,
            };
            (&s[..i], shift)
        }
        _ => (s, 0),
    };

    let num: f64 = number.parse().map_err(|source| SizeError::InvalidNumber {
        input: s.to_string(),
        source,
    })?;
    Ok((num * (1u64 << shift) as f64) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision_for(b: i64) -> usize {
        if b > 1024 && b % 1024 > 0 {
            2
        } else {
            0
        }
    }

    #[test]
    fn format_sizes() {
        let cases: [(i64, &str); 14] = [
            (-3, "-3B"),
            (-1024, "-1KB"),
            (-1079110533, "-1GB"),
            (0, "0B"),
            (13, "13B"),
            (1 << 10, "1KB"),
            (1 << 20, "1MB"),
            (1 << 30, "1GB"),
            (1 << 40, "1TB"),
            (1 << 50, "1PB"),
            (1 << 60, "1EB"),
            (42675243822, "39.74GB"),
            (55555, "54.25KB"),
            (11111111111111111, "9.87PB"),
        ];
        for (b, name) in cases {
            assert_eq!(format_human_size(b, precision_for(b)), name, "formatting {b}");
        }
    }

    #[test]
    fn format_extremes_stay_in_range() {
        assert_eq!(format_human_size(i64::MAX, 0), "8EB");
        assert_eq!(format_human_size(i64::MIN, 0), "-8EB");
    }

    #[test]
    fn parse_sizes() {
        let cases: [(&str, i64); 15] = [
            ("-10B", -10),
            ("-110m", -115343360),
            ("-1.005g", -1079110533),
            ("0B", 0),
            ("13B", 13),
            ("128", 128),
            ("1KB", 1 << 10),
            ("1MB", 1 << 20),
            ("1GB", 1 << 30),
            ("1TB", 1 << 40),
            ("1PB", 1 << 50),
            ("1EB", 1 << 60),
            ("39.74GB", 42670500085),
            ("54.25KB", 55552),
            ("9.87PB", 11112632080536698),
        ];
        for (name, b) in cases {
            assert_eq!(parse_human_size(name), Ok(b), "parsing {name}");
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_human_size("   "), Err(SizeError::Empty));
        assert!(matches!(parse_human_size("abc"), Err(SizeError::InvalidNumber { .. })));
        assert!(matches!(parse_human_size("1.2.3mb"), Err(SizeError::InvalidNumber { .. })));
    }

    #[test]
    fn format_then_parse_is_close() {
        for b in [1_500_i64, 3 << 20, 7_340_032_123] {
            let back = parse_human_size(&format_human_size(b, 2)).unwrap();
            assert!((back - b).abs() as f64 / (b as f64) < 0.01, "{b} -> {back}");
        }
    }
}
