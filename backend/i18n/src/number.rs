//! `lt-LT` number grouping.
//!
//! Lithuanian groups thousands with a no-break space and writes the minus sign
//! as U+2212, matching what browsers produce for `Intl.NumberFormat("lt-LT")`.

/// Thousands separator used by `lt-LT`.
pub const GROUP_SEPARATOR: char = '\u{00A0}';

/// Minus sign used by `lt-LT`.
pub const MINUS_SIGN: char = '\u{2212}';

/// Format an integer with `lt-LT` digit grouping.
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        out.push(MINUS_SIGN);
    }

    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}
