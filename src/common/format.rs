//! A centralized module for user-facing number parsing and formatting.

use thousands::{Separable, SeparatorPolicy, digits};

/// Brazilian digit grouping: `1.234.567`.
const BRL_GROUPING: SeparatorPolicy<'static> = SeparatorPolicy {
    separator: ".",
    groups: &[3],
    digits: digits::ASCII_DECIMAL,
};

/// Coerces a typed amount into a number.
///
/// Accepts Brazilian notation (`1.234,56`), treats `não sei` and empty input
/// as zero, and otherwise reads the longest numeric prefix. Anything that
/// does not start with a number becomes `0.0`.
pub fn parse_currency_input(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "não sei" {
        return 0.0;
    }
    let clean = trimmed.replace('.', "").replacen(',', ".", 1);
    parse_float_prefix(&clean).unwrap_or(0.0)
}

/// Parses the longest leading floating-point literal of `s`.
///
/// Mirrors the lenient prefix parsing browsers apply to form input:
/// `"12abc"` is `12`, `".5"` is `0.5`, `"abc"` is `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let literal = s[..end].trim_end_matches('.');
    let literal = if literal.is_empty() || literal == "+" || literal == "-" {
        "0"
    } else {
        literal
    };
    literal.parse::<f64>().ok()
}

/// Formats an amount the way pt-BR locales print numbers: grouped thousands,
/// comma decimals, at most two fraction digits and no trailing zeros.
///
/// `1234.5` → `"1.234,5"`, `1000.0` → `"1.000"`.
pub fn format_brl(value: f64) -> String {
    let (negative, int_part, cents) = split_cents(value);
    let mut out = int_part.separate_by_policy(BRL_GROUPING);
    if cents != 0 {
        let frac = format!("{cents:02}");
        out.push(',');
        out.push_str(frac.trim_end_matches('0'));
    }
    if negative { format!("-{out}") } else { out }
}

/// Formats an amount as currency with exactly two decimals: `R$ 1.234,50`.
pub fn format_brl_fixed(value: f64) -> String {
    let (negative, int_part, cents) = split_cents(value);
    let sign = if negative { "-" } else { "" };
    format!(
        "{sign}R$ {},{cents:02}",
        int_part.separate_by_policy(BRL_GROUPING)
    )
}

fn split_cents(value: f64) -> (bool, u64, u64) {
    if !value.is_finite() {
        return (false, 0, 0);
    }
    let total_cents = (value.abs() * 100.0).round() as u64;
    let negative = value < 0.0 && total_cents != 0;
    (negative, total_cents / 100, total_cents % 100)
}
