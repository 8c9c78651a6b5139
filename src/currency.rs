use crate::error::FormatError;
use num_format::{CustomFormat, ToFormattedString};
use once_cell::sync::Lazy;

pub const CURRENCY_MARKER: &str = "R$";

static BRL_GROUPING: Lazy<Option<CustomFormat>> =
    Lazy::new(|| CustomFormat::builder().decimal(",").separator(".").build().ok());

/// Formats an amount as Brazilian reais: `R$ 1.234.567,89`.
///
/// The value is rounded to cents half away from zero, applied to the
/// shortest decimal representation that round-trips the `f64` (so `0.005`
/// and `1.005` both round up, as they read). Negative amounts carry the sign
/// after the marker; an amount that rounds to zero carries no sign.
pub fn format_brl(amount: f64) -> Result<String, FormatError> {
    if !amount.is_finite() {
        return Err(FormatError::NonFinite(amount));
    }
    let (int_digits, cents) = round_to_cents(amount.abs());
    let mut s = String::with_capacity(int_digits.len() + 8);
    s.push_str(CURRENCY_MARKER);
    s.push(' ');
    if amount < 0.0 && (int_digits != "0" || cents != "00") {
        s.push('-');
    }
    s.push_str(&group_thousands(&int_digits));
    s.push(',');
    s.push_str(&cents);
    Ok(s)
}

/// Integer digits and exactly two fractional digits of a non-negative value.
fn round_to_cents(value: f64) -> (String, String) {
    // `Display` for f64 never uses exponent notation.
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let frac: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();
    digits.push(frac.first().copied().unwrap_or(0));
    digits.push(frac.get(1).copied().unwrap_or(0));

    if frac.get(2).is_some_and(|&d| d >= 5) {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let to_str = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int_str = to_str(&digits[..split]);
    let int_str = match int_str.trim_start_matches('0') {
        "" => "0".to_string(),
        trimmed => trimmed.to_string(),
    };
    (int_str, to_str(&digits[split..]))
}

fn group_thousands(digits: &str) -> String {
    match (digits.parse::<u128>(), BRL_GROUPING.as_ref()) {
        (Ok(n), Some(format)) => n.to_formatted_string(format),
        // integer parts past u128::MAX (about 3.4e38) are grouped by hand
        _ => group_digits(digits, '.'),
    }
}

fn group_digits(digits: &str, sep: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}
