//! Type tags and token rules shared by the encoder and decoder.

/// `N;`
pub const TAG_NULL: u8 = b'N';
/// `b:<0|1>;`
pub const TAG_BOOL: u8 = b'b';
/// `i:<int>;`
pub const TAG_INT: u8 = b'i';
/// `d:<float>;`
pub const TAG_FLOAT: u8 = b'd';
/// `s:<len>:"<bytes>";`
pub const TAG_STRING: u8 = b's';
/// `a:<count>:{<entries>}`
pub const TAG_ARRAY: u8 = b'a';
/// `O:<len>:"<name>":<count>:{<entries>}`
pub const TAG_OBJECT: u8 = b'O';

pub(crate) const COLON: u8 = b':';
pub(crate) const SEMICOLON: u8 = b';';
pub(crate) const QUOTE: u8 = b'"';
pub(crate) const OPEN_BRACE: u8 = b'{';
pub(crate) const CLOSE_BRACE: u8 = b'}';

/// Longest numeric token accepted between delimiters.
pub(crate) const MAX_NUMBER_LEN: usize = 64;

/// Magnitudes at or above this use exponent notation, as PHP does.
const EXP_UPPER: f64 = 1e15;
/// Non-zero magnitudes below this use exponent notation.
const EXP_LOWER: f64 = 1e-4;

/// Check if data looks like PHP serialized data.
///
/// Only the leading type tag is inspected; this is not a validation.
///
/// ```rust
/// use php_serialize_core::is_serialized;
///
/// assert!(is_serialized(b"a:1:{i:0;s:3:\"foo\";}"));
/// assert!(!is_serialized(b"not serialized"));
/// ```
pub fn is_serialized(data: &[u8]) -> bool {
    matches!(
        data.first(),
        Some(&(TAG_NULL | TAG_BOOL | TAG_INT | TAG_FLOAT | TAG_STRING | TAG_ARRAY | TAG_OBJECT))
    ) && data.get(1) == Some(&if data[0] == TAG_NULL { SEMICOLON } else { COLON })
}

/// Format a float the way PHP's `serialize()` does with `serialize_precision = -1`.
///
/// The shortest digit string that parses back to the same value is used,
/// switching to `1.0E+25` style for very large or very small magnitudes.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_owned();
    }
    if f.is_infinite() {
        return if f.is_sign_positive() { "INF" } else { "-INF" }.to_owned();
    }

    let abs = f.abs();
    if abs != 0.0 && !(EXP_LOWER..EXP_UPPER).contains(&abs) {
        let formatted = format!("{:E}", f);
        if let Some((mantissa, exponent)) = formatted.split_once('E') {
            let mut out = String::with_capacity(formatted.len() + 3);
            out.push_str(mantissa);
            if !mantissa.contains('.') {
                out.push_str(".0");
            }
            out.push('E');
            if !exponent.starts_with('-') {
                out.push('+');
            }
            out.push_str(exponent);
            return out;
        }
    }

    format!("{}", f)
}

/// Parse a `d:` payload.
///
/// Accepts `[+-]digits[.digits][(e|E)[+-]digits]` (either side of the dot
/// may be empty, not both) and the literals `INF`, `-INF` and `NAN`.
pub(crate) fn parse_float(token: &str) -> Option<f64> {
    match token {
        "INF" => return Some(f64::INFINITY),
        "-INF" => return Some(f64::NEG_INFINITY),
        "NAN" => return Some(f64::NAN),
        _ => {}
    }

    let bytes = token.as_bytes();
    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return None;
        }
        i += exp_digits;
    }
    if i != bytes.len() {
        return None;
    }

    token.parse().ok()
}

/// Parse an `i:` payload: optional sign, then digits.
pub(crate) fn parse_int(token: &str) -> Option<i64> {
    let digits = token.strip_prefix(&['+', '-'][..]).unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

/// Parse a length or count prefix: digits only.
pub(crate) fn parse_length(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
