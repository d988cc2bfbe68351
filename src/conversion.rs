use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// First signed decimal number appearing anywhere in a string (`"~123.4 Mt"` → `123.4`).
static EMBEDDED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)").expect("valid number regex"));

/// Parse the leading numeric token of a unit-suffixed string.
///
/// The feeds encode physical values as `"<number> <unit>"` (`"0.500 km"`, `"20.000 km/s"`).
/// Only the first whitespace separated token is considered and it must be a complete number,
/// so `"abc"` and `"12abc km"` are rejected.
///
/// Arguments
/// ---------
/// * `field`: the raw string value
///
/// Return
/// ------
/// * `Some(value)` when the first token is a finite number, `None` otherwise
pub fn parse_leading_number(field: &str) -> Option<f64> {
    let token = field.split_whitespace().next()?;
    let value: f64 = token.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Extract the first number found anywhere in a string, e.g. `"≈ 123.4 Mt"` → `123.4`.
pub fn parse_embedded_number(field: &str) -> Option<f64> {
    EMBEDDED_NUMBER
        .captures(field)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Read a JSON value that the JPL feeds encode either as a number or as a numeric string.
///
/// Arguments
/// ---------
/// * `value`: a JSON number (`1.3`) or string (`"1.3"`)
///
/// Return
/// ------
/// * The value as `f64`, or `None` for `null`, non-numeric strings and any other JSON type
pub fn json_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read an optional field of a JSON object as `f64` (see [`json_to_f64`]).
pub fn field_f64(object: &Value, key: &str) -> Option<f64> {
    object.get(key).and_then(json_to_f64)
}

/// Format a float in scientific notation the way `printf`-style `%.Ne` does:
/// the exponent always carries a sign and at least two digits (`1.23e-04`).
///
/// Rust's `{:e}` writes `1.23e-4`; the risk tables are compared against strings produced
/// with the C convention so the exponent is rewritten here.
pub fn format_scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

/// Format a float rounded to an integer with `,` between digit groups (`7800.0` → `"7,800"`).
pub fn format_thousands(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("0.500 km"), Some(0.5));
        assert_eq!(parse_leading_number("20.000 km/s"), Some(20.0));
        assert_eq!(parse_leading_number("  1.5e3 m"), Some(1500.0));
        assert_eq!(parse_leading_number("-2.50"), Some(-2.5));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number("12abc km"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("inf km"), None);
    }

    #[test]
    fn test_parse_embedded_number() {
        assert_eq!(parse_embedded_number("123.4 Mt"), Some(123.4));
        assert_eq!(parse_embedded_number("~ 7.5e4 Mt"), Some(7.5e4));
        assert_eq!(parse_embedded_number("energy: .25"), Some(0.25));
        assert_eq!(parse_embedded_number("N/A"), None);
    }

    #[test]
    fn test_json_to_f64() {
        assert_eq!(json_to_f64(&json!(1.25)), Some(1.25));
        assert_eq!(json_to_f64(&json!("3.8e-05")), Some(3.8e-5));
        assert_eq!(json_to_f64(&json!(" 14.1 ")), Some(14.1));
        assert_eq!(json_to_f64(&json!("n/a")), None);
        assert_eq!(json_to_f64(&json!(null)), None);
        assert_eq!(json_to_f64(&json!([1.0])), None);

        let obj = json!({"ip": "1e-3", "h": 21});
        assert_eq!(field_f64(&obj, "ip"), Some(1e-3));
        assert_eq!(field_f64(&obj, "h"), Some(21.0));
        assert_eq!(field_f64(&obj, "missing"), None);
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(1.23e-4, 2), "1.23e-04");
        assert_eq!(format_scientific(0.000038, 2), "3.80e-05");
        assert_eq!(format_scientific(12346.0, 2), "1.23e+04");
        assert_eq!(format_scientific(0.0, 2), "0.00e+00");
        assert_eq!(format_scientific(2.5e-120, 1), "2.5e-120");
        assert_eq!(format_scientific(f64::NAN, 2), "nan");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(7800.0), "7,800");
        assert_eq!(format_thousands(17000.0), "17,000");
        assert_eq!(format_thousands(50.0), "50");
        assert_eq!(format_thousands(999.6), "1,000");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-12345.0), "-12,345");
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(f64::INFINITY), "inf");
    }
}
