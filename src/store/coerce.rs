//! Edit coercion: turn the raw text of a committed edit into a JSON value.

use serde_json::{Number, Value};

/// Coerce `raw` using the type of the value it replaces.
///
/// - number: parsed as a number, or kept as the raw string when it does not parse
/// - boolean: `true` only for the literal `true`
/// - string: kept verbatim
/// - null or missing: type detected from the text ([`detect_value`])
/// - array or object: parsed as JSON, or kept as the raw string
pub fn coerce_edit(original: Option<&Value>, raw: &str) -> Value {
    match original {
        Some(Value::Number(_)) => {
            parse_number(raw.trim()).unwrap_or_else(|| Value::String(raw.to_string()))
        }
        Some(Value::Bool(_)) => Value::Bool(raw.trim() == "true"),
        Some(Value::String(_)) => Value::String(raw.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        Some(Value::Null) | None => detect_value(raw),
    }
}

/// Detect the value type of free text.
///
/// `true`/`false` (case-insensitive) become booleans, `null` becomes null,
/// anything that parses as a finite number becomes a number, the rest stays a
/// string.
pub fn detect_value(raw: &str) -> Value {
    let trimmed = raw.trim();

    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if trimmed == "null" {
        return Value::Null;
    }
    if let Some(n) = parse_number(trimmed) {
        return n;
    }

    Value::String(raw.to_string())
}

/// Integers stay integers; other finite floats become `f64` numbers.
fn parse_number(s: &str) -> Option<Value> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::from(u));
    }
    let f = s.parse::<f64>().ok()?;
    Number::from_f64(f).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_original() {
        assert_eq!(coerce_edit(Some(&json!(1)), "42"), json!(42));
        assert_eq!(coerce_edit(Some(&json!(1)), " 2.5 "), json!(2.5));
        assert_eq!(coerce_edit(Some(&json!(1)), "abc"), json!("abc"));
        assert_eq!(coerce_edit(Some(&json!(1)), "NaN"), json!("NaN"));
    }

    #[test]
    fn test_bool_original() {
        assert_eq!(coerce_edit(Some(&json!(false)), "true"), json!(true));
        assert_eq!(coerce_edit(Some(&json!(true)), "yes"), json!(false));
    }

    #[test]
    fn test_string_original_stays_string() {
        assert_eq!(coerce_edit(Some(&json!("x")), "12"), json!("12"));
        assert_eq!(coerce_edit(Some(&json!("x")), "true"), json!("true"));
    }

    #[test]
    fn test_null_and_missing_detect() {
        assert_eq!(coerce_edit(Some(&Value::Null), "12"), json!(12));
        assert_eq!(coerce_edit(None, "TRUE"), json!(true));
        assert_eq!(coerce_edit(None, "null"), Value::Null);
        assert_eq!(coerce_edit(None, "goblin"), json!("goblin"));
        assert_eq!(coerce_edit(None, ""), json!(""));
    }

    #[test]
    fn test_compound_original_parses_json() {
        assert_eq!(coerce_edit(Some(&json!([1])), "[1,2]"), json!([1, 2]));
        assert_eq!(coerce_edit(Some(&json!({})), "{oops"), json!("{oops"));
    }
}
