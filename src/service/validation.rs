//! Field validators. Each records its messages on `FieldErrors` and returns the parsed
//! value only when the field is present and valid.

use crate::error::FieldErrors;
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::OnceLock;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const INVALID_STRING: &str = "Not a valid string.";
pub const INVALID_NUMBER: &str = "A valid number is required.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Whether a missing field is an error: required on create and full update, optional on partial update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

impl Presence {
    pub fn for_partial(partial: bool) -> Self {
        if partial {
            Presence::Optional
        } else {
            Presence::Required
        }
    }
}

/// Shared presence/null handling. `None` means "stop": either absent or already reported.
fn present<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a Value>,
    presence: Presence,
) -> Option<&'a Value> {
    match value {
        None => {
            if presence == Presence::Required {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(v) => Some(v),
    }
}

/// Text field. Surrounding whitespace is trimmed before the blank and length checks.
pub fn string_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    presence: Presence,
    max_length: Option<usize>,
    allow_blank: bool,
) -> Option<String> {
    let v = present(errors, field, value, presence)?;
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, INVALID_STRING);
            return None;
        }
    };
    if s.is_empty() && !allow_blank {
        errors.add(field, NOT_BLANK);
        return None;
    }
    if let Some(max) = max_length {
        if s.chars().count() > max {
            errors.add(field, format!("Ensure this field has no more than {} characters.", max));
            return None;
        }
    }
    Some(s)
}

/// Fixed-point decimal with at most `max_digits` digits, `decimal_places` of them after the point.
/// The result is rescaled to exactly `decimal_places`.
pub fn decimal_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    presence: Presence,
    max_digits: u32,
    decimal_places: u32,
    minimum: Option<Decimal>,
) -> Option<Decimal> {
    let v = present(errors, field, value, presence)?;
    let text = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, INVALID_NUMBER);
            return None;
        }
    };
    let Ok(mut d) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) else {
        errors.add(field, INVALID_NUMBER);
        return None;
    };

    let (digits, decimals) = digit_counts(&d);
    let whole_digits = digits.saturating_sub(decimals);
    if digits > max_digits {
        errors.add(
            field,
            format!("Ensure that there are no more than {} digits in total.", max_digits),
        );
        return None;
    }
    if decimals > decimal_places {
        errors.add(
            field,
            format!("Ensure that there are no more than {} decimal places.", decimal_places),
        );
        return None;
    }
    if whole_digits > max_digits - decimal_places {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                max_digits - decimal_places
            ),
        );
        return None;
    }
    if let Some(min) = minimum {
        if d < min {
            errors.add(field, format!("Ensure this value is greater than or equal to {}.", min));
            return None;
        }
    }
    d.rescale(decimal_places);
    Some(d)
}

/// (total digits, digits after the point). `0.05` counts as two digits.
fn digit_counts(d: &Decimal) -> (u32, u32) {
    let mantissa_digits = d.mantissa().unsigned_abs().to_string().len() as u32;
    let scale = d.scale();
    (mantissa_digits.max(scale), scale)
}

/// Integer within `[minimum, maximum]`. Integral floats such as `5.0` are accepted.
pub fn integer_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    presence: Presence,
    minimum: Option<i64>,
    maximum: Option<i64>,
) -> Option<i64> {
    let v = present(errors, field, value, presence)?;
    let parsed = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let Some(n) = parsed else {
        errors.add(field, INVALID_INTEGER);
        return None;
    };
    if let Some(min) = minimum {
        if n < min {
            errors.add(field, format!("Ensure this value is greater than or equal to {}.", min));
            return None;
        }
    }
    if let Some(max) = maximum {
        if n > max {
            errors.add(field, format!("Ensure this value is less than or equal to {}.", max));
            return None;
        }
    }
    Some(n)
}

/// Reference to another row by integer id. Existence is checked by the caller.
pub fn primary_key_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&Value>,
    presence: Presence,
) -> Option<i64> {
    let v = present(errors, field, value, presence)?;
    let parsed = match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(id) => Some(id),
        None => {
            errors.add(
                field,
                format!("Incorrect type. Expected pk value, received {}.", json_type_name(v)),
            );
            None
        }
    }
}

pub fn missing_reference_message(id: i64) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub fn is_valid_email(s: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]{2,}$").expect("email pattern is valid"));
    s.len() <= 254 && re.is_match(s)
}

/// Letters, digits and `@ . + - _`.
pub fn is_valid_username(s: &str) -> bool {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    let re = USERNAME.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));
    re.is_match(s)
}
