//! Scalar Codec
//!
//! Scalars are stored as their JSON literal, which records the type with
//! the value: `"abc"`, `4`, `4.0`, `true`, `null`. Non-finite floats use
//! the tokens `NaN`, `inf` and `-inf`.

use serde_json::{Number, Value as Json};

use super::value::Scalar;

/// Encodes a scalar into its stored form.
pub fn encode(value: &Scalar) -> String {
    match value {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => match Number::from_f64(*f) {
            Some(n) => n.to_string(),
            None if f.is_nan() => "NaN".to_string(),
            None if *f > 0.0 => "inf".to_string(),
            None => "-inf".to_string(),
        },
        Scalar::Str(s) => Json::String(s.clone()).to_string(),
    }
}

/// Decodes a stored string.
///
/// Anything that is not a scalar literal was written by another client
/// and comes back unchanged as a string. Never fails.
pub fn decode(raw: &str) -> Scalar {
    match raw {
        "NaN" => Scalar::Float(f64::NAN),
        "inf" => Scalar::Float(f64::INFINITY),
        "-inf" => Scalar::Float(f64::NEG_INFINITY),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Scalar::Str(raw.to_string())),
    }
}
