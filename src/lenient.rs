//! Serde helpers for upstream payloads that mix numbers and numeric text.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Int(u64),
    Float(f64),
    Text(String),
}

/// Accept `3`, `3.0`, `"3"` or `" 3 "`. Anything else (`null`, `""`, `"-"`,
/// negatives, overflow) becomes 0.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value: Option<NumOrText> = Option::deserialize(deserializer)?;
    let parsed = match &value {
        None => Some(0),
        Some(NumOrText::Int(n)) => u32::try_from(*n).ok(),
        Some(NumOrText::Float(f)) if *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64 => {
            Some(*f as u32)
        }
        Some(NumOrText::Float(_)) => None,
        Some(NumOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0)
            } else {
                s.parse().ok()
            }
        }
    };
    Ok(parsed.unwrap_or_else(|| {
        debug!(value = ?value, "unreadable count, using 0");
        0
    }))
}

/// Accept `126.97` or `"126.97"`.
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match NumOrText::deserialize(deserializer)? {
        NumOrText::Int(n) => Ok(n as f64),
        NumOrText::Float(f) => Ok(f),
        NumOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("not a number: '{}'", s))),
    }
}

/// `null` becomes an empty string; numbers are rendered as text.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value: Option<NumOrText> = Option::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(NumOrText::Int(n)) => n.to_string(),
        Some(NumOrText::Float(f)) => f.to_string(),
        Some(NumOrText::Text(s)) => s,
    })
}
