//! Serde support for code points written by hand in plan files.
//!
//! Accepts `"U+20000"`, `"0x20000"`, a bare decimal string, or a JSON
//! integer. Always serializes as `"U+XXXX"`.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;

pub fn serialize<S>(cp: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&crate::scan::charset::format_code_point(*cp))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(CodePointVisitor)
}

/// Parse the textual forms accepted in plan files.
pub fn parse(text: &str) -> Result<u32, String> {
    let trimmed = text.trim();
    let (digits, radix) = if let Some(hex) = trimmed
        .strip_prefix("U+")
        .or_else(|| trimmed.strip_prefix("u+"))
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        (hex, 16)
    } else {
        (trimmed, 10)
    };
    u32::from_str_radix(digits, radix).map_err(|e| format!("invalid code point '{text}': {e}"))
}

struct CodePointVisitor;

impl Visitor<'_> for CodePointVisitor {
    type Value = u32;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a code point such as \"U+4E00\", \"0x4E00\" or 19968")
    }

    fn visit_u64<E>(self, value: u64) -> Result<u32, E>
    where
        E: de::Error,
    {
        u32::try_from(value).map_err(|_| E::custom(format!("code point {value} out of range")))
    }

    fn visit_i64<E>(self, value: i64) -> Result<u32, E>
    where
        E: de::Error,
    {
        u32::try_from(value).map_err(|_| E::custom(format!("code point {value} out of range")))
    }

    fn visit_str<E>(self, value: &str) -> Result<u32, E>
    where
        E: de::Error,
    {
        parse(value).map_err(E::custom)
    }
}
