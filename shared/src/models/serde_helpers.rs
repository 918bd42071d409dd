//! Common serde helpers for lenient API payloads

use serde::{Deserialize, Deserializer};

/// Deserialize bool that treats null as true
pub fn bool_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|opt| opt.unwrap_or(true))
}

/// Deserialize an explicit order-line total that may arrive as a JSON number
/// or a numeric string. Stored verbatim as a string; parsing (and the
/// price×qty fallback for garbage) happens at billing time.
pub fn numeric_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    Ok(Option::<NumOrStr>::deserialize(deserializer)?.map(|v| match v {
        NumOrStr::Num(n) => n.to_string(),
        NumOrStr::Str(s) => s,
    }))
}
