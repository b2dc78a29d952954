use actix_router::Quoter;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

impl Value {
    /// Value as a single argument; array values are joined with commas.
    pub fn joined(&self) -> String {
        match self {
            Value::Scalar(value) => value.to_owned(),
            Value::Array(values) => values.join(","),
        }
    }
}

pub fn parse(value: &str) -> Result<HashMap<String, Value>, serde_qs::Error> {
    serde_qs::Config::new(5, false).deserialize_str(value)
}

/// Looks up one parameter of a raw query string.
///
/// Only pairs whose key names `name` (`name`, `name[]`, `name[...]`) are
/// parsed, so malformed unrelated parameters never fail the lookup. Values of
/// repeated keys are joined with commas, in query order.
pub fn lookup(query: &str, name: &str) -> Result<Option<String>, serde_qs::Error> {
    let quoter = Quoter::new(b"", b"");
    let mut values = Vec::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let raw_key = pair.split_once('=').map_or(pair, |(key, _)| key);
        let key = decode(&quoter, raw_key);
        if key.split('[').next() != Some(name) {
            continue;
        }
        if let Some(value) = parse(pair)?.remove(name) {
            values.push(value.joined());
        }
    }

    Ok((!values.is_empty()).then(|| values.join(",")))
}

fn decode(quoter: &Quoter, raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match quoter.requote(raw.as_bytes()) {
        Some(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_valid_one() {
        let hash_map = parse("key=value").unwrap();
        let value = hash_map.get("key").unwrap();
        assert_eq!(value.joined(), "value");
    }

    #[test]
    fn test_parse_valid_multiple() {
        let hash_map = parse("key-one=value-one&key-two=value-two").unwrap();
        assert_eq!(hash_map.get("key-one").unwrap().joined(), "value-one");
        assert_eq!(hash_map.get("key-two").unwrap().joined(), "value-two");
    }

    #[test]
    fn test_parse_percent_encoded() {
        let hash_map = parse("key=a%20b").unwrap();
        assert_eq!(hash_map.get("key").unwrap().joined(), "a b");
    }

    #[test]
    fn test_parse_array_bracket_syntax() {
        let hash_map = parse("color[]=red&color[]=blue").unwrap();
        assert_eq!(hash_map.get("color").unwrap().joined(), "red,blue");
    }

    #[test]
    fn test_lookup_ignores_unrelated_nested_keys() {
        assert_eq!(
            lookup("field=email&filter%5Bx%5D=1", "field").unwrap(),
            Some("email".to_owned())
        );
        assert_eq!(lookup("filter[x]=1&field=email", "field").unwrap(), Some("email".to_owned()));
    }

    #[test]
    fn test_lookup_joins_repeated_keys() {
        assert_eq!(lookup("field=a&other=x&field=b", "field").unwrap(), Some("a,b".to_owned()));
        assert_eq!(
            lookup("color[]=red&color[]=blue", "color").unwrap(),
            Some("red,blue".to_owned())
        );
    }

    #[test]
    fn test_lookup_missing_and_encoded() {
        assert_eq!(lookup("", "field").unwrap(), None);
        assert_eq!(lookup("other=1", "field").unwrap(), None);
        assert_eq!(
            lookup("my%20field=a%20b%21", "my field").unwrap(),
            Some("a b!".to_owned())
        );
    }

    #[test]
    fn test_lookup_fails_on_requested_nested_key() {
        assert!(lookup("filter%5Bx%5D=1", "filter").is_err());
    }
}
