//! YAML parameter documents.
//!
//! Models receive their configuration as a YAML string. Parsing happens in
//! two steps: [`ParameterDocument::parse`] checks the document is a
//! well-formed mapping ([`ModelError::Parse`] otherwise), then the typed
//! accessors report missing or ill-typed keys as
//! [`ModelError::InvalidParameter`]. Keeping the steps apart lets the
//! servicer list the keys that *were* given when it suggests a fix for a
//! missing one.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{ModelError, ModelResult, ParameterError};

/// A parsed, not yet interpreted, parameter document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDocument {
    entries: IndexMap<String, Value>,
}

impl ParameterDocument {
    /// Parse a YAML document.
    ///
    /// An empty document (blank, or an explicit `null`) is an empty mapping.
    pub fn parse(yaml: &str) -> ModelResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_yaml::from_str(yaml).map_err(|err| ModelError::Parse(err.to_string()))?;

        let mapping = match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(ModelError::Parse(format!(
                    "expected a mapping of parameters, got {}",
                    describe(&other)
                )));
            }
        };

        let mut entries = IndexMap::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                Value::String(key) => key,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                other => {
                    return Err(ModelError::Parse(format!(
                        "parameter names must be scalars, got {}",
                        describe(&other)
                    )));
                }
            };
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Top-level keys of the document, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deserialize a required key into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParameterError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| ParameterError::missing(key))?;
        serde_yaml::from_value(value.clone()).map_err(|err| ParameterError::WrongType {
            key: key.to_string(),
            message: err.to_string(),
        })
    }

    /// A required numeric key.
    pub fn required_f64(&self, key: &str) -> Result<f64, ParameterError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| ParameterError::missing(key))?;
        as_number(key, value)
    }

    /// An optional numeric key, `default` when absent.
    pub fn optional_f64(&self, key: &str, default: f64) -> Result<f64, ParameterError> {
        match self.entries.get(key) {
            Some(value) => as_number(key, value),
            None => Ok(default),
        }
    }
}

/// Top-level keys of a YAML blob, or nothing if it does not parse.
pub fn top_level_keys(yaml: &str) -> Vec<String> {
    ParameterDocument::parse(yaml)
        .map(|document| document.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

fn as_number(key: &str, value: &Value) -> Result<f64, ParameterError> {
    value.as_f64().ok_or_else(|| ParameterError::WrongType {
        key: key.to_string(),
        message: format!("expected a number, got {}", describe(value)),
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_mapping_from_client() {
        let doc = ParameterDocument::parse(
            "{Hs: 5, Tp: 15, gamma: 1.2, waves propagating to: 0, omega: [1,2,3]}",
        )
        .unwrap();

        let keys: Vec<_> = doc.keys().collect();
        assert_eq!(keys, ["Hs", "Tp", "gamma", "waves propagating to", "omega"]);
        assert_eq!(doc.required_f64("Hs").unwrap(), 5.0);
        assert_eq!(doc.required_f64("gamma").unwrap(), 1.2);
        assert_eq!(doc.get::<Vec<f64>>("omega").unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_and_null_documents() {
        assert!(ParameterDocument::parse("").unwrap().is_empty());
        assert!(ParameterDocument::parse("   \n").unwrap().is_empty());
        assert!(ParameterDocument::parse("~").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let result = ParameterDocument::parse("{Hs: 5, Tp: [15");
        assert!(matches!(result, Err(ModelError::Parse(_))), "{result:?}");
    }

    #[test]
    fn test_scalar_document_is_a_parse_error() {
        let result = ParameterDocument::parse("just a sentence");
        assert!(matches!(result, Err(ModelError::Parse(msg)) if msg.contains("a string")));
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let doc = ParameterDocument::parse("Hs: 5\nTp: fifteen\n").unwrap();

        assert_eq!(doc.required_f64("gamma"), Err(ParameterError::missing("gamma")));
        assert!(matches!(
            doc.required_f64("Tp"),
            Err(ParameterError::WrongType { key, .. }) if key == "Tp"
        ));
        assert!(matches!(
            doc.get::<Vec<f64>>("Hs"),
            Err(ParameterError::WrongType { .. })
        ));
    }

    #[test]
    fn test_optional_default() {
        let doc = ParameterDocument::parse("rho: 1025").unwrap();
        assert_eq!(doc.optional_f64("rho", 1026.0).unwrap(), 1025.0);
        assert_eq!(doc.optional_f64("g", 9.81).unwrap(), 9.81);
    }

    #[test]
    fn test_top_level_keys_of_malformed_blob() {
        assert!(top_level_keys("{unterminated").is_empty());
        assert_eq!(top_level_keys("a: 1\nb: 2"), ["a", "b"]);
    }
}
