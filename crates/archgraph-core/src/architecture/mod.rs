//! Architecture graph domain: node/edge model and input validation.

pub mod model;

use crate::error::{GraphError, GraphResult};
use model::{Properties, PropertyValue};

/// Validate a caller-supplied node id and return it trimmed.
pub fn validate_node_id(id: &str) -> GraphResult<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(GraphError::validation("node_id is required"));
    }
    Ok(trimmed)
}

/// Reject property values that cannot be stored as JSON.
///
/// `serde_json` writes NaN and infinities as `null`, which would not read
/// back as a property value.
pub fn validate_properties(properties: &Properties) -> GraphResult<()> {
    for (key, value) in properties {
        if let PropertyValue::Float(f) = value {
            if !f.is_finite() {
                return Err(GraphError::validation(format!(
                    "Property '{}' must be a finite number, got {}",
                    key, f
                )));
            }
        }
    }
    Ok(())
}

/// Parse `key=value` pairs into a property bag.
pub fn parse_properties<'a, I>(pairs: I) -> GraphResult<Properties>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut properties = Properties::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| GraphError::validation(format!("Expected key=value, got '{}'", pair)))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(GraphError::validation(format!("Empty property key in '{}'", pair)));
        }
        properties.insert(key.to_string(), model::PropertyValue::parse_literal(value.trim()));
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_node_id() {
        assert_eq!(validate_node_id("  api-login ").unwrap(), "api-login");
        assert!(validate_node_id("   ").is_err());
        assert!(validate_node_id("").is_err());
    }

    #[test]
    fn test_parse_properties() {
        let props = parse_properties(["method=POST", "auth = true", "timeout_ms=250"]).unwrap();
        assert_eq!(props.get("method"), Some(&PropertyValue::String("POST".into())));
        assert_eq!(props.get("auth"), Some(&PropertyValue::Bool(true)));
        assert_eq!(props.get("timeout_ms"), Some(&PropertyValue::Integer(250)));
    }

    #[test]
    fn test_validate_properties_rejects_non_finite() {
        let mut props = parse_properties(["method=POST", "ratio=0.5"]).unwrap();
        assert!(validate_properties(&props).is_ok());

        props.insert("ratio".into(), PropertyValue::Float(f64::NAN));
        assert!(matches!(validate_properties(&props), Err(GraphError::Validation(_))));

        props.insert("ratio".into(), PropertyValue::Float(f64::INFINITY));
        assert!(validate_properties(&props).is_err());
    }

    #[test]
    fn test_parse_properties_rejects_garbage() {
        assert!(parse_properties(["no-equals-sign"]).is_err());
        assert!(parse_properties(["=value"]).is_err());
    }
}
