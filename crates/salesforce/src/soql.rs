//! SOQL lookup query construction.
//!
//! Queries built here are always of the form
//! `SELECT Id FROM <object> WHERE f1 = v1 <OP> f2 = v2 ...`. Field names are
//! reduced to `[A-Za-z0-9_]` and string literals have `'` escaped, so trait
//! keys and values cannot change the shape of the query.

use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};

/// Boolean operator placed between trait clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SoqlOperator {
    And,
    #[default]
    Or,
}

impl SoqlOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoqlOperator::And => "AND",
            SoqlOperator::Or => "OR",
        }
    }

    /// Accept `AND`, `OR` or nothing (`OR`).
    pub fn parse(operator: Option<&str>) -> Result<Self> {
        match operator {
            None | Some("OR") => Ok(SoqlOperator::Or),
            Some("AND") => Ok(SoqlOperator::And),
            Some(other) => Err(Error::new(ErrorKind::InvalidOperator(other.to_string()))),
        }
    }
}

/// Escape single quotes for use inside a SOQL string literal.
pub fn escape_quotes(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Drop every character outside `[A-Za-z0-9_]`.
pub fn remove_invalid_chars(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Render a trait value as a SOQL literal.
pub fn typecast(value: &Value) -> Result<String> {
    match value {
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(format!("'{}'", escape_quotes(s))),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(Error::new(ErrorKind::UnsupportedDatatype("object")))
        }
    }
}

/// Build the `Id` lookup query for `traits` against `sobject`.
///
/// Clauses follow the trait map's key order. An empty trait map is rejected
/// with `UndefinedTraits`.
pub fn build_query(
    traits: &Map<String, Value>,
    sobject: &str,
    operator: SoqlOperator,
) -> Result<String> {
    if traits.is_empty() {
        return Err(Error::new(ErrorKind::UndefinedTraits("lookup")));
    }

    let clauses = traits
        .iter()
        .map(|(key, value)| Ok(format!("{} = {}", remove_invalid_chars(key), typecast(value)?)))
        .collect::<Result<Vec<_>>>()?;

    let separator = format!(" {} ", operator.as_str());
    Ok(format!(
        "SELECT Id FROM {} WHERE {}",
        sobject,
        clauses.join(&separator)
    ))
}
