//! Purpose: Value, Statement, and ResultSet types shared across the core.
//! Exports: `Value`, `Statement`, `Row`, `ResultSet` plus JSON bridging.
//! Role: Store-agnostic data model; the store boundary maps these to SQLite.
//! Invariants: Statements and result sets are immutable once constructed.
//! Invariants: Parameters are positional; no named-parameter binding.
use serde_json::{Number, Value as JsonValue};

use crate::core::error::{Error, ErrorKind};

/// A dynamically typed store value, mirroring SQLite's storage classes.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Integer(value) => JsonValue::Number((*value).into()),
            Value::Real(value) => Number::from_f64(*value)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Text(value) => JsonValue::String(value.clone()),
            Value::Blob(bytes) => JsonValue::Array(
                bytes.iter().map(|byte| JsonValue::Number((*byte).into())).collect(),
            ),
        }
    }

    pub fn from_json(json: &JsonValue) -> Result<Self, Error> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(value) => Ok(Value::Integer(i64::from(*value))),
            JsonValue::Number(number) => {
                if let Some(value) = number.as_i64() {
                    Ok(Value::Integer(value))
                } else if let Some(value) = number.as_f64() {
                    Ok(Value::Real(value))
                } else {
                    Err(Error::new(ErrorKind::Usage)
                        .with_message(format!("unrepresentable number parameter: {number}")))
                }
            }
            JsonValue::String(value) => Ok(Value::Text(value.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::new(ErrorKind::Usage)
                .with_message("array and object parameters are not supported")
                .with_hint("Pass scalar JSON values: null, number, string, or bool.")),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// A query together with its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Value>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

pub type Row = Vec<Value>;

/// The ordered, fully materialized row output of executing a statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<Row>,
}

impl ResultSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(
            self.rows
                .iter()
                .map(|row| JsonValue::Array(row.iter().map(Value::to_json).collect()))
                .collect(),
        )
    }
}
