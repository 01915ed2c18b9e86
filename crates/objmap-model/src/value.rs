//! Values carried through a mapping

use crate::descriptor::TypeTag;
use crate::record::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// String value
    String(String),

    /// Integer value
    Integer(i64),

    /// Decimal value
    Decimal(f64),

    /// Boolean value
    Boolean(bool),

    /// Calendar date value
    Date(NaiveDate),

    /// Nested record instance
    Record(Record),

    /// Ordered sequence of values
    List(Vec<Value>),

    /// Null/absent value
    Null,
}

impl Value {
    /// Check if value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert value to string
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Date(d) => Some(d.to_string()),
            Value::Record(_) | Value::List(_) | Value::Null => None,
        }
    }

    /// Borrow the inner record, if record-shaped
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Record(_) => "record",
            Value::List(_) => "list",
            Value::Null => "null",
        }
    }

    /// Coerce into the shape named by `tag`, applying implicit conversions
    /// (integer-to-decimal widening). `Null` coerces to any tag. Returns
    /// `None` when no implicit conversion exists.
    #[must_use]
    pub fn coerce_to(&self, tag: &TypeTag) -> Option<Value> {
        match (self, tag) {
            (Value::Null, _) => Some(Value::Null),
            (Value::String(_), TypeTag::String)
            | (Value::Integer(_), TypeTag::Integer)
            | (Value::Decimal(_), TypeTag::Decimal)
            | (Value::Boolean(_), TypeTag::Boolean)
            | (Value::Date(_), TypeTag::Date) => Some(self.clone()),
            (Value::Integer(i), TypeTag::Decimal) => Some(Value::Decimal(*i as f64)),
            (Value::Record(r), TypeTag::Record(name)) if r.type_name() == name => {
                Some(self.clone())
            }
            (Value::List(items), TypeTag::List(inner)) => items
                .iter()
                .map(|item| item.coerce_to(inner))
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            _ => None,
        }
    }
}
