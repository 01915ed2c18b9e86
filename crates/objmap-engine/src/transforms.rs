//! Value transforms
//!
//! Conversion functions attached to member overrides at configuration time.
//! Each transform declares which input tags it accepts and which tag it
//! produces, so sealing can reject incompatible signatures before any
//! instance is mapped. `Null` passes through every transform untouched.

use crate::{Error, Result};
use chrono::NaiveDate;
use objmap_model::{TypeTag, Value};
use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

/// Signature of a custom conversion function
pub type TransformFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// A conversion applied to a source value before assignment
#[derive(Clone)]
pub enum ValueTransform {
    /// Convert a string to uppercase
    Uppercase,

    /// Convert a string to lowercase
    Lowercase,

    /// Trim whitespace from a string
    Trim,

    /// Format a date with a chrono format string (e.g. `%Y-%m-%d`)
    FormatDate(String),

    /// Parse a string into a date with a chrono format string
    ParseDate(String),

    /// Render any scalar as its string form
    FormatString,

    /// Parse a string into an integer
    ParseInteger,

    /// Custom conversion function with a declared signature
    Custom {
        name: String,
        input: TypeTag,
        output: TypeTag,
        func: TransformFn,
    },
}

impl ValueTransform {
    /// Create a date-formatting transform
    pub fn format_date(format: impl Into<String>) -> Self {
        Self::FormatDate(format.into())
    }

    /// Create a date-parsing transform
    pub fn parse_date(format: impl Into<String>) -> Self {
        Self::ParseDate(format.into())
    }

    /// Create a custom transform with a declared signature
    pub fn custom(
        name: impl Into<String>,
        input: TypeTag,
        output: TypeTag,
        func: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom {
            name: name.into(),
            input,
            output,
            func: Arc::new(func),
        }
    }

    /// Whether this transform accepts a source member of the given tag
    #[must_use]
    pub fn accepts(&self, input: &TypeTag) -> bool {
        match self {
            Self::Uppercase | Self::Lowercase | Self::Trim | Self::ParseInteger => {
                *input == TypeTag::String
            }
            Self::FormatDate(_) => *input == TypeTag::Date,
            Self::ParseDate(_) => *input == TypeTag::String,
            Self::FormatString => matches!(
                input,
                TypeTag::String
                    | TypeTag::Integer
                    | TypeTag::Decimal
                    | TypeTag::Boolean
                    | TypeTag::Date
            ),
            Self::Custom {
                input: declared, ..
            } => input.is_assignable_to(declared),
        }
    }

    /// Tag of the value this transform produces
    #[must_use]
    pub fn output(&self) -> TypeTag {
        match self {
            Self::Uppercase
            | Self::Lowercase
            | Self::Trim
            | Self::FormatDate(_)
            | Self::FormatString => TypeTag::String,
            Self::ParseDate(_) => TypeTag::Date,
            Self::ParseInteger => TypeTag::Integer,
            Self::Custom { output, .. } => output.clone(),
        }
    }

    /// Apply the transform to a value
    ///
    /// # Errors
    ///
    /// Returns an error when the transform cannot be applied to the input.
    pub fn apply(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self {
            Self::Uppercase => string_op(value, "uppercase", |s| s.to_uppercase()),
            Self::Lowercase => string_op(value, "lowercase", |s| s.to_lowercase()),
            Self::Trim => string_op(value, "trim", |s| s.trim().to_string()),
            Self::FormatDate(format) => apply_format_date(value, format),
            Self::ParseDate(format) => apply_parse_date(value, format),
            Self::FormatString => value
                .as_string()
                .map(Value::String)
                .ok_or_else(|| Error::Transform(format!("Cannot render {} as string", value.kind_name()))),
            Self::ParseInteger => apply_parse_integer(value),
            Self::Custom { func, .. } => func(value),
        }
    }

    /// Name used in diagnostics and plan comparison
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Trim => "trim",
            Self::FormatDate(_) => "format_date",
            Self::ParseDate(_) => "parse_date",
            Self::FormatString => "format_string",
            Self::ParseInteger => "parse_integer",
            Self::Custom { name, .. } => name,
        }
    }
}

fn string_op(value: &Value, label: &str, op: impl Fn(&str) -> String) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(op(s))),
        _ => value
            .as_string()
            .map(|s| Value::String(op(&s)))
            .ok_or_else(|| Error::Transform(format!("Cannot {label} {} value", value.kind_name()))),
    }
}

fn apply_format_date(value: &Value, format: &str) -> Result<Value> {
    let Value::Date(date) = value else {
        return Err(Error::Transform(format!(
            "Cannot format {} value as date",
            value.kind_name()
        )));
    };

    // DelayedFormat panics through ToString on bad specifiers; going through
    // fmt::Write keeps the failure a recoverable error.
    let mut rendered = String::new();
    write!(rendered, "{}", date.format(format))
        .map_err(|_| Error::Transform(format!("Invalid date format '{format}'")))?;
    Ok(Value::String(rendered))
}

fn apply_parse_date(value: &Value, format: &str) -> Result<Value> {
    let Value::String(s) = value else {
        return Err(Error::Transform(format!(
            "Cannot parse {} value as date",
            value.kind_name()
        )));
    };

    NaiveDate::parse_from_str(s, format)
        .map(Value::Date)
        .map_err(|e| Error::Transform(format!("Cannot parse '{s}' with format '{format}': {e}")))
}

fn apply_parse_integer(value: &Value) -> Result<Value> {
    let Value::String(s) = value else {
        return Err(Error::Transform(format!(
            "Cannot parse {} value as integer",
            value.kind_name()
        )));
    };

    s.trim()
        .parse::<i64>()
        .map(Value::Integer)
        .map_err(|_| Error::Transform(format!("Cannot parse '{s}' as integer")))
}

impl PartialEq for ValueTransform {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Uppercase, Self::Uppercase)
            | (Self::Lowercase, Self::Lowercase)
            | (Self::Trim, Self::Trim)
            | (Self::FormatString, Self::FormatString)
            | (Self::ParseInteger, Self::ParseInteger) => true,
            (Self::FormatDate(a), Self::FormatDate(b))
            | (Self::ParseDate(a), Self::ParseDate(b)) => a == b,
            (
                Self::Custom {
                    name: a,
                    input: ia,
                    output: oa,
                    ..
                },
                Self::Custom {
                    name: b,
                    input: ib,
                    output: ob,
                    ..
                },
            ) => a == b && ia == ib && oa == ob,
            _ => false,
        }
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FormatDate(format) => f.debug_tuple("FormatDate").field(format).finish(),
            Self::ParseDate(format) => f.debug_tuple("ParseDate").field(format).finish(),
            Self::Custom {
                name,
                input,
                output,
                ..
            } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("input", input)
                .field("output", output)
                .finish(),
            other => write!(f, "{}", other.name()),
        }
    }
}
