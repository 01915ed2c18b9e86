//! Dynamically typed record instances

use crate::descriptor::TypeDescriptor;
use crate::value::Value;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A record instance: a type name plus an ordered sequence of named fields
///
/// Field order follows the order fields were added, which for instances built
/// from a descriptor is member declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    type_name: String,
    fields: Vec<Field>,
}

/// A single named field of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Record {
    /// Create an empty record of the given type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Create a record with every writable member set to its tag's default
    #[must_use]
    pub fn default_of(descriptor: &TypeDescriptor) -> Self {
        let mut record = Self::new(descriptor.type_name());
        for member in descriptor.members() {
            if member.writable {
                record.set(&member.name, member.tag.default_value());
            }
        }
        record
    }

    /// The record's type name
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Builder-style field append
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field value, replacing an existing field of the same name
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.value = value;
        } else {
            self.fields.push(Field { name, value });
        }
    }

    /// Find a field value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Iterate fields in order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn expect_field(&self, member: &str) -> Result<&Value> {
        self.get(member).ok_or_else(|| Error::MissingField {
            type_name: self.type_name.clone(),
            member: member.to_string(),
        })
    }

    fn field_type_error(&self, member: &str, expected: &str, found: &Value) -> Error {
        Error::FieldType {
            type_name: self.type_name.clone(),
            member: member.to_string(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    /// Read a string field; `Null` yields the empty string
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not string-shaped.
    pub fn string(&self, member: &str) -> Result<String> {
        match self.expect_field(member)? {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            other => Err(self.field_type_error(member, "string", other)),
        }
    }

    /// Read an integer field; `Null` yields zero
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not integer-shaped.
    pub fn integer(&self, member: &str) -> Result<i64> {
        match self.expect_field(member)? {
            Value::Integer(i) => Ok(*i),
            Value::Null => Ok(0),
            other => Err(self.field_type_error(member, "integer", other)),
        }
    }

    /// Read a decimal field, widening integers; `Null` yields zero
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not numeric.
    pub fn decimal(&self, member: &str) -> Result<f64> {
        match self.expect_field(member)? {
            Value::Decimal(d) => Ok(*d),
            Value::Integer(i) => Ok(*i as f64),
            Value::Null => Ok(0.0),
            other => Err(self.field_type_error(member, "decimal", other)),
        }
    }

    /// Read a boolean field; `Null` yields false
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not boolean-shaped.
    pub fn boolean(&self, member: &str) -> Result<bool> {
        match self.expect_field(member)? {
            Value::Boolean(b) => Ok(*b),
            Value::Null => Ok(false),
            other => Err(self.field_type_error(member, "boolean", other)),
        }
    }

    /// Read a date field; `Null` yields `None`
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not date-shaped.
    pub fn date(&self, member: &str) -> Result<Option<NaiveDate>> {
        match self.expect_field(member)? {
            Value::Date(d) => Ok(Some(*d)),
            Value::Null => Ok(None),
            other => Err(self.field_type_error(member, "date", other)),
        }
    }

    /// Read a nested record field; `Null` yields `None`
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not record-shaped.
    pub fn record(&self, member: &str) -> Result<Option<&Record>> {
        match self.expect_field(member)? {
            Value::Record(r) => Ok(Some(r)),
            Value::Null => Ok(None),
            other => Err(self.field_type_error(member, "record", other)),
        }
    }

    /// Read a list field; `Null` yields an empty list
    ///
    /// # Errors
    ///
    /// Returns an error when the field is missing or not list-shaped.
    pub fn list(&self, member: &str) -> Result<Vec<Value>> {
        match self.expect_field(member)? {
            Value::List(items) => Ok(items.clone()),
            Value::Null => Ok(Vec::new()),
            other => Err(self.field_type_error(member, "list", other)),
        }
    }
}
