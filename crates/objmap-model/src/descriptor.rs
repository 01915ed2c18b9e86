//! Type descriptors
//!
//! A [`TypeDescriptor`] enumerates the externally visible, independently
//! readable/writable members of a type in declaration order. Descriptors are
//! pure data; the engine compiles plans against them, never against concrete
//! instances.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type tag of a member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// String value
    String,

    /// Integer value
    Integer,

    /// Decimal value
    Decimal,

    /// Boolean value
    Boolean,

    /// Calendar date value
    Date,

    /// Nested record of the named type
    Record(String),

    /// Ordered sequence of the inner tag
    List(Box<TypeTag>),
}

impl TypeTag {
    /// Whether a value of this tag is directly assignable to `other`
    ///
    /// Identical tags are assignable; integers widen to decimals; lists are
    /// assignable element-wise. Record tags of different names are never
    /// directly assignable (that is what nested mapping is for).
    #[must_use]
    pub fn is_assignable_to(&self, other: &TypeTag) -> bool {
        match (self, other) {
            (TypeTag::Integer, TypeTag::Decimal) => true,
            (TypeTag::List(a), TypeTag::List(b)) => a.is_assignable_to(b),
            _ => self == other,
        }
    }

    /// Default value for a member of this tag
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::String => Value::String(String::new()),
            TypeTag::Integer => Value::Integer(0),
            TypeTag::Decimal => Value::Decimal(0.0),
            TypeTag::Boolean => Value::Boolean(false),
            TypeTag::Date | TypeTag::Record(_) => Value::Null,
            TypeTag::List(_) => Value::List(Vec::new()),
        }
    }

    /// The record type name when this tag is record-shaped, directly or as a
    /// list of records
    #[must_use]
    pub fn record_type(&self) -> Option<&str> {
        match self {
            TypeTag::Record(name) => Some(name),
            TypeTag::List(inner) => inner.record_type(),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::String => write!(f, "string"),
            TypeTag::Integer => write!(f, "integer"),
            TypeTag::Decimal => write!(f, "decimal"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::Date => write!(f, "date"),
            TypeTag::Record(name) => write!(f, "record<{name}>"),
            TypeTag::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

/// A single mappable member of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    /// Member name
    pub name: String,

    /// Semantic type tag
    pub tag: TypeTag,

    /// Whether the member can be read from a source instance
    pub readable: bool,

    /// Whether the member can be written on a destination instance
    pub writable: bool,
}

impl MemberDescriptor {
    /// Create a readable and writable member
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            readable: true,
            writable: true,
        }
    }

    /// Create a member that can be read but never assigned
    pub fn read_only(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            readable: true,
            writable: false,
        }
    }
}

/// Descriptor of one type's mappable members, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    type_name: String,
    members: Vec<MemberDescriptor>,
}

impl TypeDescriptor {
    /// Create a descriptor from members in declaration order
    pub fn new(type_name: impl Into<String>, members: Vec<MemberDescriptor>) -> Self {
        Self {
            type_name: type_name.into(),
            members,
        }
    }

    /// The described type's name
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Members in declaration order
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Find a member by exact name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Find the first member matching `name` case-insensitively
    #[must_use]
    pub fn member_ignoring_case(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Whether any member can be assigned
    #[must_use]
    pub fn has_writable_members(&self) -> bool {
        self.members.iter().any(|m| m.writable)
    }
}
