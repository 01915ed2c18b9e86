//! # objmap-model
//!
//! Dynamic value model, type descriptors, and the reflection bridge for the
//! objmap engine.
//!
//! Concrete Rust types enter the engine through the [`Reflect`] trait, which
//! describes a type's mappable members and converts instances to and from the
//! dynamic [`Record`] representation. Descriptors are built once per distinct
//! type and cached for the lifetime of the process.

pub mod descriptor;
pub mod record;
pub mod reflect;
pub mod value;

pub use descriptor::{MemberDescriptor, TypeDescriptor, TypeTag};
pub use record::Record;
pub use reflect::{Reflect, describe};
pub use value::Value;

use thiserror::Error;

/// Errors that can occur in the value model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Type '{type_name}' has no member '{member}'")]
    MissingField { type_name: String, member: String },

    #[error("Member '{member}' of type '{type_name}' expected {expected}, found {found}")]
    FieldType {
        type_name: String,
        member: String,
        expected: String,
        found: String,
    },

    #[error("Introspection error: {0}")]
    Introspection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
