//! Compiled mapping plans

use crate::transforms::ValueTransform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered (source type, destination type) combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypePair {
    /// Source type name
    pub source: String,

    /// Destination type name
    pub destination: String,
}

impl TypePair {
    /// Create a type pair from type names
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// How one destination member obtains its value
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Copy the named source member, with implicit widening
    Direct { source: String },

    /// Apply a transform to the named source member and assign the result
    Transform {
        source: String,
        transform: ValueTransform,
    },

    /// Recursively map the named source member through another registered pair
    Nested { source: String, pair: TypePair },

    /// Leave the destination member at its default
    Unmapped,
}

/// Binding for exactly one destination member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBinding {
    /// Destination member name
    pub dest_member: String,

    /// Resolved source of the member's value
    pub resolution: Resolution,
}

/// Immutable compiled plan for one type pair
///
/// Bindings follow destination member declaration order, and every
/// destination member has exactly one binding.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingPlan {
    pair: TypePair,
    bindings: Vec<MemberBinding>,
}

impl MappingPlan {
    pub(crate) fn new(pair: TypePair, bindings: Vec<MemberBinding>) -> Self {
        Self { pair, bindings }
    }

    /// The type pair this plan belongs to
    #[must_use]
    pub fn pair(&self) -> &TypePair {
        &self.pair
    }

    /// Bindings in destination declaration order
    #[must_use]
    pub fn bindings(&self) -> &[MemberBinding] {
        &self.bindings
    }

    /// Find the binding for a destination member
    #[must_use]
    pub fn binding(&self, dest_member: &str) -> Option<&MemberBinding> {
        self.bindings.iter().find(|b| b.dest_member == dest_member)
    }
}
