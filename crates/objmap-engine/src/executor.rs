//! Mapping executor
//!
//! Applies compiled plans to concrete instances. Execution never mutates the
//! source; each call allocates one destination (or populates a
//! caller-supplied destination when mapping in place) and recurses into
//! nested registered pairs. Recursion depth is bounded so a cyclic type
//! configuration fails deterministically instead of exhausting the stack.

use crate::config::MappingRegistry;
use crate::plan::{MappingPlan, Resolution, TypePair};
use crate::{Error, Result};
use objmap_model::{Record, Reflect, TypeDescriptor, TypeTag, Value};
use std::sync::Arc;
use tracing::trace;

/// Default bound on nested-mapping recursion
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Executes compiled mapping plans against concrete instances
///
/// Cheap to clone; the sealed registry is shared behind an `Arc` and `map`
/// calls are independent, so one mapper can serve many threads.
#[derive(Debug, Clone)]
pub struct Mapper {
    registry: Arc<MappingRegistry>,
    max_depth: usize,
}

impl Mapper {
    /// Create a mapper over a sealed registry
    #[must_use]
    pub fn new(registry: MappingRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the recursion depth limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The sealed registry this mapper executes
    #[must_use]
    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Map a typed source instance into a new destination instance
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when no plan exists for the runtime type pair,
    /// and execution errors (transform failure, depth limit) as they occur.
    pub fn map<S: Reflect, D: Reflect>(&self, source: &S) -> Result<D> {
        let record = self.map_record(&source.to_record(), D::type_name())?;
        Ok(D::from_record(&record)?)
    }

    /// Map a record into a newly allocated record of `dest_type`
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when no plan exists for the runtime type pair,
    /// and execution errors as they occur.
    pub fn map_record(&self, source: &Record, dest_type: &str) -> Result<Record> {
        self.map_record_at(source, dest_type, 0)
    }

    /// Map a record into an existing destination instance
    ///
    /// Members bound `Unmapped` keep whatever value the destination already
    /// holds; everything else is overwritten in plan order.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedType` when no plan exists for the runtime type pair,
    /// and execution errors as they occur.
    pub fn map_into(&self, source: &Record, destination: &mut Record) -> Result<()> {
        let pair = TypePair::new(source.type_name(), destination.type_name());
        let plan = self.lookup(&pair)?;
        self.apply_plan(plan, source, destination, 0)
    }

    fn map_record_at(&self, source: &Record, dest_type: &str, depth: usize) -> Result<Record> {
        let pair = TypePair::new(source.type_name(), dest_type);
        let plan = self.lookup(&pair)?;
        let descriptor = self.dest_descriptor(&pair)?;
        let mut destination = Record::default_of(&descriptor);
        self.apply_plan(plan, source, &mut destination, depth)?;
        Ok(destination)
    }

    fn lookup(&self, pair: &TypePair) -> Result<&MappingPlan> {
        self.registry
            .lookup(pair)
            .ok_or_else(|| Error::UnmappedType(pair.clone()))
    }

    fn dest_descriptor(&self, pair: &TypePair) -> Result<Arc<TypeDescriptor>> {
        self.registry
            .descriptor(&pair.destination)
            .cloned()
            .ok_or_else(|| Error::UnmappedType(pair.clone()))
    }

    fn apply_plan(
        &self,
        plan: &MappingPlan,
        source: &Record,
        destination: &mut Record,
        depth: usize,
    ) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::MaxDepthExceeded {
                limit: self.max_depth,
            });
        }
        trace!("Applying plan {} at depth {depth}", plan.pair());

        let descriptor = self.dest_descriptor(plan.pair())?;
        for binding in plan.bindings() {
            let Some(dest_member) = descriptor.member(&binding.dest_member) else {
                continue;
            };
            match &binding.resolution {
                Resolution::Unmapped => {}
                Resolution::Direct { source: member } => {
                    let value = source.get(member).cloned().unwrap_or(Value::Null);
                    let coerced = self.coerce(source, member, &value, &dest_member.tag)?;
                    destination.set(&binding.dest_member, coerced);
                }
                Resolution::Transform {
                    source: member,
                    transform,
                } => {
                    let value = source.get(member).cloned().unwrap_or(Value::Null);
                    let transformed = transform.apply(&value)?;
                    let coerced =
                        self.coerce(source, member, &transformed, &dest_member.tag)?;
                    destination.set(&binding.dest_member, coerced);
                }
                Resolution::Nested {
                    source: member,
                    pair,
                } => {
                    let value = source.get(member).cloned().unwrap_or(Value::Null);
                    let mapped = self.map_nested(&value, pair, depth + 1)?;
                    destination.set(&binding.dest_member, mapped);
                }
            }
        }
        Ok(())
    }

    /// Map a nested value through its registered pair. `Null` maps to `Null`
    /// without recursing; lists map element-wise.
    fn map_nested(&self, value: &Value, pair: &TypePair, depth: usize) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Record(record) => Ok(Value::Record(self.map_record_at(
                record,
                &pair.destination,
                depth,
            )?)),
            Value::List(items) => items
                .iter()
                .map(|item| self.map_nested(item, pair, depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            other => Err(Error::Transform(format!(
                "Nested mapping {pair} expects a record, found {}",
                other.kind_name()
            ))),
        }
    }

    fn coerce(
        &self,
        source: &Record,
        member: &str,
        value: &Value,
        dest_tag: &TypeTag,
    ) -> Result<Value> {
        value.coerce_to(dest_tag).ok_or_else(|| {
            Error::Model(objmap_model::Error::FieldType {
                type_name: source.type_name().to_string(),
                member: member.to_string(),
                expected: dest_tag.to_string(),
                found: value.kind_name().to_string(),
            })
        })
    }
}
