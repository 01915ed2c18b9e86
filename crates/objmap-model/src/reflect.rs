//! Reflection bridge between concrete types and the dynamic model
//!
//! Rust has no runtime reflection, so types opt in by describing their
//! mappable members and converting themselves to and from [`Record`]. The
//! descriptor for each type is built on first use and cached for the process
//! lifetime; the cache is never invalidated.

use crate::Result;
use crate::descriptor::TypeDescriptor;
use crate::record::Record;
use dashmap::DashMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

static DESCRIPTORS: LazyLock<DashMap<&'static str, Arc<TypeDescriptor>>> =
    LazyLock::new(DashMap::new);

/// Bridge between a concrete Rust type and the dynamic record model
pub trait Reflect: Sized {
    /// Stable type identity used to key descriptors and mapping plans
    fn type_name() -> &'static str;

    /// Describe the mappable members in declaration order
    fn descriptor() -> TypeDescriptor;

    /// Convert an instance into its record representation
    fn to_record(&self) -> Record;

    /// Rebuild an instance from a record
    ///
    /// # Errors
    ///
    /// Returns an error when the record's shape does not match the type.
    fn from_record(record: &Record) -> Result<Self>;
}

/// Cached descriptor lookup for a reflected type
///
/// The first call for a distinct type builds and caches its descriptor;
/// later calls return the cached copy.
pub fn describe<T: Reflect>() -> Arc<TypeDescriptor> {
    if let Some(cached) = DESCRIPTORS.get(T::type_name()) {
        debug!("Descriptor cache hit for type: {}", T::type_name());
        return Arc::clone(&cached);
    }

    trace!("Descriptor cache miss for type: {}", T::type_name());
    let descriptor = Arc::new(T::descriptor());
    DESCRIPTORS.insert(T::type_name(), Arc::clone(&descriptor));
    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{MemberDescriptor, TypeTag};
    use crate::value::Value;

    struct Probe {
        label: String,
    }

    impl Reflect for Probe {
        fn type_name() -> &'static str {
            "reflect_test::Probe"
        }

        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new(
                Self::type_name(),
                vec![MemberDescriptor::new("label", TypeTag::String)],
            )
        }

        fn to_record(&self) -> Record {
            Record::new(Self::type_name()).with_field("label", Value::String(self.label.clone()))
        }

        fn from_record(record: &Record) -> Result<Self> {
            Ok(Self {
                label: record.string("label")?,
            })
        }
    }

    #[test]
    fn test_describe_caches() {
        let first = describe::<Probe>();
        let second = describe::<Probe>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.type_name(), "reflect_test::Probe");
    }

    #[test]
    fn test_round_trip() {
        let probe = Probe {
            label: "hello".to_string(),
        };
        let rebuilt = Probe::from_record(&probe.to_record()).unwrap();
        assert_eq!(rebuilt.label, "hello");
    }
}
