//! Convention resolver
//!
//! Computes the default binding for a destination member when no explicit
//! override is configured. Matching is best-effort and never fatal: anything
//! that does not match cleanly resolves to `Unmapped`.

use crate::plan::{Resolution, TypePair};
use objmap_model::{MemberDescriptor, TypeDescriptor, TypeTag};

/// Options controlling convention matching
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionOptions {
    /// Fall back to case-insensitive name matching when no exact match
    /// exists. Exact matches always win over the fallback.
    pub case_insensitive: bool,
}

/// When both tags are record-shaped with matching structure (scalar record or
/// list of records on both sides), the type pair a nested mapping would use.
pub(crate) fn nested_pair(source: &TypeTag, destination: &TypeTag) -> Option<TypePair> {
    match (source, destination) {
        (TypeTag::Record(s), TypeTag::Record(d)) => Some(TypePair::new(s, d)),
        (TypeTag::List(s), TypeTag::List(d)) => nested_pair(s, d),
        _ => None,
    }
}

/// Resolve the default binding for one destination member
///
/// A destination member binds to the source member of the same name (exact
/// match, with an optional case-insensitive fallback). A name match yields
/// `Nested` when both sides are record-shaped and the inner pair is
/// registered, `Direct` when the tags are assignable, and `Unmapped`
/// otherwise. No name match resolves to `Unmapped`.
pub(crate) fn resolve_default(
    source: &TypeDescriptor,
    dest_member: &MemberDescriptor,
    options: ConventionOptions,
    registered: &[TypePair],
) -> Resolution {
    let candidate = source.member(&dest_member.name).or_else(|| {
        if options.case_insensitive {
            source.member_ignoring_case(&dest_member.name)
        } else {
            None
        }
    });

    let Some(source_member) = candidate else {
        return Resolution::Unmapped;
    };
    if !source_member.readable {
        return Resolution::Unmapped;
    }

    if let Some(pair) = nested_pair(&source_member.tag, &dest_member.tag) {
        if registered.contains(&pair) {
            return Resolution::Nested {
                source: source_member.name.clone(),
                pair,
            };
        }
    }

    if source_member.tag.is_assignable_to(&dest_member.tag) {
        return Resolution::Direct {
            source: source_member.name.clone(),
        };
    }

    Resolution::Unmapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmap_model::MemberDescriptor;

    fn source_descriptor() -> TypeDescriptor {
        TypeDescriptor::new(
            "Source",
            vec![
                MemberDescriptor::new("Name", TypeTag::String),
                MemberDescriptor::new("Count", TypeTag::Integer),
                MemberDescriptor::new("Home", TypeTag::Record("Address".to_string())),
                MemberDescriptor::read_only("Secret", TypeTag::String),
            ],
        )
    }

    fn dest(name: &str, tag: TypeTag) -> MemberDescriptor {
        MemberDescriptor::new(name, tag)
    }

    #[test]
    fn test_exact_name_match_is_direct() {
        let resolution = resolve_default(
            &source_descriptor(),
            &dest("Name", TypeTag::String),
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(
            resolution,
            Resolution::Direct {
                source: "Name".to_string()
            }
        );
    }

    #[test]
    fn test_widening_match_is_direct() {
        let resolution = resolve_default(
            &source_descriptor(),
            &dest("Count", TypeTag::Decimal),
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(
            resolution,
            Resolution::Direct {
                source: "Count".to_string()
            }
        );
    }

    #[test]
    fn test_no_match_is_unmapped() {
        let resolution = resolve_default(
            &source_descriptor(),
            &dest("Missing", TypeTag::String),
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(resolution, Resolution::Unmapped);
    }

    #[test]
    fn test_incompatible_tags_are_unmapped() {
        let resolution = resolve_default(
            &source_descriptor(),
            &dest("Name", TypeTag::Integer),
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(resolution, Resolution::Unmapped);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let member = dest("name", TypeTag::String);

        let strict = resolve_default(
            &source_descriptor(),
            &member,
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(strict, Resolution::Unmapped);

        let relaxed = resolve_default(
            &source_descriptor(),
            &member,
            ConventionOptions {
                case_insensitive: true,
            },
            &[],
        );
        assert_eq!(
            relaxed,
            Resolution::Direct {
                source: "Name".to_string()
            }
        );
    }

    #[test]
    fn test_exact_match_wins_over_fallback() {
        let source = TypeDescriptor::new(
            "Source",
            vec![
                MemberDescriptor::new("NAME", TypeTag::String),
                MemberDescriptor::new("Name", TypeTag::String),
            ],
        );
        let resolution = resolve_default(
            &source,
            &dest("Name", TypeTag::String),
            ConventionOptions {
                case_insensitive: true,
            },
            &[],
        );
        assert_eq!(
            resolution,
            Resolution::Direct {
                source: "Name".to_string()
            }
        );
    }

    #[test]
    fn test_unreadable_source_never_matches() {
        let resolution = resolve_default(
            &source_descriptor(),
            &dest("Secret", TypeTag::String),
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(resolution, Resolution::Unmapped);
    }

    #[test]
    fn test_registered_record_pair_is_nested() {
        let pair = TypePair::new("Address", "Address");
        let member = dest("Home", TypeTag::Record("Address".to_string()));

        let with_registration = resolve_default(
            &source_descriptor(),
            &member,
            ConventionOptions::default(),
            std::slice::from_ref(&pair),
        );
        assert_eq!(
            with_registration,
            Resolution::Nested {
                source: "Home".to_string(),
                pair: pair.clone(),
            }
        );
    }

    #[test]
    fn test_identical_record_tags_without_registration_copy_directly() {
        // Same record type on both sides is assignable as-is; without a
        // registered pair the value is copied, not recursed into.
        let member = dest("Home", TypeTag::Record("Address".to_string()));
        let resolution = resolve_default(
            &source_descriptor(),
            &member,
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(
            resolution,
            Resolution::Direct {
                source: "Home".to_string()
            }
        );
    }

    #[test]
    fn test_unregistered_foreign_record_pair_is_unmapped() {
        let member = dest("Home", TypeTag::Record("Location".to_string()));
        let resolution = resolve_default(
            &source_descriptor(),
            &member,
            ConventionOptions::default(),
            &[],
        );
        assert_eq!(resolution, Resolution::Unmapped);
    }

    #[test]
    fn test_list_of_records_nests_elementwise() {
        let source = TypeDescriptor::new(
            "Order",
            vec![MemberDescriptor::new(
                "Items",
                TypeTag::List(Box::new(TypeTag::Record("Item".to_string()))),
            )],
        );
        let pair = TypePair::new("Item", "ItemRow");
        let member = dest(
            "Items",
            TypeTag::List(Box::new(TypeTag::Record("ItemRow".to_string()))),
        );

        let resolution = resolve_default(
            &source,
            &member,
            ConventionOptions::default(),
            std::slice::from_ref(&pair),
        );
        assert_eq!(
            resolution,
            Resolution::Nested {
                source: "Items".to_string(),
                pair,
            }
        );
    }
}
