//! Configuration registry and plan compilation
//!
//! [`MapperConfig`] is the mutable configuration phase: type pairs are
//! registered and per-member overrides installed. [`MapperConfig::seal`]
//! consumes the configuration and compiles every pair into an immutable
//! [`MappingRegistry`]; registering after sealing is therefore
//! unrepresentable. All configuration problems are detected at seal time and
//! aggregated into a single [`ConfigReport`] — sealing is all-or-nothing.

use crate::convention::{self, ConventionOptions};
use crate::plan::{MappingPlan, MemberBinding, Resolution, TypePair};
use crate::transforms::ValueTransform;
use crate::{Error, Result};
use objmap_model::{MemberDescriptor, Reflect, TypeDescriptor, describe};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Explicit per-member override
#[derive(Debug, Clone)]
pub enum MemberSpec {
    /// Copy from the named source member
    From(String),

    /// Apply a transform to the named source member
    Convert(String, ValueTransform),

    /// Recursively map the named source member through its registered pair
    Nested(String),

    /// Leave the destination member at its default
    Ignore,
}

impl MemberSpec {
    /// Copy from the named source member
    pub fn from_member(source: impl Into<String>) -> Self {
        Self::From(source.into())
    }

    /// Apply a transform to the named source member
    pub fn convert(source: impl Into<String>, transform: ValueTransform) -> Self {
        Self::Convert(source.into(), transform)
    }

    /// Recursively map the named source member
    pub fn nested(source: impl Into<String>) -> Self {
        Self::Nested(source.into())
    }
}

/// Mutable configuration for one registered type pair
pub struct PairConfig {
    pair: TypePair,
    source: Arc<TypeDescriptor>,
    destination: Arc<TypeDescriptor>,
    overrides: Vec<(String, MemberSpec)>,
}

impl PairConfig {
    /// Install an explicit override for one destination member
    ///
    /// Overrides take precedence over convention-derived resolutions
    /// regardless of installation order. The last override installed for a
    /// member wins.
    pub fn member(&mut self, dest_member: impl Into<String>, spec: MemberSpec) -> &mut Self {
        self.overrides.push((dest_member.into(), spec));
        self
    }

    fn last_override(&self, dest_member: &str) -> Option<&MemberSpec> {
        self.overrides
            .iter()
            .rev()
            .find(|(name, _)| name == dest_member)
            .map(|(_, spec)| spec)
    }
}

/// A single invalid member configuration
#[derive(Debug)]
pub struct ConfigIssue {
    /// Type pair the issue belongs to
    pub pair: TypePair,

    /// Offending destination member
    pub member: String,

    /// What is wrong with it
    pub reason: String,
}

/// Aggregated configuration problems detected at seal time
///
/// Collects every invalid member of every pair so a caller can fix the whole
/// configuration in one pass.
#[derive(Debug, Default)]
pub struct ConfigReport {
    issues: Vec<ConfigIssue>,
}

impl ConfigReport {
    fn push(&mut self, pair: &TypePair, member: &str, reason: impl Into<String>) {
        self.issues.push(ConfigIssue {
            pair: pair.clone(),
            member: member.to_string(),
            reason: reason.into(),
        });
    }

    /// All collected issues
    #[must_use]
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Number of issues
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the report is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid member configuration(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {}: {}: {}", issue.pair, issue.member, issue.reason)?;
        }
        Ok(())
    }
}

/// Mapping configuration, mutable until sealed
#[derive(Default)]
pub struct MapperConfig {
    pairs: Vec<PairConfig>,
    options: ConventionOptions,
}

impl MapperConfig {
    /// Create an empty configuration with default convention options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty configuration with explicit convention options
    #[must_use]
    pub fn with_options(options: ConventionOptions) -> Self {
        Self {
            pairs: Vec::new(),
            options,
        }
    }

    /// Register a type pair through the reflection bridge
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` when the ordered pair is already
    /// registered, or an introspection error when the destination type has no
    /// writable members.
    pub fn register_pair<S: Reflect, D: Reflect>(&mut self) -> Result<&mut PairConfig> {
        self.register(describe::<S>(), describe::<D>())
    }

    /// Register a type pair from explicit descriptors
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` when the ordered pair is already
    /// registered, or an introspection error when the destination type has no
    /// writable members.
    pub fn register(
        &mut self,
        source: Arc<TypeDescriptor>,
        destination: Arc<TypeDescriptor>,
    ) -> Result<&mut PairConfig> {
        let pair = TypePair::new(source.type_name(), destination.type_name());
        if self.pairs.iter().any(|p| p.pair == pair) {
            return Err(Error::DuplicateRegistration(pair));
        }
        if !destination.has_writable_members() {
            return Err(Error::Introspection(format!(
                "Destination type '{}' exposes no writable members",
                destination.type_name()
            )));
        }

        debug!("Registered mapping {pair}");
        self.pairs.push(PairConfig {
            pair,
            source,
            destination,
            overrides: Vec::new(),
        });
        Ok(self.pairs.last_mut().unwrap())
    }

    /// Compile every registered pair into an immutable registry
    ///
    /// For each destination member without an explicit override the
    /// convention resolver computes the default binding. Compiling the same
    /// configuration twice yields structurally identical plans.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` carrying every invalid member of every pair.
    pub fn seal(self) -> Result<MappingRegistry> {
        let registered: Vec<TypePair> = self.pairs.iter().map(|p| p.pair.clone()).collect();
        let mut report = ConfigReport::default();
        let mut plans = HashMap::new();
        let mut descriptors = HashMap::new();

        for pair_config in &self.pairs {
            if pair_config.source.members().is_empty() {
                warn!(
                    "Source type '{}' exposes no mappable members; every destination member of {} resolves to its default",
                    pair_config.source.type_name(),
                    pair_config.pair
                );
            }

            let mut bindings = Vec::new();
            for dest_member in pair_config.destination.members() {
                let resolution = match pair_config.last_override(&dest_member.name) {
                    Some(_) if !dest_member.writable => {
                        report.push(
                            &pair_config.pair,
                            &dest_member.name,
                            "destination member is not writable",
                        );
                        Resolution::Unmapped
                    }
                    Some(spec) => compile_override(
                        pair_config,
                        dest_member,
                        spec,
                        &registered,
                        &mut report,
                    ),
                    None if !dest_member.writable => Resolution::Unmapped,
                    None => convention::resolve_default(
                        &pair_config.source,
                        dest_member,
                        self.options,
                        &registered,
                    ),
                };
                bindings.push(MemberBinding {
                    dest_member: dest_member.name.clone(),
                    resolution,
                });
            }

            for (name, _) in &pair_config.overrides {
                if pair_config.destination.member(name).is_none() {
                    report.push(
                        &pair_config.pair,
                        name,
                        "destination member does not exist",
                    );
                }
            }

            plans.insert(
                pair_config.pair.clone(),
                MappingPlan::new(pair_config.pair.clone(), bindings),
            );
            descriptors.insert(
                pair_config.source.type_name().to_string(),
                Arc::clone(&pair_config.source),
            );
            descriptors.insert(
                pair_config.destination.type_name().to_string(),
                Arc::clone(&pair_config.destination),
            );
        }

        if !report.is_empty() {
            return Err(Error::Configuration(report));
        }

        debug!("Sealed {} mapping plan(s)", plans.len());
        Ok(MappingRegistry { plans, descriptors })
    }
}

fn compile_override(
    pair_config: &PairConfig,
    dest_member: &MemberDescriptor,
    spec: &MemberSpec,
    registered: &[TypePair],
    report: &mut ConfigReport,
) -> Resolution {
    let pair = &pair_config.pair;

    let source_member = |name: &str, report: &mut ConfigReport| {
        let Some(member) = pair_config.source.member(name) else {
            report.push(
                pair,
                &dest_member.name,
                format!(
                    "source member '{name}' does not exist on '{}'",
                    pair_config.source.type_name()
                ),
            );
            return None;
        };
        if !member.readable {
            report.push(
                pair,
                &dest_member.name,
                format!("source member '{name}' is not readable"),
            );
            return None;
        }
        Some(member)
    };

    match spec {
        MemberSpec::Ignore => Resolution::Unmapped,
        MemberSpec::From(name) => {
            let Some(member) = source_member(name, report) else {
                return Resolution::Unmapped;
            };
            if !member.tag.is_assignable_to(&dest_member.tag) {
                report.push(
                    pair,
                    &dest_member.name,
                    format!(
                        "source member '{name}' of type {} is not assignable to {}",
                        member.tag, dest_member.tag
                    ),
                );
                return Resolution::Unmapped;
            }
            Resolution::Direct {
                source: member.name.clone(),
            }
        }
        MemberSpec::Convert(name, transform) => {
            let Some(member) = source_member(name, report) else {
                return Resolution::Unmapped;
            };
            if !transform.accepts(&member.tag) {
                report.push(
                    pair,
                    &dest_member.name,
                    format!(
                        "transform '{}' does not accept source member '{name}' of type {}",
                        transform.name(),
                        member.tag
                    ),
                );
                return Resolution::Unmapped;
            }
            let output = transform.output();
            if !output.is_assignable_to(&dest_member.tag) {
                report.push(
                    pair,
                    &dest_member.name,
                    format!(
                        "transform '{}' produces {output}, which is not assignable to {}",
                        transform.name(),
                        dest_member.tag
                    ),
                );
                return Resolution::Unmapped;
            }
            Resolution::Transform {
                source: member.name.clone(),
                transform: transform.clone(),
            }
        }
        MemberSpec::Nested(name) => {
            let Some(member) = source_member(name, report) else {
                return Resolution::Unmapped;
            };
            let Some(nested) = convention::nested_pair(&member.tag, &dest_member.tag) else {
                report.push(
                    pair,
                    &dest_member.name,
                    format!(
                        "nested mapping requires record-shaped members, found {} and {}",
                        member.tag, dest_member.tag
                    ),
                );
                return Resolution::Unmapped;
            };
            if !registered.contains(&nested) {
                report.push(
                    pair,
                    &dest_member.name,
                    format!("inner type pair {nested} is not registered"),
                );
                return Resolution::Unmapped;
            }
            Resolution::Nested {
                source: member.name.clone(),
                pair: nested,
            }
        }
    }
}

/// Immutable, validated mapping plans for every registered pair
///
/// Safe for unsynchronized concurrent reads; plans never change after
/// sealing.
#[derive(Debug)]
pub struct MappingRegistry {
    plans: HashMap<TypePair, MappingPlan>,
    descriptors: HashMap<String, Arc<TypeDescriptor>>,
}

impl MappingRegistry {
    /// Find the plan compiled for a type pair
    #[must_use]
    pub fn lookup(&self, pair: &TypePair) -> Option<&MappingPlan> {
        self.plans.get(pair)
    }

    /// Descriptor of a type that participated in any registered pair
    #[must_use]
    pub fn descriptor(&self, type_name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.descriptors.get(type_name)
    }

    /// Registered pairs, in no particular order
    pub fn pairs(&self) -> impl Iterator<Item = &TypePair> {
        self.plans.keys()
    }

    /// Number of compiled plans
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether the registry holds no plans
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
