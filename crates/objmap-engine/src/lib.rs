//! # objmap-engine
//!
//! Convention resolution, mapping-plan compilation, and execution.
//!
//! A [`MapperConfig`] collects type-pair registrations and per-member
//! overrides during a mutable configuration phase. [`MapperConfig::seal`]
//! consumes the configuration, validates it as a whole, and compiles every
//! pair into an immutable [`MappingRegistry`] of [`MappingPlan`]s. A
//! [`Mapper`] built over the sealed registry executes plans against concrete
//! instances, recursing into nested registered pairs.

pub mod config;
pub mod convention;
pub mod executor;
pub mod plan;
pub mod transforms;

pub use config::{ConfigIssue, ConfigReport, MapperConfig, MappingRegistry, MemberSpec, PairConfig};
pub use convention::ConventionOptions;
pub use executor::Mapper;
pub use plan::{MappingPlan, MemberBinding, Resolution, TypePair};
pub use transforms::ValueTransform;

use thiserror::Error;

/// Errors raised during configuration, sealing, or execution
#[derive(Error, Debug)]
pub enum Error {
    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Type pair {0} is already registered")]
    DuplicateRegistration(TypePair),

    #[error("{0}")]
    Configuration(ConfigReport),

    #[error("No mapping registered for {0}")]
    UnmappedType(TypePair),

    #[error("Mapping recursion exceeded {limit} levels")]
    MaxDepthExceeded { limit: usize },

    #[error("Transform error: {0}")]
    Transform(String),

    #[error(transparent)]
    Model(#[from] objmap_model::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
