//! tfplug - declarative resource reconciliation for Terraform providers
//!
//! The framework side of a provider: the attribute tree, schemas with
//! validators and defaults, presence-aware configuration access, change
//! detection, and a generic lifecycle controller that drives a remote API
//! through a per-kind mapper.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Reconciliation
pub mod data;
pub mod lifecycle;
pub mod plan;

// Helper modules
pub mod defaults;
pub mod import;
pub mod logging;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data::{Presence, ResourceData};
pub use data_source::DataSource;
pub use error::{RemoteError, Result, TfplugError};
pub use import::{ImportId, ImportKey};
pub use lifecycle::{Controller, LifecyclePolicy, Mapper, ReadOutcome, RemoteApi, Timeouts};
pub use logging::LogLevel;
pub use provider::{Provider, SchemaRegistry};
pub use resource::Resource;
pub use schema::{AttributeBuilder, AttributeType, NestedBlock, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue, ResourceState};
