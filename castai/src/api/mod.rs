//! CAST AI REST API client

pub mod client;
pub mod common;
pub mod error;
pub mod node_configurations;
pub mod node_templates;
pub mod pool;

#[cfg(test)]
mod test_helpers;

pub use client::{Client, ClientConfig, RetryConfig};
pub use error::ApiError;
pub use node_configurations::{NodeConfiguration, NodeConfigurationRequest};
pub use node_templates::{NodeTemplate, NodeTemplateRequest};
