//! DataSource trait and related types
//!
//! This module defines the DataSource trait that data sources must implement.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue, ResourceState};
use async_trait::async_trait;
use std::sync::Arc;

/// Base trait for data sources - implement read operations
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name should be constant (e.g., "castai_eks_settings")
    fn type_name(&self) -> &str;

    fn schema(&self) -> Arc<Schema>;

    /// Called during plan to validate configuration
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse;

    /// Called to read data - this is the only operation for data sources
    /// MUST populate all attributes in response.state
    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

pub struct ValidateDataSourceConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateDataSourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadDataSourceRequest {
    pub config: DynamicValue,
}

pub struct ReadDataSourceResponse {
    pub state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}
