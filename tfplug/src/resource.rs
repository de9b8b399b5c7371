//! Resource trait and related types
//!
//! This module defines the object-safe Resource trait the plugin host drives.
//! Every failure is reported through diagnostics; a missing `new_state`
//! means the host keeps (or clears) what it had.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue, ResourceState};
use async_trait::async_trait;
use std::sync::Arc;

/// Base trait for resources - implement CRUD operations
/// Type name should be constant and match the key in the provider's registry
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name should be constant (e.g., "castai_node_template")
    fn type_name(&self) -> &str;

    /// Shared, immutable schema for this resource kind
    fn schema(&self) -> Arc<Schema>;

    /// Called during plan to validate configuration
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse;

    /// Called to create a new resource
    /// MUST populate all attributes in response.new_state (including computed)
    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse;

    /// Called to refresh state
    /// Returns None when the remote object no longer exists
    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse;

    /// Called to update an existing resource
    /// A failed update returns the prior state unchanged
    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse;

    /// Called to delete a resource
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse;

    /// Called during "terraform import"
    /// Parse the ID and populate full resource state
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        ImportResourceStateResponse {
            imported: None,
            diagnostics: vec![Diagnostic::error(
                "Import not supported",
                format!("{} does not support import (id {:?})", self.type_name(), request.id),
            )],
        }
    }
}

// Request/Response types for Resource trait

pub struct ValidateResourceConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct CreateResourceRequest {
    pub config: DynamicValue,
}

pub struct CreateResourceResponse {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadResourceRequest {
    pub current_state: ResourceState,
}

pub struct ReadResourceResponse {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct UpdateResourceRequest {
    pub prior_state: ResourceState,
    pub config: DynamicValue,
}

pub struct UpdateResourceResponse {
    pub new_state: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct DeleteResourceRequest {
    pub prior_state: ResourceState,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ImportResourceStateRequest {
    pub id: String,
}

pub struct ImportResourceStateResponse {
    pub imported: Option<ResourceState>,
    pub diagnostics: Vec<Diagnostic>,
}
