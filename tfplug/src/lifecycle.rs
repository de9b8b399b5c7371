//! Generic reconciliation of one resource kind against a remote API
//!
//! A `Controller` pairs a `Mapper` (pure conversion between the attribute
//! tree and API shapes) with a `RemoteApi` (the calls themselves) and drives
//! create/read/update/delete/import. Validation and cross-field invariants
//! run before any remote call, updates with nothing to change make no call
//! at all, and every remote call is bounded by the operation timeout and the
//! caller's context. The controller never retries.

use crate::context::Context;
use crate::data::ResourceData;
use crate::error::{RemoteError, Result, TfplugError};
use crate::import::{ImportId, ImportKey};
use crate::plan;
use crate::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use crate::schema::Schema;
use crate::types::{has_errors, AttributePath, Diagnostic, DynamicValue, ResourceState};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Remote operation result
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Bidirectional conversion between the attribute tree and API shapes
pub trait Mapper: Send + Sync {
    type Request: Send + Sync;
    type Response: Send + Sync;

    /// Builds a request from configuration. Only explicitly set attributes
    /// belong in the request; on update this includes changed attributes
    /// the configuration dropped.
    fn expand(&self, data: &ResourceData<'_>) -> Result<Self::Request>;

    /// Maps every present response field to its attribute. The controller
    /// normalizes the result against the schema.
    fn flatten(&self, response: &Self::Response) -> DynamicValue;

    /// Remote identity of the object
    fn identity(&self, response: &Self::Response) -> String;

    /// Human name used to resolve imports by name
    fn name_of(&self, _response: &Self::Response) -> Option<String> {
        None
    }

    /// Checks spanning more than one attribute, run before any remote call
    fn check_invariants(&self, _data: &ResourceData<'_>) -> Result<()> {
        Ok(())
    }

    /// Attribute holding the parent identity (e.g. the cluster)
    fn parent_attribute(&self) -> Option<&'static str> {
        None
    }
}

/// Calls against the remote management API for one resource kind
#[async_trait]
pub trait RemoteApi: Send + Sync {
    type Request: Send + Sync;
    type Response: Send + Sync;

    async fn create(
        &self,
        ctx: &Context,
        parent: Option<&str>,
        request: &Self::Request,
    ) -> RemoteResult<Self::Response>;

    async fn read(
        &self,
        ctx: &Context,
        parent: Option<&str>,
        identity: &str,
    ) -> RemoteResult<Self::Response>;

    async fn update(
        &self,
        ctx: &Context,
        parent: Option<&str>,
        identity: &str,
        request: &Self::Request,
    ) -> RemoteResult<Self::Response>;

    async fn delete(&self, ctx: &Context, parent: Option<&str>, identity: &str)
        -> RemoteResult<()>;

    async fn list(&self, ctx: &Context, parent: Option<&str>) -> RemoteResult<Vec<Self::Response>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Import,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Import => "import",
        }
    }
}

/// Per-operation timeouts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(60),
            read: Duration::from_secs(60),
            update: Duration::from_secs(60),
            delete: Duration::from_secs(60),
        }
    }
}

impl Timeouts {
    fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read | Operation::Import => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// How a resource kind behaves around absence and updates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LifecyclePolicy {
    /// Not-found on read keeps the prior state instead of clearing it
    pub protected: bool,
    /// Updates expand only the attributes that changed
    pub partial_update: bool,
    pub timeouts: Timeouts,
}

/// Outcome of a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Present(ResourceState),
    /// The remote object is gone; state should be cleared
    Absent,
    /// The remote object is gone but the kind is protected; prior state stands
    Unchanged,
}

pub struct Controller<M, A> {
    kind: String,
    schema: Arc<Schema>,
    mapper: M,
    api: A,
    policy: LifecyclePolicy,
}

impl<M, A> Controller<M, A>
where
    M: Mapper,
    A: RemoteApi<Request = M::Request, Response = M::Response>,
{
    pub fn new(kind: impl Into<String>, schema: Arc<Schema>, mapper: M, api: A) -> Self {
        Self {
            kind: kind.into(),
            schema,
            mapper,
            api,
            policy: LifecyclePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub async fn create(&self, ctx: &Context, config: &DynamicValue) -> Result<ResourceState> {
        tracing::info!("{} create call start", self.kind);

        self.check_config(config)?;
        let data = ResourceData::new(&self.schema, config);
        self.mapper.check_invariants(&data)?;
        let request = self.mapper.expand(&data)?;

        let parent = self.parent_of(config);
        let response = self
            .call(
                ctx,
                Operation::Create,
                self.api.create(ctx, parent.as_deref(), &request),
            )
            .await
            .map_err(|e| self.wrap(Operation::Create, "", e))?;

        let state = self.finish(&response, parent)?;
        tracing::info!("{} create call end, id {}", self.kind, state.id);
        Ok(state)
    }

    pub async fn read(&self, ctx: &Context, prior: &ResourceState) -> Result<ReadOutcome> {
        if prior.is_absent() {
            return Ok(ReadOutcome::Absent);
        }
        tracing::info!("{} read call start, id {}", self.kind, prior.id);

        let parent = self.parent_of(&prior.attributes);
        let result = self
            .call(
                ctx,
                Operation::Read,
                self.api.read(ctx, parent.as_deref(), &prior.id),
            )
            .await;

        match result {
            Ok(response) => Ok(ReadOutcome::Present(self.finish(&response, parent)?)),
            Err(RemoteError::NotFound) if self.policy.protected => {
                tracing::warn!("{} ({}) not found, keeping prior state", self.kind, prior.id);
                Ok(ReadOutcome::Unchanged)
            }
            Err(RemoteError::NotFound) => {
                tracing::warn!("{} ({}) not found, removing from state", self.kind, prior.id);
                Ok(ReadOutcome::Absent)
            }
            Err(e) => Err(self.wrap(Operation::Read, &prior.id, e)),
        }
    }

    pub async fn update(
        &self,
        ctx: &Context,
        prior: &ResourceState,
        config: &DynamicValue,
    ) -> Result<ResourceState> {
        self.check_config(config)?;

        let diff = plan::diff(&self.schema, &prior.attributes, config);
        if !diff.requires_replace.is_empty() {
            return Err(TfplugError::RequiresReplace(diff.requires_replace));
        }
        if diff.is_empty() {
            tracing::info!("Nothing to update in {} ({})", self.kind, prior.id);
            return Ok(prior.clone());
        }
        tracing::info!(
            "{} update call start, id {}, changed: {:?}",
            self.kind,
            prior.id,
            diff.changed
        );

        let full = ResourceData::new(&self.schema, config);
        self.mapper.check_invariants(&full)?;
        let data = full.restoring_defaults(&diff.changed);
        let request = if self.policy.partial_update {
            self.mapper.expand(&data.only_changed(&diff.changed))?
        } else {
            self.mapper.expand(&data)?
        };

        let parent = self.parent_of(config);
        let response = self
            .call(
                ctx,
                Operation::Update,
                self.api
                    .update(ctx, parent.as_deref(), &prior.id, &request),
            )
            .await
            .map_err(|e| self.wrap(Operation::Update, &prior.id, e))?;

        let state = self.finish(&response, parent)?;
        tracing::info!("{} update call end, id {}", self.kind, state.id);
        Ok(state)
    }

    pub async fn delete(&self, ctx: &Context, prior: &ResourceState) -> Result<()> {
        if prior.is_absent() {
            return Ok(());
        }
        tracing::info!("{} delete call start, id {}", self.kind, prior.id);

        let parent = self.parent_of(&prior.attributes);
        let result = self
            .call(
                ctx,
                Operation::Delete,
                self.api.delete(ctx, parent.as_deref(), &prior.id),
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(RemoteError::NotFound) => {
                tracing::info!("{} ({}) already deleted", self.kind, prior.id);
                Ok(())
            }
            Err(RemoteError::Protected(reason)) => {
                tracing::warn!(
                    "{} ({}) cannot be deleted remotely, removing from state only: {}",
                    self.kind,
                    prior.id,
                    reason
                );
                Ok(())
            }
            Err(e) => Err(self.wrap(Operation::Delete, &prior.id, e)),
        }
    }

    /// Resolves `<parent>/<name or id>` to an identity, then reads the object
    pub async fn import(&self, ctx: &Context, raw_id: &str) -> Result<ResourceState> {
        let (parent, identity) = match self.mapper.parent_attribute() {
            Some(attr) => {
                let expected = format!("<{}>/<name or id>", attr);
                let id = ImportId::parse(raw_id, &expected)?;
                let identity = match &id.key {
                    ImportKey::Identity(identity) => identity.clone(),
                    ImportKey::Name(name) => self.resolve_name(ctx, &id.parent, name).await?,
                };
                (Some(id.parent), identity)
            }
            None => (None, raw_id.to_string()),
        };
        tracing::info!("importing {} ({})", self.kind, identity);

        let mut attributes = DynamicValue::empty_object();
        if let (Some(attr), Some(parent)) = (self.mapper.parent_attribute(), &parent) {
            attributes.set_string(&AttributePath::new(attr), parent.clone())?;
        }
        let stub = ResourceState::new(identity.clone(), attributes);

        match self.read(ctx, &stub).await? {
            ReadOutcome::Present(state) => Ok(state),
            ReadOutcome::Absent | ReadOutcome::Unchanged => Err(TfplugError::RemoteNotFound {
                operation: Operation::Import.as_str(),
                kind: self.kind.clone(),
                identity,
            }),
        }
    }

    async fn resolve_name(&self, ctx: &Context, parent: &str, name: &str) -> Result<String> {
        let items = self
            .call(ctx, Operation::Import, self.api.list(ctx, Some(parent)))
            .await
            .map_err(|e| self.wrap(Operation::Import, name, e))?;

        items
            .iter()
            .find(|item| self.mapper.name_of(item).as_deref() == Some(name))
            .map(|item| self.mapper.identity(item))
            .ok_or_else(|| TfplugError::ImportResolution {
                kind: self.kind.clone(),
                key: name.to_string(),
            })
    }

    fn check_config(&self, config: &DynamicValue) -> Result<()> {
        let diagnostics = self.schema.validate_config(config);
        match diagnostics.into_iter().find(Diagnostic::is_error) {
            Some(d) => Err(TfplugError::validation(
                d.attribute.map(|p| p.to_string()).unwrap_or_default(),
                if d.detail.is_empty() { d.summary } else { d.detail },
            )),
            None => Ok(()),
        }
    }

    fn parent_of(&self, attributes: &DynamicValue) -> Option<String> {
        let attr = self.mapper.parent_attribute()?;
        attributes
            .get_string(&AttributePath::new(attr))
            .ok()
            .filter(|s| !s.is_empty())
    }

    fn finish(&self, response: &M::Response, parent: Option<String>) -> Result<ResourceState> {
        let mut attributes = self.schema.normalize_state(self.mapper.flatten(response));
        if let (Some(attr), Some(parent)) = (self.mapper.parent_attribute(), parent) {
            attributes.set_string(&AttributePath::new(attr), parent)?;
        }
        Ok(ResourceState::new(self.mapper.identity(response), attributes))
    }

    fn wrap(&self, operation: Operation, identity: &str, err: RemoteError) -> TfplugError {
        match err {
            RemoteError::NotFound => TfplugError::RemoteNotFound {
                operation: operation.as_str(),
                kind: self.kind.clone(),
                identity: identity.to_string(),
            },
            source => TfplugError::Remote {
                operation: operation.as_str(),
                kind: self.kind.clone(),
                identity: identity.to_string(),
                source,
            },
        }
    }

    /// Runs one remote call bounded by the operation timeout and the
    /// context deadline, racing context cancellation
    async fn call<T, F>(&self, ctx: &Context, operation: Operation, fut: F) -> RemoteResult<T>
    where
        F: Future<Output = RemoteResult<T>>,
    {
        let mut limit = self.policy.timeouts.for_operation(operation);
        if let Some(remaining) = ctx.remaining() {
            limit = limit.min(remaining);
        }
        if ctx.is_cancelled() {
            return Err(cancellation(ctx, limit));
        }

        tokio::select! {
            biased;
            result = tokio::time::timeout(limit, fut) => {
                result.unwrap_or(Err(RemoteError::Timeout(limit)))
            }
            _ = ctx.cancelled() => Err(cancellation(ctx, limit)),
        }
    }
}

// A context that ran out of time is a timeout, not a cancellation
fn cancellation(ctx: &Context, limit: Duration) -> RemoteError {
    match ctx.remaining() {
        Some(remaining) if remaining.is_zero() => RemoteError::Timeout(limit),
        _ => RemoteError::Cancelled,
    }
}

fn error_response(err: &TfplugError) -> Vec<Diagnostic> {
    vec![Diagnostic::from(err)]
}

#[async_trait]
impl<M, A> Resource for Controller<M, A>
where
    M: Mapper + 'static,
    A: RemoteApi<Request = M::Request, Response = M::Response> + 'static,
{
    fn type_name(&self) -> &str {
        &self.kind
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = self.schema.validate_config(&request.config);
        if !has_errors(&diagnostics) {
            let data = ResourceData::new(&self.schema, &request.config);
            if let Err(e) = self.mapper.check_invariants(&data) {
                diagnostics.push(Diagnostic::from(&e));
            }
        }
        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = self.schema.validate_config(&request.config);
        if has_errors(&diagnostics) {
            return CreateResourceResponse {
                new_state: None,
                diagnostics,
            };
        }

        match Controller::create(self, &ctx, &request.config).await {
            Ok(state) => CreateResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.extend(error_response(&e));
                CreateResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        match Controller::read(self, &ctx, &request.current_state).await {
            Ok(ReadOutcome::Present(state)) => ReadResourceResponse {
                new_state: Some(state),
                diagnostics: vec![],
            },
            Ok(ReadOutcome::Unchanged) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![],
            },
            Ok(ReadOutcome::Absent) => ReadResourceResponse {
                new_state: None,
                diagnostics: vec![],
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: error_response(&e),
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = self.schema.validate_config(&request.config);
        if has_errors(&diagnostics) {
            return UpdateResourceResponse {
                new_state: Some(request.prior_state),
                diagnostics,
            };
        }

        match Controller::update(self, &ctx, &request.prior_state, &request.config).await {
            Ok(state) => UpdateResourceResponse {
                new_state: Some(state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.extend(error_response(&e));
                UpdateResourceResponse {
                    new_state: Some(request.prior_state),
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let diagnostics = match Controller::delete(self, &ctx, &request.prior_state).await {
            Ok(()) => vec![],
            Err(e) => error_response(&e),
        };
        DeleteResourceResponse { diagnostics }
    }

    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        match Controller::import(self, &ctx, &request.id).await {
            Ok(state) => ImportResourceStateResponse {
                imported: Some(state),
                diagnostics: vec![],
            },
            Err(e) => ImportResourceStateResponse {
                imported: None,
                diagnostics: error_response(&e),
            },
        }
    }
}
