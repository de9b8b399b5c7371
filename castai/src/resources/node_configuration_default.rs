//! `castai_node_configuration_default`: marks one node configuration as the
//! cluster default. The API cannot unset a default, so deleting this
//! resource only drops it from state.

use super::{require_cluster, CLUSTER_ID};
use crate::api::{Client, NodeConfiguration};
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::lifecycle::RemoteResult;
use tfplug::validator::IsUuid;
use tfplug::{
    AttributeBuilder, AttributeType, Context, Controller, Dynamic, DynamicValue, LifecyclePolicy,
    Mapper, RemoteApi, RemoteError, ResourceData, Schema, SchemaBuilder, TfplugError,
};

pub const KIND: &str = "castai_node_configuration_default";

pub type NodeConfigurationDefaultResource =
    Controller<NodeConfigurationDefaultMapper, NodeConfigurationDefaultApi>;

pub fn resource(client: Client, schema: Arc<Schema>) -> NodeConfigurationDefaultResource {
    Controller::new(
        KIND,
        schema,
        NodeConfigurationDefaultMapper,
        NodeConfigurationDefaultApi::new(client),
    )
    .with_policy(LifecyclePolicy {
        protected: true,
        ..LifecyclePolicy::default()
    })
}

pub fn schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Sets the default node configuration of a cluster")
        .attribute(
            AttributeBuilder::new(CLUSTER_ID, AttributeType::String)
                .required()
                .force_new()
                .validator(IsUuid::create())
                .description("CAST AI cluster id")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("configuration_id", AttributeType::String)
                .required()
                .validator(IsUuid::create())
                .description("Id of the node configuration")
                .build(),
        )
        .build()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConfigurationRequest {
    pub configuration_id: String,
}

pub struct NodeConfigurationDefaultMapper;

impl Mapper for NodeConfigurationDefaultMapper {
    type Request = DefaultConfigurationRequest;
    type Response = NodeConfiguration;

    fn expand(&self, data: &ResourceData<'_>) -> tfplug::Result<DefaultConfigurationRequest> {
        let configuration_id = data
            .get_string("configuration_id")
            .explicit()
            .ok_or_else(|| TfplugError::validation("configuration_id", "value is required"))?;
        Ok(DefaultConfigurationRequest { configuration_id })
    }

    fn flatten(&self, cfg: &NodeConfiguration) -> DynamicValue {
        // A configuration that lost its default flag reads back as unset
        let configuration_id = if cfg.default {
            Dynamic::String(cfg.id.clone())
        } else {
            Dynamic::Null
        };
        DynamicValue::new(Dynamic::object([("configuration_id", configuration_id)]))
    }

    fn identity(&self, cfg: &NodeConfiguration) -> String {
        cfg.id.clone()
    }

    fn name_of(&self, cfg: &NodeConfiguration) -> Option<String> {
        Some(cfg.name.clone())
    }

    fn parent_attribute(&self) -> Option<&'static str> {
        Some(CLUSTER_ID)
    }
}

pub struct NodeConfigurationDefaultApi {
    client: Client,
}

impl NodeConfigurationDefaultApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn set_default(
        &self,
        parent: Option<&str>,
        request: &DefaultConfigurationRequest,
    ) -> RemoteResult<NodeConfiguration> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_configurations()
            .set_default(cluster_id, &request.configuration_id)
            .await?)
    }
}

#[async_trait]
impl RemoteApi for NodeConfigurationDefaultApi {
    type Request = DefaultConfigurationRequest;
    type Response = NodeConfiguration;

    async fn create(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        request: &DefaultConfigurationRequest,
    ) -> RemoteResult<NodeConfiguration> {
        self.set_default(parent, request).await
    }

    async fn read(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        identity: &str,
    ) -> RemoteResult<NodeConfiguration> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_configurations()
            .get(cluster_id, identity)
            .await?)
    }

    async fn update(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        _identity: &str,
        request: &DefaultConfigurationRequest,
    ) -> RemoteResult<NodeConfiguration> {
        self.set_default(parent, request).await
    }

    async fn delete(&self, _ctx: &Context, _parent: Option<&str>, identity: &str) -> RemoteResult<()> {
        Err(RemoteError::Protected(format!(
            "node configuration {} stays the cluster default",
            identity
        )))
    }

    async fn list(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
    ) -> RemoteResult<Vec<NodeConfiguration>> {
        let cluster_id = require_cluster(parent)?;
        Ok(self.client.node_configurations().list(cluster_id).await?)
    }
}
