//! `castai_node_configuration`: per-cluster node provisioning settings

use super::{
    block_or_empty, int32, int_or_null, non_empty, require_cluster, string_map_or_null,
    string_or_null, CLUSTER_ID,
};
use crate::api::node_configurations::{AksConfig, EksConfig, KopsConfig};
use crate::api::{Client, NodeConfiguration, NodeConfigurationRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::defaults::StaticDefault;
use tfplug::lifecycle::RemoteResult;
use tfplug::validator::{IntRange, IsUuid, ListLength, StringNotWhitespace};
use tfplug::{
    AttributeBuilder, AttributeType, Context, Controller, Dynamic, DynamicValue, Mapper,
    NestedBlock, RemoteApi, ResourceData, Schema, SchemaBuilder, TfplugError,
};

pub const KIND: &str = "castai_node_configuration";

pub type NodeConfigurationResource = Controller<NodeConfigurationMapper, NodeConfigurationApi>;

pub fn resource(client: Client, schema: Arc<Schema>) -> NodeConfigurationResource {
    Controller::new(
        KIND,
        schema,
        NodeConfigurationMapper,
        NodeConfigurationApi::new(client),
    )
}

fn optional_string(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .optional()
        .description(description)
        .build()
}

pub fn schema() -> Schema {
    let eks = SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("instance_profile_arn", AttributeType::String)
                .required()
                .validator(StringNotWhitespace::create())
                .description("Cluster's instance profile ARN used for CAST provisioned nodes")
                .build(),
        )
        .attribute(optional_string("dns_cluster_ip", "IP address to use for DNS queries within the cluster"))
        .attribute(optional_string("key_pair_id", "AWS key pair ID to be used for CAST provisioned nodes"))
        .attribute(
            AttributeBuilder::new("security_groups", AttributeType::list_of(AttributeType::String))
                .optional()
                .description("Cluster's security groups configuration for CAST provisioned nodes")
                .build(),
        )
        .build_block();

    let aks = SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("max_pods_per_node", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(30))
                .validator(IntRange::between(10, 250))
                .description("Maximum number of pods that can be run on a node, which affects how many IP addresses you will need for each node")
                .build(),
        )
        .build_block();

    let kops = SchemaBuilder::new()
        .attribute(optional_string("key_pair_id", "AWS key pair ID to be used for provisioned nodes"))
        .build_block();

    SchemaBuilder::new()
        .version(0)
        .description("Create node configuration for given cluster. Node configuration reference https://docs.cast.ai/docs/node-configuration")
        .attribute(
            AttributeBuilder::new(CLUSTER_ID, AttributeType::String)
                .required()
                .force_new()
                .validator(IsUuid::create())
                .description("CAST AI cluster id")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .force_new()
                .validator(StringNotWhitespace::create())
                .description("Name of the node configuration")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("disk_cpu_ratio", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(25))
                .validator(IntRange::at_least(0))
                .description("Disk to CPU ratio. Sets the number of GiBs to be added for every CPU on the node")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("min_disk_size", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(100))
                .validator(IntRange::at_least(30))
                .description("Minimal disk size in GiB. Defaults to 100, min 30")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("subnets", AttributeType::list_of(AttributeType::String))
                .required()
                .validator(ListLength::at_least(1))
                .description("Subnet ids to be used for provisioned nodes")
                .build(),
        )
        .attribute(optional_string("image", "Image to be used while provisioning the node. If nothing is provided will be resolved to latest available image based on Kubernetes version if possible"))
        .attribute(optional_string("ssh_public_key", "SSH public key to be used for provisioned nodes"))
        .attribute(optional_string("init_script", "Init script to be run on your instance at launch"))
        .attribute(
            AttributeBuilder::new("tags", AttributeType::map_of(AttributeType::String))
                .optional()
                .description("Tags to be added on cloud instances for provisioned nodes")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("default", AttributeType::Bool)
                .computed()
                .description("Whether this is the default configuration of the cluster")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("version", AttributeType::Int)
                .computed()
                .description("Version of the node configuration")
                .build(),
        )
        .block(NestedBlock::list("eks", eks).max_items(1))
        .block(NestedBlock::list("aks", aks).max_items(1))
        .block(NestedBlock::list("kops", kops).max_items(1))
        .build()
}

pub struct NodeConfigurationMapper;

impl Mapper for NodeConfigurationMapper {
    type Request = NodeConfigurationRequest;
    type Response = NodeConfiguration;

    fn expand(&self, data: &ResourceData<'_>) -> tfplug::Result<NodeConfigurationRequest> {
        let eks = data.block("eks").map(|eks| EksConfig {
            instance_profile_arn: eks
                .get_string("instance_profile_arn")
                .explicit()
                .unwrap_or_default(),
            dns_cluster_ip: eks.get_string("dns_cluster_ip").explicit(),
            key_pair_id: eks.get_string("key_pair_id").explicit(),
            security_groups: eks
                .get_string_list("security_groups")
                .explicit()
                .unwrap_or_default(),
        });

        let aks = match data.block("aks") {
            Some(aks) => Some(AksConfig {
                max_pods_per_node: int32("max_pods_per_node", aks.get_int("max_pods_per_node"))?,
            }),
            None => None,
        };

        let kops = data.block("kops").map(|kops| KopsConfig {
            key_pair_id: kops.get_string("key_pair_id").explicit(),
        });

        Ok(NodeConfigurationRequest {
            name: data.get_string("name").explicit(),
            disk_cpu_ratio: int32("disk_cpu_ratio", data.get_int("disk_cpu_ratio"))?,
            min_disk_size: int32("min_disk_size", data.get_int("min_disk_size"))?,
            subnets: data.get_string_list("subnets").explicit().and_then(non_empty),
            image: data.get_string("image").explicit(),
            ssh_public_key: data.get_string("ssh_public_key").explicit(),
            init_script: data.get_string("init_script").explicit(),
            tags: data.get_string_map("tags").explicit(),
            eks,
            aks,
            kops,
        })
    }

    fn flatten(&self, cfg: &NodeConfiguration) -> DynamicValue {
        let eks = cfg.eks.as_ref().map(|eks| {
            Dynamic::object([
                (
                    "instance_profile_arn",
                    Dynamic::String(eks.instance_profile_arn.clone()),
                ),
                ("dns_cluster_ip", string_or_null(eks.dns_cluster_ip.as_ref())),
                ("key_pair_id", string_or_null(eks.key_pair_id.as_ref())),
                (
                    "security_groups",
                    Dynamic::string_list(eks.security_groups.iter().cloned()),
                ),
            ])
        });
        let aks = cfg
            .aks
            .as_ref()
            .map(|aks| Dynamic::object([("max_pods_per_node", int_or_null(aks.max_pods_per_node))]));
        let kops = cfg
            .kops
            .as_ref()
            .map(|kops| Dynamic::object([("key_pair_id", string_or_null(kops.key_pair_id.as_ref()))]));

        DynamicValue::new(Dynamic::object([
            ("name", Dynamic::String(cfg.name.clone())),
            ("disk_cpu_ratio", int_or_null(cfg.disk_cpu_ratio)),
            ("min_disk_size", int_or_null(cfg.min_disk_size)),
            ("subnets", Dynamic::string_list(cfg.subnets.iter().cloned())),
            ("image", string_or_null(cfg.image.as_ref())),
            ("ssh_public_key", string_or_null(cfg.ssh_public_key.as_ref())),
            ("init_script", string_or_null(cfg.init_script.as_ref())),
            ("tags", string_map_or_null(cfg.tags.as_ref())),
            ("default", Dynamic::Bool(cfg.default)),
            ("version", cfg.version.map_or(Dynamic::Null, Dynamic::Int)),
            ("eks", block_or_empty(eks)),
            ("aks", block_or_empty(aks)),
            ("kops", block_or_empty(kops)),
        ]))
    }

    fn identity(&self, cfg: &NodeConfiguration) -> String {
        cfg.id.clone()
    }

    fn name_of(&self, cfg: &NodeConfiguration) -> Option<String> {
        Some(cfg.name.clone())
    }

    fn check_invariants(&self, data: &ResourceData<'_>) -> tfplug::Result<()> {
        let providers = ["eks", "aks", "kops"]
            .into_iter()
            .filter(|name| data.is_set(name))
            .collect::<Vec<_>>();
        if providers.len() > 1 {
            return Err(TfplugError::CrossFieldInvariant(format!(
                "only one of eks, aks or kops can be configured, got {}",
                providers.join(", ")
            )));
        }
        Ok(())
    }

    fn parent_attribute(&self) -> Option<&'static str> {
        Some(CLUSTER_ID)
    }
}

/// Node configuration calls scoped to the cluster in `parent`
pub struct NodeConfigurationApi {
    client: Client,
}

impl NodeConfigurationApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteApi for NodeConfigurationApi {
    type Request = NodeConfigurationRequest;
    type Response = NodeConfiguration;

    async fn create(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        request: &NodeConfigurationRequest,
    ) -> RemoteResult<NodeConfiguration> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_configurations()
            .create(cluster_id, request)
            .await?)
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
        identity: &str,
        request: &NodeConfigurationRequest,
    ) -> RemoteResult<NodeConfiguration> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_configurations()
            .update(cluster_id, identity, request)
            .await?)
    }

    async fn delete(&self, _ctx: &Context, parent: Option<&str>, identity: &str) -> RemoteResult<()> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_configurations()
            .delete(cluster_id, identity)
            .await?)
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
