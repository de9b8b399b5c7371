//! `castai_node_template`: node templates of a cluster, addressed by name

use super::{
    block_or_empty, bool_or_null, int32, int_or_null, non_empty, require_cluster,
    string_map_or_null, string_or_null, strings_or_null, CLUSTER_ID,
};
use crate::api::node_templates::{
    GpuConstraints, InstanceFamilyConstraints, Label, RebalancingConfig, Taint,
    TemplateConstraints,
};
use crate::api::{Client, NodeTemplate, NodeTemplateRequest};
use async_trait::async_trait;
use std::sync::{Arc, LazyLock};
use tfplug::defaults::StaticDefault;
use tfplug::lifecycle::RemoteResult;
use tfplug::validator::{
    Each, IntRange, IsUuid, ListLength, StringInSlice, StringNotWhitespace, StringPattern,
};
use tfplug::{
    AttributeBuilder, AttributeType, Context, Controller, Dynamic, DynamicValue, LifecyclePolicy,
    Mapper, NestedBlock, RemoteApi, ResourceData, Schema, SchemaBuilder, TfplugError,
};

pub const KIND: &str = "castai_node_template";

pub const ARCH_AMD64: &str = "amd64";
pub const ARCH_ARM64: &str = "arm64";

static NO_SCHEDULE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("^NoSchedule$").expect("Invalid taint effect regex"));

pub type NodeTemplateResource = Controller<NodeTemplateMapper, NodeTemplateApi>;

pub fn resource(client: Client, schema: Arc<Schema>) -> NodeTemplateResource {
    Controller::new(KIND, schema, NodeTemplateMapper, NodeTemplateApi::new(client))
        .with_policy(LifecyclePolicy::default())
}

fn label_block() -> tfplug::schema::Block {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("key", AttributeType::String)
                .required()
                .validator(StringNotWhitespace::create())
                .description("Label key to be added to nodes created from this template.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("value", AttributeType::String)
                .required()
                .validator(StringNotWhitespace::create())
                .description("Label value to be added to nodes created from this template.")
                .build(),
        )
        .deprecated(
            "Remove the use of `custom_label` field. The custom labels should be set through the `custom_labels` field.",
        )
        .description("Custom label key/value to be added to nodes created from this template.")
        .build_block()
}

fn taint_block() -> tfplug::schema::Block {
    let effect = AttributeBuilder::new("effect", AttributeType::String)
        .optional()
        .computed()
        .validator(StringPattern::create(
            NO_SCHEDULE.clone(),
            "effect must be NoSchedule",
        ))
        .description(
            "Effect of a taint to be added to nodes created from this template. The effect must always be NoSchedule.",
        );

    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("key", AttributeType::String)
                .required()
                .validator(StringNotWhitespace::create())
                .description("Key of a taint to be added to nodes created from this template.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("value", AttributeType::String)
                .required()
                .validator(StringNotWhitespace::create())
                .description("Value of a taint to be added to nodes created from this template.")
                .build(),
        )
        .attribute(effect.build())
        .build_block()
}

fn string_list(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::list_of(AttributeType::String))
        .optional()
        .description(description)
        .build()
}

fn optional_int(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::Int)
        .optional()
        .description(description)
        .build()
}

fn defaulted_bool(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::Bool)
        .optional()
        .default(StaticDefault::bool(false))
        .description(description)
        .build()
}

fn constraints_block() -> tfplug::schema::Block {
    let instance_families = SchemaBuilder::new()
        .attribute(string_list("include", "Instance families to include when filtering (excludes all other families)."))
        .attribute(string_list("exclude", "Instance families to exclude when filtering (includes all other families)."))
        .build_block();

    let gpu = SchemaBuilder::new()
        .attribute(string_list("manufacturers", "Manufacturers of the gpus to select - NVIDIA, AMD."))
        .attribute(string_list("include_names", "Names of the GPUs to include."))
        .attribute(string_list("exclude_names", "Names of the GPUs to exclude."))
        .attribute(optional_int("min_count", "Min GPU count for the instance type to have."))
        .attribute(optional_int("max_count", "Max GPU count for the instance type to have."))
        .build_block();

    SchemaBuilder::new()
        .attribute(defaulted_bool("spot", "Spot instance constraint - true only spot, false only on-demand."))
        .attribute(defaulted_bool(
            "use_spot_fallbacks",
            "Spot instance fallback constraint - when true, on-demand instances will be created, when spots are unavailable.",
        ))
        .attribute(defaulted_bool(
            "storage_optimized",
            "Storage optimized instance constraint - will only pick storage optimized nodes if true.",
        ))
        .attribute(defaulted_bool(
            "compute_optimized",
            "Compute optimized instance constraint - will only pick compute optimized nodes if true.",
        ))
        .attribute(
            AttributeBuilder::new("fallback_restore_rate_seconds", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(0))
                .description("Fallback restore rate in seconds: how much time should pass before spot fallback should be attempted to be restored to real spot.")
                .build(),
        )
        .attribute(optional_int("min_cpu", "Min CPU cores per node."))
        .attribute(optional_int("max_cpu", "Max CPU cores per node."))
        .attribute(optional_int("min_memory", "Min Memory (Mib) per node."))
        .attribute(optional_int("max_memory", "Max Memory (Mib) per node."))
        .attribute(
            AttributeBuilder::new("architectures", AttributeType::list_of(AttributeType::String))
                .optional()
                .computed()
                .default(StaticDefault::list(vec![Dynamic::from(ARCH_AMD64)]))
                .validator(ListLength::between(1, 2))
                .validator(Each::create(StringInSlice::create(&[ARCH_AMD64, ARCH_ARM64])))
                .description("List of acceptable instance CPU architectures, the default is amd64. Allowed values: amd64, arm64.")
                .build(),
        )
        .block(NestedBlock::list("instance_families", instance_families).max_items(1))
        .block(NestedBlock::list("gpu", gpu).max_items(1))
        .build_block()
}

pub fn schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("CAST AI node template resource to manage node templates")
        .attribute(
            AttributeBuilder::new(CLUSTER_ID, AttributeType::String)
                .required()
                .force_new()
                .validator(IsUuid::create())
                .description("CAST AI cluster id.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .force_new()
                .validator(StringNotWhitespace::create())
                .description("Name of the node template.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("configuration_id", AttributeType::String)
                .optional()
                .computed()
                .validator(IsUuid::create())
                .description("CAST AI node configuration id to be used for node template.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("should_taint", AttributeType::Bool)
                .optional()
                .description("Marks whether the templated nodes will have a taint.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("rebalancing_config_min_nodes", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(0))
                .validator(IntRange::at_least(0))
                .description("Minimum nodes that will be kept when rebalancing nodes using this node template.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("custom_instances_enabled", AttributeType::Bool)
                .optional()
                .default(StaticDefault::bool(false))
                .description("Marks whether custom instances should be used when deciding which parts of inventory are available. Custom instances are only supported in GCP.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("custom_labels", AttributeType::map_of(AttributeType::String))
                .optional()
                .description("Custom labels to be added to nodes created from this template. If the field `custom_label` is present, the value of `custom_labels` will be ignored.")
                .build(),
        )
        .block(NestedBlock::list("custom_label", label_block()).max_items(1))
        .block(NestedBlock::list("custom_taints", taint_block()))
        .block(NestedBlock::list("constraints", constraints_block()).max_items(1))
        .build()
}

pub struct NodeTemplateMapper;

impl NodeTemplateMapper {
    fn expand_constraints(data: &ResourceData<'_>) -> tfplug::Result<TemplateConstraints> {
        let instance_families = data.block("instance_families").map(|f| InstanceFamilyConstraints {
            include: f.get_string_list("include").explicit(),
            exclude: f.get_string_list("exclude").explicit(),
        });

        let gpu = match data.block("gpu") {
            Some(g) => Some(GpuConstraints {
                manufacturers: g.get_string_list("manufacturers").explicit(),
                include_names: g.get_string_list("include_names").explicit(),
                exclude_names: g.get_string_list("exclude_names").explicit(),
                min_count: int32("min_count", g.get_int("min_count"))?,
                max_count: int32("max_count", g.get_int("max_count"))?,
            }),
            None => None,
        };

        Ok(TemplateConstraints {
            spot: data.get_bool("spot").explicit(),
            use_spot_fallbacks: data.get_bool("use_spot_fallbacks").explicit(),
            fallback_restore_rate_seconds: int32(
                "fallback_restore_rate_seconds",
                data.get_int("fallback_restore_rate_seconds"),
            )?,
            storage_optimized: data.get_bool("storage_optimized").explicit(),
            compute_optimized: data.get_bool("compute_optimized").explicit(),
            min_cpu: int32("min_cpu", data.get_int("min_cpu"))?,
            max_cpu: int32("max_cpu", data.get_int("max_cpu"))?,
            min_memory: int32("min_memory", data.get_int("min_memory"))?,
            max_memory: int32("max_memory", data.get_int("max_memory"))?,
            architectures: data.get_string_list("architectures").explicit(),
            instance_families,
            gpu,
        })
    }

    fn flatten_constraints(c: &TemplateConstraints) -> Dynamic {
        let instance_families = c.instance_families.as_ref().map(|f| {
            Dynamic::object([
                ("include", strings_or_null(f.include.as_ref())),
                ("exclude", strings_or_null(f.exclude.as_ref())),
            ])
        });
        let gpu = c.gpu.as_ref().map(|g| {
            Dynamic::object([
                ("manufacturers", strings_or_null(g.manufacturers.as_ref())),
                ("include_names", strings_or_null(g.include_names.as_ref())),
                ("exclude_names", strings_or_null(g.exclude_names.as_ref())),
                ("min_count", int_or_null(g.min_count)),
                ("max_count", int_or_null(g.max_count)),
            ])
        });

        Dynamic::object([
            ("spot", bool_or_null(c.spot)),
            ("use_spot_fallbacks", bool_or_null(c.use_spot_fallbacks)),
            ("storage_optimized", bool_or_null(c.storage_optimized)),
            ("compute_optimized", bool_or_null(c.compute_optimized)),
            (
                "fallback_restore_rate_seconds",
                int_or_null(c.fallback_restore_rate_seconds),
            ),
            ("min_cpu", int_or_null(c.min_cpu)),
            ("max_cpu", int_or_null(c.max_cpu)),
            ("min_memory", int_or_null(c.min_memory)),
            ("max_memory", int_or_null(c.max_memory)),
            ("architectures", strings_or_null(c.architectures.as_ref())),
            ("instance_families", block_or_empty(instance_families)),
            ("gpu", block_or_empty(gpu)),
        ])
    }
}

impl Mapper for NodeTemplateMapper {
    type Request = NodeTemplateRequest;
    type Response = NodeTemplate;

    fn expand(&self, data: &ResourceData<'_>) -> tfplug::Result<NodeTemplateRequest> {
        let custom_label = data.block("custom_label").map(|label| Label {
            key: label.get_string("key").explicit(),
            value: label.get_string("value").explicit(),
        });
        // The deprecated single label wins over the map
        let custom_labels = match custom_label {
            Some(_) => None,
            None => data.get_string_map("custom_labels").explicit(),
        };

        let custom_taints = non_empty(
            data.blocks("custom_taints")
                .iter()
                .map(|taint| Taint {
                    key: taint.get_string("key").explicit(),
                    value: taint.get_string("value").explicit(),
                    effect: None,
                })
                .collect(),
        );

        let constraints = match data.block("constraints") {
            Some(c) => Some(Self::expand_constraints(&c)?),
            None => None,
        };

        let rebalancing_config = int32(
            "rebalancing_config_min_nodes",
            data.get_int("rebalancing_config_min_nodes"),
        )?
        .map(|min_nodes| RebalancingConfig {
            min_nodes: Some(min_nodes),
        });

        Ok(NodeTemplateRequest {
            name: data.get_string("name").explicit(),
            configuration_id: data.get_string("configuration_id").explicit(),
            should_taint: data.get_bool("should_taint").explicit(),
            rebalancing_config,
            custom_label,
            custom_labels,
            custom_taints,
            custom_instances_enabled: data.get_bool("custom_instances_enabled").explicit(),
            constraints,
        })
    }

    fn flatten(&self, template: &NodeTemplate) -> DynamicValue {
        let custom_label = template.custom_label.as_ref().map(|label| {
            Dynamic::object([
                ("key", string_or_null(label.key.as_ref())),
                ("value", string_or_null(label.value.as_ref())),
            ])
        });
        let custom_taints = template
            .custom_taints
            .iter()
            .flatten()
            .map(|taint| {
                Dynamic::object([
                    ("key", string_or_null(taint.key.as_ref())),
                    ("value", string_or_null(taint.value.as_ref())),
                    ("effect", string_or_null(taint.effect.as_ref())),
                ])
            })
            .collect();

        DynamicValue::new(Dynamic::object([
            ("name", string_or_null(template.name.as_ref())),
            (
                "configuration_id",
                string_or_null(template.configuration_id.as_ref()),
            ),
            ("should_taint", bool_or_null(template.should_taint)),
            (
                "rebalancing_config_min_nodes",
                int_or_null(template.rebalancing_config.as_ref().and_then(|r| r.min_nodes)),
            ),
            (
                "custom_instances_enabled",
                Dynamic::Bool(template.custom_instances_enabled.unwrap_or(false)),
            ),
            (
                "custom_labels",
                string_map_or_null(template.custom_labels.as_ref()),
            ),
            ("custom_label", block_or_empty(custom_label)),
            ("custom_taints", Dynamic::List(custom_taints)),
            (
                "constraints",
                block_or_empty(template.constraints.as_ref().map(Self::flatten_constraints)),
            ),
        ]))
    }

    fn identity(&self, template: &NodeTemplate) -> String {
        template.name.clone().unwrap_or_default()
    }

    fn name_of(&self, template: &NodeTemplate) -> Option<String> {
        template.name.clone()
    }

    fn check_invariants(&self, data: &ResourceData<'_>) -> tfplug::Result<()> {
        let should_taint = data.get_bool("should_taint").value().unwrap_or(false);
        if !should_taint && !data.blocks("custom_taints").is_empty() {
            return Err(TfplugError::CrossFieldInvariant(
                "should_taint must be true for the node template to have custom taints".to_string(),
            ));
        }
        Ok(())
    }

    fn parent_attribute(&self) -> Option<&'static str> {
        Some(CLUSTER_ID)
    }
}

/// Node template calls scoped to the cluster in `parent`
pub struct NodeTemplateApi {
    client: Client,
}

impl NodeTemplateApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteApi for NodeTemplateApi {
    type Request = NodeTemplateRequest;
    type Response = NodeTemplate;

    async fn create(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        request: &NodeTemplateRequest,
    ) -> RemoteResult<NodeTemplate> {
        let cluster_id = require_cluster(parent)?;
        Ok(self.client.node_templates().create(cluster_id, request).await?)
    }

    async fn read(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        identity: &str,
    ) -> RemoteResult<NodeTemplate> {
        let cluster_id = require_cluster(parent)?;
        self.client
            .node_templates()
            .find(cluster_id, identity)
            .await?
            .ok_or(tfplug::RemoteError::NotFound)
    }

    async fn update(
        &self,
        _ctx: &Context,
        parent: Option<&str>,
        identity: &str,
        request: &NodeTemplateRequest,
    ) -> RemoteResult<NodeTemplate> {
        let cluster_id = require_cluster(parent)?;
        Ok(self
            .client
            .node_templates()
            .update(cluster_id, identity, request)
            .await?)
    }

    async fn delete(&self, _ctx: &Context, parent: Option<&str>, identity: &str) -> RemoteResult<()> {
        let cluster_id = require_cluster(parent)?;
        Ok(self.client.node_templates().delete(cluster_id, identity).await?)
    }

    async fn list(&self, _ctx: &Context, parent: Option<&str>) -> RemoteResult<Vec<NodeTemplate>> {
        let cluster_id = require_cluster(parent)?;
        Ok(self.client.node_templates().list(cluster_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tfplug::AttributePath;

    const CLUSTER: &str = "c7d9f2a0-5b4e-4c1a-8f3d-2e6b7a9c0d1e";
    const CONFIGURATION: &str = "8e0b1a5c-3c8d-4a4b-9d4e-1f2a3b4c5d6e";

    fn remote_template() -> NodeTemplate {
        NodeTemplate {
            name: Some("gpu".to_string()),
            configuration_id: Some(CONFIGURATION.to_string()),
            should_taint: Some(true),
            rebalancing_config: Some(RebalancingConfig { min_nodes: Some(2) }),
            custom_labels: Some(HashMap::from([("team".to_string(), "ml".to_string())])),
            custom_taints: Some(vec![Taint {
                key: Some("dedicated".to_string()),
                value: Some("gpu".to_string()),
                effect: None,
            }]),
            custom_instances_enabled: Some(false),
            constraints: Some(TemplateConstraints {
                spot: Some(true),
                use_spot_fallbacks: Some(true),
                fallback_restore_rate_seconds: Some(300),
                storage_optimized: Some(false),
                compute_optimized: Some(false),
                min_cpu: Some(4),
                max_cpu: Some(32),
                architectures: Some(vec![ARCH_ARM64.to_string()]),
                gpu: Some(GpuConstraints {
                    manufacturers: Some(vec!["NVIDIA".to_string()]),
                    min_count: Some(1),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn config_from(template: &NodeTemplate) -> DynamicValue {
        let mut config = NodeTemplateMapper.flatten(template);
        config
            .set_string(&AttributePath::new(CLUSTER_ID), CLUSTER)
            .unwrap();
        config
    }

    #[test]
    fn schema_is_well_formed() {
        schema().check_definition().unwrap();
    }

    #[test]
    fn flatten_then_expand_round_trips() {
        let schema = schema();
        let remote = remote_template();
        let config = config_from(&remote);

        let request = NodeTemplateMapper
            .expand(&ResourceData::new(&schema, &config))
            .unwrap();

        assert_eq!(request.name, remote.name);
        assert_eq!(request.configuration_id, remote.configuration_id);
        assert_eq!(request.should_taint, remote.should_taint);
        assert_eq!(request.rebalancing_config, remote.rebalancing_config);
        assert_eq!(request.custom_labels, remote.custom_labels);
        assert_eq!(request.custom_taints, remote.custom_taints);
        assert_eq!(request.custom_instances_enabled, remote.custom_instances_enabled);
        assert_eq!(request.constraints, remote.constraints);
    }

    #[test]
    fn flattened_state_has_no_diff_against_itself() {
        let schema = schema();
        let state = schema.normalize_state(config_from(&remote_template()));
        assert!(tfplug::plan::diff(&schema, &state, &state).is_empty());
    }

    #[test]
    fn custom_label_wins_over_custom_labels() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("t1")),
            ("custom_labels", Dynamic::string_map([("a", "b")])),
            (
                "custom_label",
                Dynamic::List(vec![Dynamic::object([
                    ("key", Dynamic::from("k")),
                    ("value", Dynamic::from("v")),
                ])]),
            ),
        ]));

        let request = NodeTemplateMapper
            .expand(&ResourceData::new(&schema, &config))
            .unwrap();

        assert_eq!(
            request.custom_label,
            Some(Label {
                key: Some("k".to_string()),
                value: Some("v".to_string()),
            })
        );
        assert!(request.custom_labels.is_none());
    }

    #[test]
    fn defaults_stay_out_of_request() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("t1")),
            ("constraints", Dynamic::List(vec![Dynamic::object([("spot", Dynamic::from(false))])])),
        ]));
        let data = ResourceData::new(&schema, &config);

        let request = NodeTemplateMapper.expand(&data).unwrap();
        let constraints = request.constraints.unwrap();

        // explicitly configured zero value is still sent
        assert_eq!(constraints.spot, Some(false));
        assert!(constraints.use_spot_fallbacks.is_none());
        assert!(constraints.architectures.is_none());
        assert!(constraints.min_cpu.is_none());
        assert!(request.rebalancing_config.is_none());
        assert!(request.custom_instances_enabled.is_none());
        assert!(request.should_taint.is_none());
        assert_eq!(
            data.get_int("rebalancing_config_min_nodes"),
            tfplug::Presence::Defaulted(0)
        );
    }

    #[test]
    fn removing_should_taint_or_labels_is_a_change() {
        let schema = schema();
        let remote = NodeTemplate {
            custom_taints: None,
            ..remote_template()
        };
        let state = schema.normalize_state(config_from(&remote));
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("gpu")),
            ("configuration_id", Dynamic::from(CONFIGURATION)),
            ("rebalancing_config_min_nodes", Dynamic::from(2)),
        ]));

        let diff = tfplug::plan::diff(&schema, &state, &config);
        assert!(diff.changed.contains("should_taint"));
        assert!(diff.changed.contains("custom_labels"));
        assert!(diff.requires_replace.is_empty());

        let data = ResourceData::new(&schema, &config);
        let request = NodeTemplateMapper
            .expand(&data.restoring_defaults(&diff.changed))
            .unwrap();
        assert_eq!(request.should_taint, Some(false));
        assert_eq!(request.custom_labels, Some(HashMap::new()));
        assert!(request.custom_instances_enabled.is_none());
    }

    #[test]
    fn removed_min_nodes_is_sent_as_default() {
        let schema = schema();
        let state = schema.normalize_state(config_from(&remote_template()));
        let mut config = config_from(&remote_template());
        config
            .set_value(&AttributePath::new("rebalancing_config_min_nodes"), Dynamic::Null)
            .unwrap();

        let diff = tfplug::plan::diff(&schema, &state, &config);
        assert!(diff.changed.contains("rebalancing_config_min_nodes"));

        let data = ResourceData::new(&schema, &config);
        let request = NodeTemplateMapper
            .expand(&data.restoring_defaults(&diff.changed))
            .unwrap();
        assert_eq!(
            request.rebalancing_config,
            Some(RebalancingConfig { min_nodes: Some(0) })
        );
    }

    #[test]
    fn taints_require_should_taint() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("t1")),
            (
                "custom_taints",
                Dynamic::List(vec![Dynamic::object([
                    ("key", Dynamic::from("k")),
                    ("value", Dynamic::from("v")),
                ])]),
            ),
        ]));

        let err = NodeTemplateMapper
            .check_invariants(&ResourceData::new(&schema, &config))
            .unwrap_err();
        assert!(matches!(err, TfplugError::CrossFieldInvariant(_)));
    }

    #[test]
    fn architectures_are_validated() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("t1")),
            (
                "constraints",
                Dynamic::List(vec![Dynamic::object([(
                    "architectures",
                    Dynamic::string_list(["amd64", "arm64", "riscv"]),
                )])]),
            ),
        ]));

        let diagnostics = schema.validate_config(&config);
        assert_eq!(diagnostics.iter().filter(|d| d.is_error()).count(), 2);
    }

    #[test]
    fn taint_effect_must_be_no_schedule() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            (CLUSTER_ID, Dynamic::from(CLUSTER)),
            ("name", Dynamic::from("t1")),
            ("should_taint", Dynamic::from(true)),
            (
                "custom_taints",
                Dynamic::List(vec![Dynamic::object([
                    ("key", Dynamic::from("k")),
                    ("value", Dynamic::from("v")),
                    ("effect", Dynamic::from("NoExecute")),
                ])]),
            ),
        ]));

        let diagnostics = schema.validate_config(&config);
        assert!(diagnostics.iter().any(|d| d.is_error()
            && d.attribute.as_ref().map(|p| p.to_string()).as_deref()
                == Some("custom_taints[0].effect")));
    }
}
