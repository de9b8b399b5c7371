#![allow(clippy::disallowed_methods)]
//! End-to-end lifecycle through the provider against a mock CAST AI API

use castai::CastaiProvider;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use tfplug::data_source::ReadDataSourceRequest;
use tfplug::provider::ConfigureProviderRequest;
use tfplug::resource::{
    CreateResourceRequest, DeleteResourceRequest, ImportResourceStateRequest, ReadResourceRequest,
    UpdateResourceRequest,
};
use tfplug::types::has_errors;
use tfplug::{AttributePath, Context, Dynamic, DynamicValue, Provider, Resource, ResourceState};
use tokio_test::assert_ok;

fn cluster_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn configured_provider(server: &ServerGuard) -> CastaiProvider {
    let mut provider = assert_ok!(CastaiProvider::new());
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                config: DynamicValue::new(Dynamic::object([
                    ("api_url", Dynamic::String(server.url())),
                    ("api_token", Dynamic::from("test-api-token")),
                ])),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics), "{:?}", response.diagnostics);
    provider
}

async fn resource(provider: &CastaiProvider, kind: &str) -> Box<dyn Resource> {
    assert_ok!(provider.create_resource(kind).await)
}

fn template_config(cluster: &str, extra: Vec<(&str, Dynamic)>) -> DynamicValue {
    let mut entries = vec![
        ("cluster_id", Dynamic::from(cluster)),
        ("name", Dynamic::from("gpu")),
    ];
    entries.extend(extra);
    DynamicValue::new(Dynamic::object(entries))
}

fn configuration_config(cluster: &str, extra: Vec<(&str, Dynamic)>) -> DynamicValue {
    let mut entries = vec![
        ("cluster_id", Dynamic::from(cluster)),
        ("name", Dynamic::from("spot")),
        ("subnets", Dynamic::string_list(["subnet-1"])),
    ];
    entries.extend(extra);
    DynamicValue::new(Dynamic::object(entries))
}

fn string_attr(state: &ResourceState, name: &str) -> String {
    state
        .attributes
        .get_string(&AttributePath::new(name))
        .unwrap()
}

#[tokio::test]
async fn node_template_create_sends_one_request_and_stores_the_echo() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();
    let configuration = cluster_id();

    let create = server
        .mock(
            "POST",
            format!("/v1/kubernetes/clusters/{}/node-templates", cluster).as_str(),
        )
        .match_header("x-api-key", "test-api-token")
        .match_body(Matcher::PartialJson(json!({
            "name": "gpu",
            "configurationId": configuration,
            "shouldTaint": true,
            "customTaints": [{"key": "dedicated", "value": "gpu"}],
        })))
        .with_status(200)
        .with_body(
            json!({
                "name": "gpu",
                "configurationId": configuration,
                "shouldTaint": true,
                "customTaints": [{"key": "dedicated", "value": "gpu", "effect": "NoSchedule"}],
                "rebalancingConfig": {"minNodes": 0},
                "customInstancesEnabled": false
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let templates = resource(&provider, "castai_node_template").await;

    let response = templates
        .create(
            Context::new(),
            CreateResourceRequest {
                config: template_config(
                    &cluster,
                    vec![
                        ("configuration_id", Dynamic::String(configuration.clone())),
                        ("should_taint", Dynamic::from(true)),
                        (
                            "custom_taints",
                            Dynamic::List(vec![Dynamic::object([
                                ("key", Dynamic::from("dedicated")),
                                ("value", Dynamic::from("gpu")),
                            ])]),
                        ),
                    ],
                ),
            },
        )
        .await;

    create.assert_async().await;
    assert!(!has_errors(&response.diagnostics), "{:?}", response.diagnostics);

    let state = response.new_state.unwrap();
    assert_eq!(state.id, "gpu");
    assert_eq!(string_attr(&state, "cluster_id"), cluster);
    assert_eq!(string_attr(&state, "configuration_id"), configuration);
    assert!(state
        .attributes
        .get_bool(&AttributePath::new("should_taint"))
        .unwrap());
    assert_eq!(
        state
            .attributes
            .get_string(&AttributePath::new("custom_taints").index(0).attribute("effect"))
            .unwrap(),
        "NoSchedule"
    );
}

#[tokio::test]
async fn taints_without_should_taint_make_no_call() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();

    let any = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let templates = resource(&provider, "castai_node_template").await;

    let response = templates
        .create(
            Context::new(),
            CreateResourceRequest {
                config: template_config(
                    &cluster,
                    vec![(
                        "custom_taints",
                        Dynamic::List(vec![Dynamic::object([
                            ("key", Dynamic::from("k")),
                            ("value", Dynamic::from("v")),
                        ])]),
                    )],
                ),
            },
        )
        .await;

    any.assert_async().await;
    assert!(response.new_state.is_none());
    assert!(has_errors(&response.diagnostics));
    assert_eq!(response.diagnostics[0].summary, "Invalid attribute combination");
}

#[tokio::test]
async fn deleted_template_reads_as_absent() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();

    let _list = server
        .mock(
            "GET",
            format!("/v1/kubernetes/clusters/{}/node-templates", cluster).as_str(),
        )
        .with_status(200)
        .with_body(r#"{"items": [{"template": {"name": "other"}}]}"#)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let templates = resource(&provider, "castai_node_template").await;

    let prior = ResourceState::new("gpu", template_config(&cluster, vec![]));
    let response = templates
        .read(
            Context::new(),
            ReadResourceRequest {
                current_state: prior,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn update_without_changes_makes_no_call() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();

    let put = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let templates = resource(&provider, "castai_node_template").await;
    let schema = templates.schema();

    let prior = ResourceState::new(
        "gpu",
        schema.normalize_state(template_config(
            &cluster,
            vec![
                ("rebalancing_config_min_nodes", Dynamic::from(0)),
                ("custom_instances_enabled", Dynamic::from(false)),
            ],
        )),
    );
    let response = templates
        .update(
            Context::new(),
            UpdateResourceRequest {
                prior_state: prior.clone(),
                config: template_config(&cluster, vec![]),
            },
        )
        .await;

    put.assert_async().await;
    assert!(!has_errors(&response.diagnostics), "{:?}", response.diagnostics);
    assert_eq!(response.new_state, Some(prior));
}

#[tokio::test]
async fn node_configuration_import_by_name() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();
    let id = cluster_id();
    let body = json!({
        "id": id,
        "name": "spot",
        "version": 1,
        "default": false,
        "diskCpuRatio": 25,
        "minDiskSize": 100,
        "subnets": ["subnet-1"],
    });

    let list = server
        .mock(
            "GET",
            format!("/v1/kubernetes/clusters/{}/node-configurations", cluster).as_str(),
        )
        .with_status(200)
        .with_body(json!({"items": [body]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let get = server
        .mock(
            "GET",
            format!("/v1/kubernetes/clusters/{}/node-configurations/{}", cluster, id).as_str(),
        )
        .with_status(200)
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let configurations = resource(&provider, "castai_node_configuration").await;

    let response = configurations
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                id: format!("{}/spot", cluster),
            },
        )
        .await;

    list.assert_async().await;
    get.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.imported.unwrap();
    assert_eq!(state.id, id);
    assert_eq!(string_attr(&state, "cluster_id"), cluster);
    assert_eq!(string_attr(&state, "name"), "spot");
    assert_eq!(
        state
            .attributes
            .get_int(&AttributePath::new("min_disk_size"))
            .unwrap(),
        100
    );
}

#[tokio::test]
async fn removed_disk_cpu_ratio_returns_to_default() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();
    let id = cluster_id();

    let update = server
        .mock(
            "POST",
            format!("/v1/kubernetes/clusters/{}/node-configurations/{}", cluster, id).as_str(),
        )
        .match_body(Matcher::PartialJson(json!({"diskCpuRatio": 25})))
        .with_status(200)
        .with_body(
            json!({
                "id": id,
                "name": "spot",
                "version": 2,
                "diskCpuRatio": 25,
                "minDiskSize": 100,
                "subnets": ["subnet-1"],
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let configurations = resource(&provider, "castai_node_configuration").await;
    let schema = configurations.schema();

    let prior = ResourceState::new(
        id.clone(),
        schema.normalize_state(configuration_config(&cluster, vec![
            ("disk_cpu_ratio", Dynamic::from(35)),
            ("min_disk_size", Dynamic::from(100)),
            ("version", Dynamic::from(1)),
        ])),
    );

    let response = configurations
        .update(
            Context::new(),
            UpdateResourceRequest {
                prior_state: prior,
                config: configuration_config(&cluster, vec![]),
            },
        )
        .await;

    update.assert_async().await;
    assert!(!has_errors(&response.diagnostics), "{:?}", response.diagnostics);
    let state = response.new_state.unwrap();
    assert_eq!(
        state
            .attributes
            .get_int(&AttributePath::new("disk_cpu_ratio"))
            .unwrap(),
        25
    );
}

#[tokio::test]
async fn deleting_the_default_configuration_succeeds() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();
    let id = cluster_id();

    let delete = server
        .mock(
            "DELETE",
            format!("/v1/kubernetes/clusters/{}/node-configurations/{}", cluster, id).as_str(),
        )
        .with_status(400)
        .with_body(r#"{"message": "cannot delete default configuration"}"#)
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let configurations = resource(&provider, "castai_node_configuration").await;

    let prior = ResourceState::new(
        id.clone(),
        DynamicValue::new(Dynamic::object([("cluster_id", Dynamic::String(cluster))])),
    );
    let response = configurations
        .delete(Context::new(), DeleteResourceRequest { prior_state: prior })
        .await;

    delete.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
}

#[tokio::test]
async fn default_configuration_lifecycle() {
    let mut server = Server::new_async().await;
    let cluster = cluster_id();
    let id = cluster_id();
    let path = format!("/v1/kubernetes/clusters/{}/node-configurations/{}", cluster, id);

    let set_default = server
        .mock("POST", format!("{}/default", path).as_str())
        .with_status(200)
        .with_body(json!({"id": id, "name": "default", "default": true}).to_string())
        .expect(1)
        .create_async()
        .await;
    let missing = server
        .mock("GET", path.as_str())
        .with_status(404)
        .with_body(r#"{"message": "not found"}"#)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let defaults = resource(&provider, "castai_node_configuration_default").await;

    let created = defaults
        .create(
            Context::new(),
            CreateResourceRequest {
                config: DynamicValue::new(Dynamic::object([
                    ("cluster_id", Dynamic::String(cluster.clone())),
                    ("configuration_id", Dynamic::String(id.clone())),
                ])),
            },
        )
        .await;
    set_default.assert_async().await;
    assert!(!has_errors(&created.diagnostics), "{:?}", created.diagnostics);
    let state = created.new_state.unwrap();
    assert_eq!(string_attr(&state, "configuration_id"), id);

    // Protected kinds keep their state when the object disappears
    let read = defaults
        .read(
            Context::new(),
            ReadResourceRequest {
                current_state: state.clone(),
            },
        )
        .await;
    missing.assert_async().await;
    assert_eq!(read.new_state, Some(state.clone()));

    let deleted = defaults
        .delete(Context::new(), DeleteResourceRequest { prior_state: state })
        .await;
    delete.assert_async().await;
    assert!(deleted.diagnostics.is_empty());
}

#[tokio::test]
async fn eks_settings_are_rendered_without_calls() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let provider = configured_provider(&server).await;
    let settings = assert_ok!(provider.create_data_source("castai_eks_settings").await);

    let response = settings
        .read(
            Context::new(),
            ReadDataSourceRequest {
                config: DynamicValue::new(Dynamic::object([
                    ("account_id", Dynamic::from("123456789012")),
                    ("region", Dynamic::from("eu-central-1")),
                    ("vpc", Dynamic::from("vpc-1")),
                    ("cluster", Dynamic::from("prod")),
                ])),
            },
        )
        .await;

    any.assert_async().await;
    let state = response.state.unwrap();
    assert_eq!(state.id, "eks-123456789012-vpc-1-eu-central-1-prod");
    assert!(string_attr(&state, "iam_policy_json").contains("123456789012"));
}
