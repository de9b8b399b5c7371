//! Node template API
//!
//! Templates are addressed by name within a cluster. There is no single-item
//! GET, so lookups list the cluster's templates and match locally.

use super::common::{child_path, cluster_path, ListResponse};
use super::error::ApiError;
use super::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_taint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebalancing_config: Option<RebalancingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_taints: Option<Vec<Taint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instances_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<TemplateConstraints>,
}

/// Body of create and update calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_taint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebalancing_config: Option<RebalancingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_labels: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_taints: Option<Vec<Taint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instances_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<TemplateConstraints>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_spot_fallbacks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_restore_rate_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_optimized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_optimized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cpu: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architectures: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_families: Option<InstanceFamilyConstraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu: Option<GpuConstraints>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceFamilyConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeTemplateListItem {
    pub template: Option<NodeTemplate>,
}

pub struct NodeTemplatesApi<'a> {
    client: &'a Client,
}

impl<'a> NodeTemplatesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(cluster_id: &str) -> String {
        format!("{}/node-templates", cluster_path(cluster_id))
    }

    pub async fn list(&self, cluster_id: &str) -> Result<Vec<NodeTemplate>, ApiError> {
        let list: ListResponse<NodeTemplateListItem> =
            self.client.get(&Self::base_path(cluster_id)).await?;
        Ok(list.items.into_iter().filter_map(|i| i.template).collect())
    }

    /// Finds a template by name, or by id when the template carries one
    pub async fn find(
        &self,
        cluster_id: &str,
        name_or_id: &str,
    ) -> Result<Option<NodeTemplate>, ApiError> {
        tracing::debug!("Looking up node template {} in cluster {}", name_or_id, cluster_id);
        Ok(self.list(cluster_id).await?.into_iter().find(|t| {
            t.name.as_deref() == Some(name_or_id) || t.id.as_deref() == Some(name_or_id)
        }))
    }

    pub async fn create(
        &self,
        cluster_id: &str,
        request: &NodeTemplateRequest,
    ) -> Result<NodeTemplate, ApiError> {
        self.client.post(&Self::base_path(cluster_id), request).await
    }

    /// Updates a template in place. The name is the address and is not sent.
    pub async fn update(
        &self,
        cluster_id: &str,
        name: &str,
        request: &NodeTemplateRequest,
    ) -> Result<NodeTemplate, ApiError> {
        let body = NodeTemplateRequest {
            name: None,
            ..request.clone()
        };
        self.client
            .put(&child_path(&Self::base_path(cluster_id), name), &body)
            .await
    }

    pub async fn delete(&self, cluster_id: &str, name: &str) -> Result<(), ApiError> {
        self.client
            .delete(&child_path(&Self::base_path(cluster_id), name))
            .await
    }
}
