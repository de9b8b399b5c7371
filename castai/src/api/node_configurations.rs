//! Node configuration API

use super::common::{child_path, cluster_path, ListResponse};
use super::error::ApiError;
use super::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfiguration {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default)]
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_cpu_ratio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_disk_size: Option<i32>,
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eks: Option<EksConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aks: Option<AksConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kops: Option<KopsConfig>,
}

/// Body of create and update calls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfigurationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_cpu_ratio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_disk_size: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eks: Option<EksConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aks: Option<AksConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kops: Option<KopsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EksConfig {
    pub instance_profile_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_cluster_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair_id: Option<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AksConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pods_per_node: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KopsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_pair_id: Option<String>,
}

pub struct NodeConfigurationsApi<'a> {
    client: &'a Client,
}

impl<'a> NodeConfigurationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn base_path(cluster_id: &str) -> String {
        format!("{}/node-configurations", cluster_path(cluster_id))
    }

    pub async fn list(&self, cluster_id: &str) -> Result<Vec<NodeConfiguration>, ApiError> {
        let list: ListResponse<NodeConfiguration> =
            self.client.get(&Self::base_path(cluster_id)).await?;
        Ok(list.items)
    }

    pub async fn get(&self, cluster_id: &str, id: &str) -> Result<NodeConfiguration, ApiError> {
        self.client
            .get(&child_path(&Self::base_path(cluster_id), id))
            .await
    }

    pub async fn create(
        &self,
        cluster_id: &str,
        request: &NodeConfigurationRequest,
    ) -> Result<NodeConfiguration, ApiError> {
        self.client.post(&Self::base_path(cluster_id), request).await
    }

    /// Updates a configuration in place. The name cannot change and is not sent.
    pub async fn update(
        &self,
        cluster_id: &str,
        id: &str,
        request: &NodeConfigurationRequest,
    ) -> Result<NodeConfiguration, ApiError> {
        let body = NodeConfigurationRequest {
            name: None,
            ..request.clone()
        };
        self.client
            .post(&child_path(&Self::base_path(cluster_id), id), &body)
            .await
    }

    pub async fn delete(&self, cluster_id: &str, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&child_path(&Self::base_path(cluster_id), id))
            .await
    }

    /// Makes the configuration the cluster's default
    pub async fn set_default(
        &self,
        cluster_id: &str,
        id: &str,
    ) -> Result<NodeConfiguration, ApiError> {
        let path = format!("{}/default", child_path(&Self::base_path(cluster_id), id));
        self.client.post_empty(&path).await
    }
}
