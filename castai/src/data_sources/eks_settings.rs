//! `castai_eks_settings`: IAM policies for onboarding an EKS cluster.
//! Everything is rendered locally, no API call is made.

use super::policies;
use async_trait::async_trait;
use std::sync::Arc;
use tfplug::data_source::{
    ReadDataSourceRequest, ReadDataSourceResponse, ValidateDataSourceConfigRequest,
    ValidateDataSourceConfigResponse,
};
use tfplug::types::has_errors;
use tfplug::validator::StringNotWhitespace;
use tfplug::{
    AttributeBuilder, AttributeType, Context, DataSource, Diagnostic, Dynamic, DynamicValue,
    ResourceData, ResourceState, Schema, SchemaBuilder, TfplugError,
};

pub const KIND: &str = "castai_eks_settings";

const ACCOUNT_ID: &str = "account_id";
const REGION: &str = "region";
const VPC: &str = "vpc";
const CLUSTER: &str = "cluster";

fn input(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .required()
        .force_new()
        .validator(StringNotWhitespace::create())
        .description(description)
        .build()
}

pub fn schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Retrieve IAM policy, IAM User Policy and instance profile policies for the specified cluster")
        .attribute(input(ACCOUNT_ID, "AWS account id"))
        .attribute(input(REGION, "AWS region of the cluster"))
        .attribute(input(VPC, "VPC id of the cluster"))
        .attribute(input(CLUSTER, "EKS cluster name"))
        .attribute(
            AttributeBuilder::new("iam_policy_json", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("iam_user_policy_json", AttributeType::String)
                .computed()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("iam_managed_policies", AttributeType::set_of(AttributeType::String))
                .computed()
                .build(),
        )
        .build()
}

pub struct EksSettingsDataSource {
    schema: Arc<Schema>,
}

impl EksSettingsDataSource {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    fn settings(&self, config: &DynamicValue) -> tfplug::Result<ResourceState> {
        let data = ResourceData::new(&self.schema, config);
        let required = |name: &str| {
            data.get_string(name)
                .explicit()
                .ok_or_else(|| TfplugError::validation(name, "value is required"))
        };
        let account_id = required(ACCOUNT_ID)?;
        let region = required(REGION)?;
        let vpc = required(VPC)?;
        let cluster = required(CLUSTER)?;

        let arn = format!("{}:{}", region, account_id);
        let encoding = |e: serde_json::Error| TfplugError::EncodingError(e.to_string());
        let iam_policy = policies::iam_policy(&account_id).map_err(encoding)?;
        let user_policy = policies::user_inline_policy(&cluster, &arn, &vpc).map_err(encoding)?;

        let attributes = DynamicValue::new(Dynamic::object([
            (ACCOUNT_ID, Dynamic::String(account_id.clone())),
            (REGION, Dynamic::String(region.clone())),
            (VPC, Dynamic::String(vpc.clone())),
            (CLUSTER, Dynamic::String(cluster.clone())),
            ("iam_policy_json", Dynamic::String(iam_policy)),
            ("iam_user_policy_json", Dynamic::String(user_policy)),
            (
                "iam_managed_policies",
                Dynamic::Set(
                    policies::MANAGED_POLICIES
                        .iter()
                        .map(|p| Dynamic::from(*p))
                        .collect(),
                ),
            ),
        ]));

        let id = format!("eks-{}-{}-{}-{}", account_id, vpc, region, cluster);
        Ok(ResourceState::new(id, self.schema.normalize_state(attributes)))
    }
}

#[async_trait]
impl DataSource for EksSettingsDataSource {
    fn type_name(&self) -> &str {
        KIND
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: self.schema.validate_config(&request.config),
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let diagnostics = self.schema.validate_config(&request.config);
        if has_errors(&diagnostics) {
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        }

        match self.settings(&request.config) {
            Ok(state) => {
                tracing::debug!("rendered EKS settings {}", state.id);
                ReadDataSourceResponse {
                    state: Some(state),
                    diagnostics,
                }
            }
            Err(e) => ReadDataSourceResponse {
                state: None,
                diagnostics: vec![Diagnostic::from(e)],
            },
        }
    }
}
