//! CAST AI Terraform provider
//!
//! Node templates, node configurations and the default node configuration of
//! a cluster are reconciled through `tfplug::Controller`; EKS onboarding
//! settings are rendered locally.

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::CastaiProviderData;

use async_trait::async_trait;
use std::sync::Arc;
use tfplug::defaults::{EnvDefault, StaticDefault};
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse};
use tfplug::types::has_errors;
use tfplug::validator::IntRange;
use tfplug::{
    AttributeBuilder, AttributeType, Context, DataSource, Diagnostic, LogLevel, Provider,
    Resource, ResourceData, Schema, SchemaBuilder, SchemaRegistry, TfplugError,
};

pub const DEFAULT_API_URL: &str = "https://api.cast.ai";
pub const API_URL_ENV: &str = "CASTAI_API_URL";
pub const API_TOKEN_ENV: &str = "CASTAI_API_TOKEN";

fn provider_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("api_url", AttributeType::String)
                .optional()
                .default(EnvDefault::create(API_URL_ENV, DEFAULT_API_URL))
                .description("CAST.AI API url.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("api_token", AttributeType::String)
                .optional()
                .sensitive()
                .default(EnvDefault::create_required(API_TOKEN_ENV))
                .description("The token used to connect to CAST AI API.")
                .build(),
        )
        .attribute(
            AttributeBuilder::new("request_timeout", AttributeType::Int)
                .optional()
                .default(StaticDefault::int(30))
                .validator(IntRange::at_least(1))
                .description("Timeout in seconds for a single API request.")
                .build(),
        )
        .build()
}

pub struct CastaiProvider {
    schema: Arc<Schema>,
    resource_schemas: Arc<SchemaRegistry>,
    data_source_schemas: SchemaRegistry,
    provider_data: Option<CastaiProviderData>,
}

impl CastaiProvider {
    pub fn new() -> tfplug::Result<Self> {
        let resource_schemas = SchemaRegistry::new()
            .register(resources::node_template::KIND, resources::node_template::schema())?
            .register(
                resources::node_configuration::KIND,
                resources::node_configuration::schema(),
            )?
            .register(
                resources::node_configuration_default::KIND,
                resources::node_configuration_default::schema(),
            )?;
        let data_source_schemas = SchemaRegistry::new().register(
            data_sources::eks_settings::KIND,
            data_sources::eks_settings::schema(),
        )?;

        Ok(Self {
            schema: Arc::new(provider_schema()),
            resource_schemas: Arc::new(resource_schemas),
            data_source_schemas,
            provider_data: None,
        })
    }

    pub fn provider_data(&self) -> Option<&CastaiProviderData> {
        self.provider_data.as_ref()
    }

    fn configured(&self) -> tfplug::Result<&CastaiProviderData> {
        self.provider_data
            .as_ref()
            .ok_or(TfplugError::ProviderNotConfigured)
    }
}

#[async_trait]
impl Provider for CastaiProvider {
    fn type_name(&self) -> &str {
        "castai"
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tfplug::logging::init(LogLevel::from_env());

        let mut diagnostics = self.schema.validate_config(&request.config);
        if has_errors(&diagnostics) {
            return ConfigureProviderResponse { diagnostics };
        }

        let data = ResourceData::new(&self.schema, &request.config);
        let api_url = data
            .get_string("api_url")
            .value()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let Some(api_token) = data.get_string("api_token").value() else {
            diagnostics.push(Diagnostic::error(
                "Missing API token",
                format!(
                    "api_token is required (set in provider config or {} env var)",
                    API_TOKEN_ENV
                ),
            ));
            return ConfigureProviderResponse { diagnostics };
        };
        let timeout = data
            .get_int("request_timeout")
            .value()
            .and_then(|t| u64::try_from(t).ok())
            .unwrap_or(30);

        let config = api::ClientConfig::default().with_timeout_seconds(timeout);
        match api::Client::with_config(&api_url, &api_token, config) {
            Ok(client) => {
                tracing::info!("configured CAST AI provider for {}", client.base_url());
                self.provider_data = Some(CastaiProviderData::new(
                    client,
                    self.resource_schemas.clone(),
                ));
            }
            Err(e) => diagnostics.push(Diagnostic::error(
                "Failed to create API client",
                e.to_string(),
            )),
        }

        ConfigureProviderResponse { diagnostics }
    }

    fn resource_schemas(&self) -> &SchemaRegistry {
        &self.resource_schemas
    }

    fn data_source_schemas(&self) -> &SchemaRegistry {
        &self.data_source_schemas
    }

    async fn create_resource(&self, name: &str) -> tfplug::Result<Box<dyn Resource>> {
        let data = self.configured()?;
        let schema = data.resource_schemas.schema_for(name)?;
        let client = data.client.clone();

        match name {
            resources::node_template::KIND => {
                Ok(Box::new(resources::node_template::resource(client, schema)))
            }
            resources::node_configuration::KIND => Ok(Box::new(
                resources::node_configuration::resource(client, schema),
            )),
            resources::node_configuration_default::KIND => Ok(Box::new(
                resources::node_configuration_default::resource(client, schema),
            )),
            _ => Err(TfplugError::ResourceNotFound(name.to_string())),
        }
    }

    async fn create_data_source(&self, name: &str) -> tfplug::Result<Box<dyn DataSource>> {
        self.configured()?;
        let schema = self
            .data_source_schemas
            .schema_for(name)
            .map_err(|_| TfplugError::DataSourceNotFound(name.to_string()))?;

        match name {
            data_sources::eks_settings::KIND => {
                Ok(Box::new(data_sources::EksSettingsDataSource::new(schema)))
            }
            _ => Err(TfplugError::DataSourceNotFound(name.to_string())),
        }
    }
}
