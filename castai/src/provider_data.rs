//! State shared by every resource and data source once the provider is configured

use crate::api::Client;
use std::sync::Arc;
use tfplug::SchemaRegistry;

#[derive(Clone)]
pub struct CastaiProviderData {
    pub client: Client,
    pub resource_schemas: Arc<SchemaRegistry>,
}

impl CastaiProviderData {
    pub fn new(client: Client, resource_schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            client,
            resource_schemas,
        }
    }
}
