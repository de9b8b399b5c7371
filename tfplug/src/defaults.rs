//! Default value providers for attributes
//!
//! Default providers are consulted when an optional attribute is absent from
//! configuration. A defaulted attribute is reported as `Presence::Defaulted`
//! by `ResourceData`, so mappers can tell it apart from an explicit value.
//!
//! ```no_run
//! use tfplug::schema::{AttributeBuilder, AttributeType};
//! use tfplug::defaults::{StaticDefault, EnvDefault};
//!
//! let ratio = AttributeBuilder::new("disk_cpu_ratio", AttributeType::Int)
//!     .optional()
//!     .default(StaticDefault::int(25))
//!     .build();
//!
//! let url = AttributeBuilder::new("api_url", AttributeType::String)
//!     .optional()
//!     .default(EnvDefault::create("CASTAI_API_URL", "https://api.cast.ai"))
//!     .build();
//! ```

use crate::schema::{Default, DefaultRequest, DefaultResponse};
use crate::types::{Dynamic, DynamicValue};
use std::env;
use std::sync::Arc;

/// StaticDefault provides a static default value
pub struct StaticDefault {
    value: Dynamic,
}

impl StaticDefault {
    pub fn create(value: Dynamic) -> Arc<dyn Default> {
        Arc::new(Self { value })
    }

    pub fn string(value: &str) -> Arc<dyn Default> {
        Self::create(Dynamic::String(value.to_string()))
    }

    pub fn int(value: i64) -> Arc<dyn Default> {
        Self::create(Dynamic::Int(value))
    }

    pub fn bool(value: bool) -> Arc<dyn Default> {
        Self::create(Dynamic::Bool(value))
    }

    pub fn list(values: Vec<Dynamic>) -> Arc<dyn Default> {
        Self::create(Dynamic::List(values))
    }
}

impl Default for StaticDefault {
    fn description(&self) -> String {
        format!("static default value: {:?}", self.value)
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        DefaultResponse {
            value: DynamicValue::new(self.value.clone()),
        }
    }
}

/// EnvDefault gets the default value from an environment variable
pub struct EnvDefault {
    env_var: String,
    fallback: Option<String>,
}

impl EnvDefault {
    pub fn create(env_var: &str, fallback: &str) -> Arc<dyn Default> {
        Arc::new(Self {
            env_var: env_var.to_string(),
            fallback: Some(fallback.to_string()),
        })
    }

    /// Environment variable default that yields null when the variable is unset
    pub fn create_required(env_var: &str) -> Arc<dyn Default> {
        Arc::new(Self {
            env_var: env_var.to_string(),
            fallback: None,
        })
    }
}

impl Default for EnvDefault {
    fn description(&self) -> String {
        match &self.fallback {
            Some(fallback) => format!(
                "default from environment variable {} (fallback: {})",
                self.env_var, fallback
            ),
            None => format!("default from environment variable {}", self.env_var),
        }
    }

    fn default_value(&self, _request: DefaultRequest) -> DefaultResponse {
        let value = match env::var(&self.env_var) {
            Ok(val) if !val.is_empty() => Dynamic::String(val),
            _ => match &self.fallback {
                Some(fallback) => Dynamic::String(fallback.clone()),
                None => Dynamic::Null,
            },
        };

        DefaultResponse {
            value: DynamicValue::new(value),
        }
    }
}
