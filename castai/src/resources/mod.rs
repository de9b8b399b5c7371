//! Resource implementations
//!
//! Each resource is a `tfplug::Controller` over a mapper and a thin
//! `RemoteApi` adapter around the shared API client.

pub mod node_configuration;
pub mod node_configuration_default;
pub mod node_template;

pub use node_configuration::NodeConfigurationResource;
pub use node_configuration_default::NodeConfigurationDefaultResource;
pub use node_template::NodeTemplateResource;

use std::collections::HashMap;
use tfplug::{Dynamic, Presence, RemoteError, TfplugError};

/// Attribute holding the owning cluster of every cluster-scoped kind
pub const CLUSTER_ID: &str = "cluster_id";

pub(crate) fn require_cluster(parent: Option<&str>) -> Result<&str, RemoteError> {
    parent.ok_or_else(|| RemoteError::InvalidRequest(format!("{} is not set", CLUSTER_ID)))
}

/// Narrows an explicitly configured integer to the API's 32-bit fields.
/// Defaulted values stay out of requests.
pub(crate) fn int32(name: &str, value: Presence<i64>) -> tfplug::Result<Option<i32>> {
    value
        .explicit()
        .map(|v| {
            i32::try_from(v).map_err(|_| {
                TfplugError::validation(name, format!("{} does not fit in a 32-bit integer", v))
            })
        })
        .transpose()
}

pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

pub(crate) fn string_or_null(value: Option<&String>) -> Dynamic {
    value.map_or(Dynamic::Null, |s| Dynamic::String(s.clone()))
}

pub(crate) fn int_or_null(value: Option<i32>) -> Dynamic {
    value.map_or(Dynamic::Null, |v| Dynamic::Int(v.into()))
}

pub(crate) fn bool_or_null(value: Option<bool>) -> Dynamic {
    value.map_or(Dynamic::Null, Dynamic::Bool)
}

pub(crate) fn strings_or_null(value: Option<&Vec<String>>) -> Dynamic {
    value.map_or(Dynamic::Null, |items| Dynamic::string_list(items.iter().cloned()))
}

pub(crate) fn string_map_or_null(value: Option<&HashMap<String, String>>) -> Dynamic {
    value.map_or(Dynamic::Null, |m| {
        Dynamic::string_map(m.iter().map(|(k, v)| (k.clone(), v.clone())))
    })
}

/// A single nested block instance, or no instances
pub(crate) fn block_or_empty(value: Option<Dynamic>) -> Dynamic {
    Dynamic::List(value.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_rejects_overflow() {
        assert_eq!(int32("min_cpu", Presence::Set(4)).unwrap(), Some(4));
        assert_eq!(int32("min_cpu", Presence::Absent).unwrap(), None);
        assert_eq!(int32("min_cpu", Presence::Defaulted(0)).unwrap(), None);
        assert!(int32("min_cpu", Presence::Set(i64::MAX)).is_err());
    }

    #[test]
    fn missing_cluster_is_an_invalid_request() {
        assert!(matches!(
            require_cluster(None),
            Err(RemoteError::InvalidRequest(_))
        ));
        assert_eq!(require_cluster(Some("c-1")).unwrap(), "c-1");
    }
}
