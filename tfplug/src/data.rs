//! Presence-aware view over a configuration tree
//!
//! `ResourceData` answers "was this attribute set by the user?" from the raw
//! configuration, never by comparing against a zero value. Mappers use it to
//! build requests that carry only what the user asked for. On update, an
//! attribute the configuration dropped is reported as set to its default
//! (or empty value) so the change reaches the remote.

use crate::schema::{Block, Schema};
use crate::types::{AttributePath, Dynamic, DynamicValue};
use std::collections::{BTreeSet, HashMap};

/// Tri-state presence of a configured attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Presence<T> {
    /// Not in configuration and no default applies
    Absent,
    /// Explicitly set in configuration
    Set(T),
    /// Not in configuration, value comes from the schema default
    Defaulted(T),
}

impl<T> Presence<T> {
    /// The value when explicitly set, ignoring defaults
    pub fn explicit(self) -> Option<T> {
        match self {
            Presence::Set(v) => Some(v),
            _ => None,
        }
    }

    /// The effective value, set or defaulted
    pub fn value(self) -> Option<T> {
        match self {
            Presence::Set(v) | Presence::Defaulted(v) => Some(v),
            Presence::Absent => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Presence::Set(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Presence::Absent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Presence<U> {
        match self {
            Presence::Absent => Presence::Absent,
            Presence::Set(v) => Presence::Set(f(v)),
            Presence::Defaulted(v) => Presence::Defaulted(f(v)),
        }
    }

    /// Converts the inner value, treating a failed conversion as absent
    fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Presence<U> {
        match self {
            Presence::Absent => Presence::Absent,
            Presence::Set(v) => f(v).map_or(Presence::Absent, Presence::Set),
            Presence::Defaulted(v) => f(v).map_or(Presence::Absent, Presence::Defaulted),
        }
    }
}

/// Read-only accessor over one block of configuration
#[derive(Debug, Clone)]
pub struct ResourceData<'a> {
    block: &'a Block,
    config: &'a Dynamic,
    changed: Option<&'a BTreeSet<String>>,
    restored: Restored<'a>,
    path: AttributePath,
}

/// Attributes whose defaults count as set
#[derive(Debug, Clone, Copy)]
enum Restored<'a> {
    None,
    Named(&'a BTreeSet<String>),
    All,
}

impl Restored<'_> {
    fn contains(&self, name: &str) -> bool {
        match self {
            Restored::None => false,
            Restored::Named(names) => names.contains(name),
            Restored::All => true,
        }
    }

    /// Removed top-level attributes are sent as their empty value
    fn clears(&self, name: &str) -> bool {
        matches!(self, Restored::Named(names) if names.contains(name))
    }
}

impl<'a> ResourceData<'a> {
    pub fn new(schema: &'a Schema, config: &'a DynamicValue) -> Self {
        Self {
            block: &schema.block,
            config: &config.value,
            changed: None,
            restored: Restored::None,
            path: AttributePath::root(),
        }
    }

    /// Restricts the view to the given top-level attributes. Everything else
    /// reports `Absent`, which is how partial updates expand only changes.
    pub fn only_changed(mut self, changed: &'a BTreeSet<String>) -> Self {
        self.changed = Some(changed);
        self
    }

    /// Reports defaults of the given top-level attributes as `Set`, and every
    /// default inside the given blocks. A given attribute with no default and
    /// no value reports its empty value as `Set`. Used on update, where a
    /// changed attribute the configuration dropped must still be sent.
    pub fn restoring_defaults(mut self, changed: &'a BTreeSet<String>) -> Self {
        self.restored = Restored::Named(changed);
        self
    }

    fn entry(&self, name: &str) -> Option<&'a Dynamic> {
        match self.config {
            Dynamic::Map(m) | Dynamic::Object(m) => m.get(name),
            _ => None,
        }
    }

    fn filtered_out(&self, name: &str) -> bool {
        self.changed.is_some_and(|changed| !changed.contains(name))
    }

    /// Raw presence of an attribute value
    pub fn get(&self, name: &str) -> Presence<Dynamic> {
        let Some(attr) = self.block.attribute(name) else {
            tracing::debug!("attribute '{}' is not declared at '{}'", name, self.path);
            return Presence::Absent;
        };
        if attr.is_computed_only() || self.filtered_out(name) {
            return Presence::Absent;
        }

        let entry = self.entry(name);
        let unknown = entry.is_some_and(Dynamic::is_unknown);
        match entry {
            Some(v) if !v.is_null() && !unknown => Presence::Set(v.clone()),
            _ => match attr.default_value(&self.path.clone().attribute(name)) {
                Some(v) if !unknown && self.restored.contains(name) => Presence::Set(v),
                Some(v) => Presence::Defaulted(v),
                None if !unknown && self.restored.clears(name) && !attr.computed => {
                    Presence::Set(attr.r#type.empty_value())
                }
                None => Presence::Absent,
            },
        }
    }

    pub fn get_string(&self, name: &str) -> Presence<String> {
        self.get(name).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get_int(&self, name: &str) -> Presence<i64> {
        self.get(name).and_then(|v| v.as_int())
    }

    pub fn get_bool(&self, name: &str) -> Presence<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn get_string_list(&self, name: &str) -> Presence<Vec<String>> {
        self.get(name).and_then(|v| {
            v.as_elements().map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
        })
    }

    pub fn get_string_map(&self, name: &str) -> Presence<HashMap<String, String>> {
        self.get(name).and_then(|v| {
            v.as_entries().map(|entries| {
                entries
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
        })
    }

    /// Configured instances of a nested block, empty when absent
    pub fn blocks(&self, name: &str) -> Vec<ResourceData<'a>> {
        let Some(nested) = self.block.nested_block(name) else {
            tracing::debug!("block '{}' is not declared at '{}'", name, self.path);
            return Vec::new();
        };
        if self.filtered_out(name) {
            return Vec::new();
        }

        let base = self.path.clone().attribute(name);
        let restored = if self.restored.contains(name) {
            Restored::All
        } else {
            Restored::None
        };
        let child = |config: &'a Dynamic, path: AttributePath| ResourceData {
            block: &nested.block,
            config,
            changed: None,
            restored,
            path,
        };

        match self.entry(name) {
            Some(Dynamic::List(items) | Dynamic::Set(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| child(item, base.clone().index(i as i64)))
                .collect(),
            Some(v) if v.as_entries().is_some() => vec![child(v, base)],
            _ => Vec::new(),
        }
    }

    /// First instance of a nested block, for blocks limited to one item
    pub fn block(&self, name: &str) -> Option<ResourceData<'a>> {
        self.blocks(name).into_iter().next()
    }

    /// True when the named attribute or block was explicitly configured
    pub fn is_set(&self, name: &str) -> bool {
        if self.block.nested_block(name).is_some() {
            return !self.blocks(name).is_empty();
        }
        self.get(name).is_set()
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::StaticDefault;
    use crate::schema::{AttributeBuilder, AttributeType, NestedBlock, SchemaBuilder};

    fn schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disk_cpu_ratio", AttributeType::Int)
                    .optional()
                    .default(StaticDefault::int(25))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("should_taint", AttributeType::Bool)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::Int)
                    .computed()
                    .build(),
            )
            .block(
                NestedBlock::list(
                    "eks",
                    SchemaBuilder::new()
                        .attribute(
                            AttributeBuilder::new("security_groups", AttributeType::list_of(AttributeType::String))
                                .optional()
                                .build(),
                        )
                        .build_block(),
                )
                .max_items(1),
            )
            .build()
    }

    #[test]
    fn explicit_false_is_set_not_absent() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t1")),
            ("should_taint", Dynamic::from(false)),
        ]));
        let data = ResourceData::new(&schema, &config);

        assert_eq!(data.get_bool("should_taint"), Presence::Set(false));
        assert_eq!(data.get_string("name"), Presence::Set("t1".to_string()));
    }

    #[test]
    fn defaults_are_reported_as_defaulted() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([("name", Dynamic::from("t1"))]));
        let data = ResourceData::new(&schema, &config);

        assert_eq!(data.get_int("disk_cpu_ratio"), Presence::Defaulted(25));
        assert_eq!(data.get_int("disk_cpu_ratio").explicit(), None);
        assert_eq!(data.get_bool("should_taint"), Presence::Absent);
    }

    #[test]
    fn explicit_value_equal_to_default_is_set() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([("disk_cpu_ratio", Dynamic::Int(25))]));
        let data = ResourceData::new(&schema, &config);

        assert_eq!(data.get_int("disk_cpu_ratio"), Presence::Set(25));
    }

    #[test]
    fn computed_only_attributes_are_always_absent() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([("version", Dynamic::Int(4))]));
        let data = ResourceData::new(&schema, &config);

        assert!(data.get_int("version").is_absent());
    }

    #[test]
    fn nested_blocks_yield_child_views() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([(
            "eks",
            Dynamic::List(vec![Dynamic::object([(
                "security_groups",
                Dynamic::string_list(["sg-1", "sg-2"]),
            )])]),
        )]));
        let data = ResourceData::new(&schema, &config);

        let eks = data.block("eks").unwrap();
        assert_eq!(eks.path().to_string(), "eks[0]");
        assert_eq!(
            eks.get_string_list("security_groups").explicit(),
            Some(vec!["sg-1".to_string(), "sg-2".to_string()])
        );
        assert!(data.is_set("eks"));
    }

    #[test]
    fn only_changed_hides_unchanged_attributes() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t1")),
            ("should_taint", Dynamic::from(true)),
        ]));
        let changed = BTreeSet::from(["should_taint".to_string()]);
        let data = ResourceData::new(&schema, &config).only_changed(&changed);

        assert!(data.get_string("name").is_absent());
        assert_eq!(data.get_bool("should_taint"), Presence::Set(true));
        assert!(data.get_int("disk_cpu_ratio").is_absent());
    }

    #[test]
    fn restored_defaults_are_reported_as_set() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([("name", Dynamic::from("t1"))]));
        let changed = BTreeSet::from(["disk_cpu_ratio".to_string()]);
        let data = ResourceData::new(&schema, &config).restoring_defaults(&changed);

        assert_eq!(data.get_int("disk_cpu_ratio"), Presence::Set(25));
        assert!(data.get_bool("should_taint").is_absent());
        assert_eq!(data.get_string("name"), Presence::Set("t1".to_string()));
    }

    #[test]
    fn restored_attribute_without_default_is_cleared() {
        let schema = schema();
        let config = DynamicValue::new(Dynamic::object([("name", Dynamic::from("t1"))]));
        let changed = BTreeSet::from(["should_taint".to_string(), "version".to_string()]);
        let data = ResourceData::new(&schema, &config).restoring_defaults(&changed);

        assert_eq!(data.get_bool("should_taint"), Presence::Set(false));
        assert!(data.get_int("version").is_absent());

        let pending = DynamicValue::new(Dynamic::object([("should_taint", Dynamic::Unknown)]));
        let data = ResourceData::new(&schema, &pending).restoring_defaults(&changed);
        assert!(data.get_bool("should_taint").is_absent());
    }

    #[test]
    fn restoring_a_block_restores_its_defaults() {
        let schema = SchemaBuilder::new()
            .block(
                NestedBlock::list(
                    "aks",
                    SchemaBuilder::new()
                        .attribute(
                            AttributeBuilder::new("max_pods_per_node", AttributeType::Int)
                                .optional()
                                .default(StaticDefault::int(30))
                                .build(),
                        )
                        .build_block(),
                )
                .max_items(1),
            )
            .build();
        let config = DynamicValue::new(Dynamic::object([(
            "aks",
            Dynamic::List(vec![Dynamic::Object(HashMap::new())]),
        )]));
        let changed = BTreeSet::from(["aks".to_string()]);

        let plain = ResourceData::new(&schema, &config);
        assert_eq!(
            plain.block("aks").unwrap().get_int("max_pods_per_node"),
            Presence::Defaulted(30)
        );

        let restored = ResourceData::new(&schema, &config).restoring_defaults(&changed);
        assert_eq!(
            restored.block("aks").unwrap().get_int("max_pods_per_node"),
            Presence::Set(30)
        );
    }
}
