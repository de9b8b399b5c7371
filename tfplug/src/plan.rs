//! Desired-state computation and change detection
//!
//! The desired value of an attribute is its configured value, else its
//! default, else (for optional+computed attributes) the prior state value,
//! else the empty value of its type. Diffing compares that against the
//! normalized prior state attribute by attribute.

use crate::schema::{Block, NestingMode, Schema};
use crate::types::{AttributePath, Dynamic, DynamicValue};
use std::collections::{BTreeSet, HashMap};

/// Result of comparing configuration against prior state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDiff {
    /// Top-level attributes and blocks whose desired value differs
    pub changed: BTreeSet<String>,
    /// Changed attributes marked force_new
    pub requires_replace: Vec<String>,
}

impl PlanDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Compares desired configuration against prior state. Computed-only
/// attributes never count as changes.
pub fn diff(schema: &Schema, prior: &DynamicValue, config: &DynamicValue) -> PlanDiff {
    let prior = schema.normalize_state(prior.clone());
    let desired = desired_state(schema, &prior, config);

    let empty = HashMap::new();
    let prior_entries = prior.value.as_entries().unwrap_or(&empty);
    let desired_entries = desired.value.as_entries().unwrap_or(&empty);

    let mut result = PlanDiff::default();
    let configurable = schema
        .block
        .attributes
        .iter()
        .filter(|a| !a.is_computed_only())
        .map(|a| (a.name.as_str(), a.force_new))
        .chain(schema.block.block_types.iter().map(|b| (b.type_name.as_str(), false)));

    for (name, force_new) in configurable {
        let before = prior_entries.get(name).unwrap_or(&Dynamic::Null);
        let after = desired_entries.get(name).unwrap_or(&Dynamic::Null);
        if after.is_unknown() || !before.semantic_eq(after) {
            tracing::debug!("attribute '{}' changed", name);
            result.changed.insert(name.to_string());
            if force_new {
                result.requires_replace.push(name.to_string());
            }
        }
    }

    result
}

/// The state the configuration asks for, with prior values filling
/// optional+computed attributes the configuration leaves out
pub fn desired_state(schema: &Schema, prior: &DynamicValue, config: &DynamicValue) -> DynamicValue {
    DynamicValue::new(desired_block(&schema.block, &prior.value, &config.value))
}

fn desired_block(block: &Block, prior: &Dynamic, config: &Dynamic) -> Dynamic {
    let empty = HashMap::new();
    let prior_entries = prior.as_entries().unwrap_or(&empty);
    let config_entries = config.as_entries().unwrap_or(&empty);
    let mut out = HashMap::new();

    for attr in &block.attributes {
        let configured = config_entries
            .get(&attr.name)
            .filter(|v| !v.is_null())
            .cloned();
        let prior_value = prior_entries.get(&attr.name).cloned();

        let value = if attr.is_computed_only() {
            prior_value.unwrap_or(Dynamic::Null)
        } else if let Some(v) = configured {
            v
        } else if let Some(v) = attr.default_value(&AttributePath::new(&attr.name)) {
            v
        } else if attr.computed {
            prior_value.unwrap_or(Dynamic::Null)
        } else {
            Dynamic::Null
        };
        out.insert(attr.name.clone(), attr.r#type.conform(value));
    }

    for nested in &block.block_types {
        let configured = config_entries.get(&nested.type_name).unwrap_or(&Dynamic::Null);
        let prior_value = prior_entries.get(&nested.type_name).unwrap_or(&Dynamic::Null);

        let value = match nested.nesting {
            NestingMode::Single => {
                if configured.is_null() {
                    Dynamic::Null
                } else {
                    desired_block(&nested.block, prior_value, configured)
                }
            }
            NestingMode::List | NestingMode::Set => {
                let prior_items = prior_value.as_elements().unwrap_or(&[]);
                let items = configured
                    .as_elements()
                    .unwrap_or(&[])
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        desired_block(
                            &nested.block,
                            prior_items.get(i).unwrap_or(&Dynamic::Null),
                            item,
                        )
                    })
                    .collect();
                if nested.nesting == NestingMode::Set {
                    Dynamic::Set(items)
                } else {
                    Dynamic::List(items)
                }
            }
        };
        out.insert(nested.type_name.clone(), value);
    }

    Dynamic::Object(out)
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
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("min_nodes", AttributeType::Int)
                    .optional()
                    .default(StaticDefault::int(0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("configuration_id", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("version", AttributeType::Int)
                    .computed()
                    .build(),
            )
            .block(NestedBlock::list(
                "constraints",
                SchemaBuilder::new()
                    .attribute(
                        AttributeBuilder::new("spot", AttributeType::Bool)
                            .optional()
                            .default(StaticDefault::bool(false))
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::new("architectures", AttributeType::list_of(AttributeType::String))
                            .optional()
                            .computed()
                            .default(StaticDefault::list(vec![Dynamic::from("amd64")]))
                            .build(),
                    )
                    .build_block(),
            ).max_items(1))
            .build()
    }

    fn prior() -> DynamicValue {
        DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t1")),
            ("min_nodes", Dynamic::Int(0)),
            ("configuration_id", Dynamic::from("server-assigned")),
            ("version", Dynamic::Int(7)),
            (
                "constraints",
                Dynamic::List(vec![Dynamic::object([
                    ("spot", Dynamic::from(false)),
                    ("architectures", Dynamic::string_list(["amd64"])),
                ])]),
            ),
        ]))
    }

    #[test]
    fn identical_config_produces_no_changes() {
        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t1")),
            ("constraints", Dynamic::List(vec![Dynamic::Object(HashMap::new())])),
        ]));

        let diff = diff(&schema(), &prior(), &config);
        assert!(diff.is_empty(), "unexpected changes: {:?}", diff.changed);
    }

    #[test]
    fn changed_force_new_attribute_requires_replace() {
        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t2")),
            ("min_nodes", Dynamic::Int(2)),
            ("constraints", Dynamic::List(vec![Dynamic::Object(HashMap::new())])),
        ]));

        let diff = diff(&schema(), &prior(), &config);
        assert_eq!(
            diff.changed,
            BTreeSet::from(["min_nodes".to_string(), "name".to_string()])
        );
        assert_eq!(diff.requires_replace, vec!["name".to_string()]);
    }

    #[test]
    fn nested_block_changes_are_reported_at_top_level() {
        let config = DynamicValue::new(Dynamic::object([
            ("name", Dynamic::from("t1")),
            (
                "constraints",
                Dynamic::List(vec![Dynamic::object([("spot", Dynamic::from(true))])]),
            ),
        ]));

        let diff = diff(&schema(), &prior(), &config);
        assert_eq!(diff.changed, BTreeSet::from(["constraints".to_string()]));
        assert!(diff.requires_replace.is_empty());
    }

    #[test]
    fn removing_a_block_is_a_change() {
        let config = DynamicValue::new(Dynamic::object([("name", Dynamic::from("t1"))]));

        let diff = diff(&schema(), &prior(), &config);
        assert_eq!(diff.changed, BTreeSet::from(["constraints".to_string()]));
    }
}
