//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining resource and data source
//! schemas: attribute types, nested blocks, registration-time consistency
//! checks, configuration validation and state normalization.

use crate::error::{Result, TfplugError};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    pub fn list_of(elem: AttributeType) -> Self {
        AttributeType::List(Box::new(elem))
    }

    pub fn set_of(elem: AttributeType) -> Self {
        AttributeType::Set(Box::new(elem))
    }

    pub fn map_of(elem: AttributeType) -> Self {
        AttributeType::Map(Box::new(elem))
    }

    /// The value an unset attribute of this type takes in state
    pub fn empty_value(&self) -> Dynamic {
        match self {
            AttributeType::String => Dynamic::String(String::new()),
            AttributeType::Int => Dynamic::Int(0),
            AttributeType::Bool => Dynamic::Bool(false),
            AttributeType::List(_) => Dynamic::List(Vec::new()),
            AttributeType::Set(_) => Dynamic::Set(Vec::new()),
            AttributeType::Map(_) => Dynamic::Map(HashMap::new()),
            AttributeType::Object(fields) => Dynamic::Object(
                fields
                    .iter()
                    .map(|(k, t)| (k.clone(), t.empty_value()))
                    .collect(),
            ),
        }
    }

    /// Whether the runtime tag of `value` fits this type. Null and unknown
    /// fit every type; lists and sets are interchangeable, as are maps and
    /// objects, because decoded state cannot tell them apart.
    pub fn matches(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null | Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Int, Dynamic::Int(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(elem) | AttributeType::Set(elem), Dynamic::List(items) | Dynamic::Set(items)) => {
                items.iter().all(|item| elem.matches(item))
            }
            (AttributeType::Map(elem), Dynamic::Map(entries) | Dynamic::Object(entries)) => {
                entries.values().all(|v| elem.matches(v))
            }
            (AttributeType::Object(fields), Dynamic::Map(entries) | Dynamic::Object(entries)) => {
                entries
                    .iter()
                    .all(|(k, v)| fields.get(k).is_some_and(|t| t.matches(v)))
            }
            _ => false,
        }
    }

    /// Reshapes a value to this type: null becomes the empty value, lists
    /// and sets and maps and objects take the declared container kind.
    /// Values whose tag does not fit are returned unchanged.
    pub fn conform(&self, value: Dynamic) -> Dynamic {
        match (self, value) {
            (_, Dynamic::Null) => self.empty_value(),
            (AttributeType::List(elem), Dynamic::List(items) | Dynamic::Set(items)) => {
                Dynamic::List(items.into_iter().map(|v| elem.conform(v)).collect())
            }
            (AttributeType::Set(elem), Dynamic::List(items) | Dynamic::Set(items)) => {
                Dynamic::Set(items.into_iter().map(|v| elem.conform(v)).collect())
            }
            (AttributeType::Map(elem), Dynamic::Map(entries) | Dynamic::Object(entries)) => {
                Dynamic::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, elem.conform(v)))
                        .collect(),
                )
            }
            (AttributeType::Object(fields), Dynamic::Map(mut entries) | Dynamic::Object(mut entries)) => {
                Dynamic::Object(
                    fields
                        .iter()
                        .map(|(k, t)| {
                            let v = entries.remove(k).unwrap_or(Dynamic::Null);
                            (k.clone(), t.conform(v))
                        })
                        .collect(),
                )
            }
            (_, other) => other,
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Int => write!(f, "number"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::List(elem) => write!(f, "list({})", elem),
            AttributeType::Set(elem) => write!(f, "set({})", elem),
            AttributeType::Map(elem) => write!(f, "map({})", elem),
            AttributeType::Object(_) => write!(f, "object"),
        }
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    /// Rejects contradictory declarations. Runs once at registration.
    pub fn check_definition(&self) -> Result<()> {
        self.block.check_definition(&AttributePath::root())
    }

    /// Validates a configuration tree against the schema
    pub fn validate_config(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate(&config.value, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }

    /// Drops unknown fields and fills every declared attribute, so that
    /// absent values take their empty representation
    pub fn normalize_state(&self, state: DynamicValue) -> DynamicValue {
        DynamicValue::new(self.block.normalize(state.value))
    }

    /// Names of top-level force_new attributes
    pub fn force_new_attributes(&self) -> impl Iterator<Item = &str> {
        self.block
            .attributes
            .iter()
            .filter(|a| a.force_new)
            .map(|a| a.name.as_str())
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone, std::default::Default)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    pub deprecated: Option<String>,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    fn check_definition(&self, path: &AttributePath) -> Result<()> {
        for attr in &self.attributes {
            let attr_path = path.clone().attribute(&attr.name);
            let fail = |msg: String| -> Result<()> {
                Err(TfplugError::InvalidSchema(format!("{}: {}", attr_path, msg)))
            };

            if attr.required && attr.computed {
                return fail("attribute cannot be both required and computed".to_string());
            }
            if !attr.required && !attr.optional && !attr.computed {
                return fail("attribute must be required, optional or computed".to_string());
            }
            for validator in &attr.validators {
                if !validator.accepts(&attr.r#type) {
                    return fail(format!(
                        "validator '{}' cannot apply to type {}",
                        validator.description(),
                        attr.r#type
                    ));
                }
            }
            if let Some(default) = &attr.default {
                if attr.required {
                    return fail("required attribute cannot have a default".to_string());
                }
                let value = default
                    .default_value(DefaultRequest {
                        path: attr_path.clone(),
                    })
                    .value
                    .value;
                if !attr.r#type.matches(&value) {
                    return fail(format!(
                        "default {} does not match type {}",
                        value.type_name(),
                        attr.r#type
                    ));
                }
            }
        }

        for nested in &self.block_types {
            if nested.max_items > 0 && nested.min_items > nested.max_items {
                return Err(TfplugError::InvalidSchema(format!(
                    "{}: min_items exceeds max_items",
                    path.clone().attribute(&nested.type_name)
                )));
            }
            nested
                .block
                .check_definition(&path.clone().attribute(&nested.type_name))?;
        }

        Ok(())
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let empty = HashMap::new();
        let entries = match value {
            Dynamic::Null => &empty,
            Dynamic::Unknown => return,
            Dynamic::Map(m) | Dynamic::Object(m) => m,
            other => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid block",
                        format!("expected a block, got {}", other.type_name()),
                    )
                    .with_attribute(path.clone()),
                );
                return;
            }
        };

        for key in entries.keys() {
            if self.attribute(key).is_none() && self.nested_block(key).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named {:?} is not expected here.", key),
                    )
                    .with_attribute(path.clone().attribute(key)),
                );
            }
        }

        for attr in &self.attributes {
            let attr_path = path.clone().attribute(&attr.name);
            attr.validate(
                entries.get(&attr.name).unwrap_or(&Dynamic::Null),
                &attr_path,
                diagnostics,
            );
        }

        for nested in &self.block_types {
            let block_path = path.clone().attribute(&nested.type_name);
            nested.validate(
                entries.get(&nested.type_name).unwrap_or(&Dynamic::Null),
                &block_path,
                diagnostics,
            );
        }
    }

    fn normalize(&self, value: Dynamic) -> Dynamic {
        let mut entries = match value {
            Dynamic::Map(m) | Dynamic::Object(m) => m,
            _ => HashMap::new(),
        };

        let mut out = HashMap::new();
        for attr in &self.attributes {
            let v = entries.remove(&attr.name).unwrap_or(Dynamic::Null);
            out.insert(attr.name.clone(), attr.r#type.conform(v));
        }
        for nested in &self.block_types {
            let v = entries.remove(&nested.type_name).unwrap_or(Dynamic::Null);
            out.insert(nested.type_name.clone(), nested.normalize(v));
        }
        Dynamic::Object(out)
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub deprecated: Option<String>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub default: Option<Arc<dyn Default>>,
}

// Manual Debug implementation since validators/defaults don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("sensitive", &self.sensitive)
            .field("deprecated", &self.deprecated)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("default", &self.default.is_some())
            .finish()
    }
}

impl Attribute {
    /// Computed and not settable from configuration
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// The default for this attribute, None when there is none or it
    /// resolves to null
    pub fn default_value(&self, path: &AttributePath) -> Option<Dynamic> {
        let default = self.default.as_ref()?;
        let value = default
            .default_value(DefaultRequest { path: path.clone() })
            .value
            .value;
        (!value.is_null()).then_some(value)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if value.is_unknown() {
            return;
        }
        if value.is_null() {
            if self.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument {:?} is required, but no definition was found.", self.name),
                    )
                    .with_attribute(path.clone()),
                );
            }
            return;
        }
        if self.is_computed_only() {
            diagnostics.push(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!("Can't configure a value for {:?}: its value will be decided automatically.", self.name),
                )
                .with_attribute(path.clone()),
            );
            return;
        }
        if !self.r#type.matches(value) {
            diagnostics.push(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("{} must be {}, got {}", path, self.r#type, value.type_name()),
                )
                .with_attribute(path.clone()),
            );
            return;
        }
        if let Some(message) = &self.deprecated {
            diagnostics.push(
                Diagnostic::warning("Argument is deprecated", message.clone())
                    .with_attribute(path.clone()),
            );
        }
        for validator in &self.validators {
            validator.validate(value, path, diagnostics);
        }
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64, // 0 means unbounded
}

impl NestedBlock {
    pub fn list(type_name: &str, block: Block) -> Self {
        Self {
            type_name: type_name.to_string(),
            block,
            nesting: NestingMode::List,
            min_items: 0,
            max_items: 0,
        }
    }

    pub fn single(type_name: &str, block: Block) -> Self {
        Self {
            nesting: NestingMode::Single,
            ..Self::list(type_name, block)
        }
    }

    pub fn min_items(mut self, n: i64) -> Self {
        self.min_items = n;
        self
    }

    pub fn max_items(mut self, n: i64) -> Self {
        self.max_items = n;
        self
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if value.is_unknown() {
            return;
        }
        let configured = match value.as_elements() {
            Some(items) => !items.is_empty(),
            None => !value.is_null(),
        };
        if configured {
            if let Some(message) = &self.block.deprecated {
                diagnostics.push(
                    Diagnostic::warning("Block is deprecated", message.clone())
                        .with_attribute(path.clone()),
                );
            }
        }

        match self.nesting {
            NestingMode::Single => {
                if value.is_null() && self.min_items > 0 {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required block",
                            format!("A {:?} block is required.", self.type_name),
                        )
                        .with_attribute(path.clone()),
                    );
                }
                self.block.validate(value, path, diagnostics);
            }
            NestingMode::List | NestingMode::Set => {
                let items: &[Dynamic] = match value {
                    Dynamic::Null => &[],
                    v => match v.as_elements() {
                        Some(items) => items,
                        None => {
                            diagnostics.push(
                                Diagnostic::error(
                                    "Invalid block",
                                    format!("expected a list of {:?} blocks", self.type_name),
                                )
                                .with_attribute(path.clone()),
                            );
                            return;
                        }
                    },
                };
                let count = items.len() as i64;
                if count < self.min_items {
                    diagnostics.push(
                        Diagnostic::error(
                            "Insufficient blocks",
                            format!("At least {} {:?} blocks are required.", self.min_items, self.type_name),
                        )
                        .with_attribute(path.clone()),
                    );
                }
                if self.max_items > 0 && count > self.max_items {
                    diagnostics.push(
                        Diagnostic::error(
                            "Too many blocks",
                            format!("No more than {} {:?} blocks are allowed.", self.max_items, self.type_name),
                        )
                        .with_attribute(path.clone()),
                    );
                }
                for (i, item) in items.iter().enumerate() {
                    self.block
                        .validate(item, &path.clone().index(i as i64), diagnostics);
                }
            }
        }
    }

    fn normalize(&self, value: Dynamic) -> Dynamic {
        match self.nesting {
            NestingMode::Single => match value {
                Dynamic::Null => Dynamic::Null,
                Dynamic::List(mut items) | Dynamic::Set(mut items) => {
                    if items.is_empty() {
                        Dynamic::Null
                    } else {
                        self.block.normalize(items.swap_remove(0))
                    }
                }
                other => self.block.normalize(other),
            },
            NestingMode::List | NestingMode::Set => {
                let items = match value {
                    Dynamic::List(items) | Dynamic::Set(items) => items,
                    Dynamic::Null => Vec::new(),
                    other => vec![other],
                };
                let normalized = items.into_iter().map(|v| self.block.normalize(v)).collect();
                if self.nesting == NestingMode::Set {
                    Dynamic::Set(normalized)
                } else {
                    Dynamic::List(normalized)
                }
            }
        }
    }
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

/// Default provides default values for optional attributes
/// Called when attribute is not set in configuration
pub trait Default: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Provide default value
    fn default_value(&self, request: DefaultRequest) -> DefaultResponse;
}

/// Request for default values
pub struct DefaultRequest {
    pub path: AttributePath,
}

/// Response with default value
pub struct DefaultResponse {
    pub value: DynamicValue,
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                force_new: false,
                sensitive: false,
                deprecated: None,
                validators: Vec::new(),
                default: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Changing this attribute requires replacing the resource
    pub fn force_new(mut self) -> Self {
        self.attribute.force_new = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.attribute.deprecated = Some(message.to_string());
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    pub fn default(mut self, default: Arc<dyn Default>) -> Self {
        self.attribute.default = Some(default);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas and nested blocks
/// ALWAYS use this for consistency
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.schema.block.deprecated = Some(message.to_string());
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }

    /// Finalize as the body of a nested block
    pub fn build_block(self) -> Block {
        self.schema.block
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::StaticDefault;
    use crate::types::has_errors;
    use crate::validator::{IntRange, IsUuid};

    fn template_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("cluster_id", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(IsUuid::create())
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("min_nodes", AttributeType::Int)
                    .optional()
                    .default(StaticDefault::int(0))
                    .validator(IntRange::at_least(0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("labels", AttributeType::map_of(AttributeType::String))
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
                    "taint",
                    SchemaBuilder::new()
                        .attribute(
                            AttributeBuilder::new("key", AttributeType::String)
                                .required()
                                .build(),
                        )
                        .build_block(),
                )
                .max_items(2),
            )
            .build()
    }

    fn config(value: Dynamic) -> DynamicValue {
        DynamicValue::new(value)
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the resource")
            .required()
            .force_new()
            .build();

        assert_eq!(attr.name, "name");
        assert!(attr.required);
        assert!(!attr.optional);
        assert!(attr.force_new);
        assert_eq!(attr.description, "The name of the resource");
    }

    #[test]
    fn definition_check_accepts_consistent_schema() {
        assert!(template_schema().check_definition().is_ok());
    }

    #[test]
    fn definition_check_rejects_required_and_computed() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .required()
                    .computed()
                    .build(),
            )
            .build();
        let err = schema.check_definition().unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn definition_check_rejects_validator_of_wrong_type() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("ratio", AttributeType::Int)
                    .optional()
                    .validator(IsUuid::create())
                    .build(),
            )
            .build();
        assert!(matches!(
            schema.check_definition(),
            Err(TfplugError::InvalidSchema(_))
        ));
    }

    #[test]
    fn definition_check_rejects_bad_defaults() {
        let on_required = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .default(StaticDefault::string("x"))
                    .build(),
            )
            .build();
        assert!(on_required.check_definition().is_err());

        let wrong_type = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("ratio", AttributeType::Int)
                    .optional()
                    .default(StaticDefault::string("25"))
                    .build(),
            )
            .build();
        assert!(wrong_type.check_definition().is_err());
    }

    #[test]
    fn validate_config_reports_missing_and_invalid_values() {
        let schema = template_schema();
        let diags = schema.validate_config(&config(Dynamic::object([
            ("min_nodes", Dynamic::Int(-1)),
        ])));

        assert!(has_errors(&diags));
        assert!(diags.iter().any(|d| d.summary == "Missing required argument"));
        assert!(diags.iter().any(|d| d.summary.contains("at least 0")));
    }

    #[test]
    fn validate_config_rejects_type_mismatch_and_computed_values() {
        let schema = template_schema();
        let diags = schema.validate_config(&config(Dynamic::object([
            ("cluster_id", Dynamic::from("b6bfc074-a267-400f-b8f1-db0850c369b1")),
            ("min_nodes", Dynamic::from("three")),
            ("version", Dynamic::Int(3)),
        ])));

        assert_eq!(diags.len(), 2);
        assert!(diags.iter().any(|d| d.summary == "Incorrect attribute value type"));
        assert!(diags.iter().any(|d| d.summary == "Value for unconfigurable attribute"));
    }

    #[test]
    fn validate_config_enforces_block_counts() {
        let schema = template_schema();
        let taint = Dynamic::object([("key", Dynamic::from("k"))]);
        let diags = schema.validate_config(&config(Dynamic::object([
            ("cluster_id", Dynamic::from("b6bfc074-a267-400f-b8f1-db0850c369b1")),
            ("taint", Dynamic::List(vec![taint.clone(), taint.clone(), taint])),
        ])));

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Too many blocks");
    }

    #[test]
    fn normalize_fills_empty_values_and_drops_unknown_fields() {
        let schema = template_schema();
        let state = schema.normalize_state(config(Dynamic::object([
            ("cluster_id", Dynamic::from("c")),
            ("serverOnly", Dynamic::from("x")),
        ])));

        let entries = state.value.as_entries().unwrap();
        assert!(!entries.contains_key("serverOnly"));
        assert_eq!(entries.get("min_nodes"), Some(&Dynamic::Int(0)));
        assert_eq!(entries.get("labels"), Some(&Dynamic::Map(HashMap::new())));
        assert_eq!(entries.get("taint"), Some(&Dynamic::List(vec![])));
    }

    #[test]
    fn conform_restores_declared_container_kinds() {
        let t = AttributeType::set_of(AttributeType::String);
        assert!(matches!(
            t.conform(Dynamic::string_list(["a"])),
            Dynamic::Set(_)
        ));

        let m = AttributeType::map_of(AttributeType::String);
        assert!(matches!(
            m.conform(Dynamic::object([("k", Dynamic::from("v"))])),
            Dynamic::Map(_)
        ));
    }
}
