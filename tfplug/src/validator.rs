use crate::schema::AttributeType;
use crate::types::{AttributePath, Diagnostic, Dynamic};
use std::sync::Arc;

/// Validator checks one configured attribute value
///
/// Validators only see known, non-null values. `accepts` is consulted when a
/// schema is registered so a validator attached to an attribute of the wrong
/// type is rejected before any configuration is checked.
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Whether this validator can run against values of the given type
    fn accepts(&self, attribute_type: &AttributeType) -> bool;
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

fn invalid(path: &AttributePath, summary: String, detail: String) -> Diagnostic {
    Diagnostic::error(summary, detail).with_attribute(path.clone())
}

pub struct StringNotWhitespace;

impl StringNotWhitespace {
    pub fn create() -> Arc<dyn Validator> {
        Arc::new(Self)
    }
}

impl Validator for StringNotWhitespace {
    fn description(&self) -> String {
        "must not be empty or consisting entirely of whitespace characters".to_string()
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::String)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if s.trim().is_empty() {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Got {:?}", s),
                ));
            }
        }
    }
}

pub struct IsUuid;

impl IsUuid {
    pub fn create() -> Arc<dyn Validator> {
        Arc::new(Self)
    }
}

impl Validator for IsUuid {
    fn description(&self) -> String {
        "must be a valid UUID".to_string()
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::String)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if uuid::Uuid::parse_str(s).is_err() {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Value {:?} is not a UUID", s),
                ));
            }
        }
    }
}

pub struct StringInSlice {
    pub allowed: Vec<String>,
}

impl StringInSlice {
    pub fn create(allowed: &[&str]) -> Arc<dyn Validator> {
        Arc::new(Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl Validator for StringInSlice {
    fn description(&self) -> String {
        format!("must be one of [{}]", self.allowed.join(", "))
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::String)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if !self.allowed.iter().any(|a| a == s) {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Got {:?}", s),
                ));
            }
        }
    }
}

pub struct StringPattern {
    pub pattern: regex::Regex,
    pub description: String,
}

impl StringPattern {
    pub fn create(pattern: regex::Regex, description: &str) -> Arc<dyn Validator> {
        Arc::new(Self {
            pattern,
            description: description.to_string(),
        })
    }
}

impl Validator for StringPattern {
    fn description(&self) -> String {
        format!("must match {}", self.description)
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::String)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_str() {
            if !self.pattern.is_match(s) {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Value {:?} does not match pattern", s),
                ));
            }
        }
    }
}

pub struct IntRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntRange {
    pub fn at_least(min: i64) -> Arc<dyn Validator> {
        Arc::new(Self {
            min: Some(min),
            max: None,
        })
    }

    pub fn between(min: i64, max: i64) -> Arc<dyn Validator> {
        Arc::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }
}

impl Validator for IntRange {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
            (Some(min), None) => format!("must be at least {}", min),
            (None, Some(max)) => format!("must be at most {}", max),
            (None, None) => "any integer".to_string(),
        }
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::Int)
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(n) = value.as_int() {
            let below = self.min.is_some_and(|min| n < min);
            let above = self.max.is_some_and(|max| n > max);
            if below || above {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Got {}", n),
                ));
            }
        }
    }
}

pub struct ListLength {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ListLength {
    pub fn between(min: usize, max: usize) -> Arc<dyn Validator> {
        Arc::new(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn at_least(min: usize) -> Arc<dyn Validator> {
        Arc::new(Self {
            min: Some(min),
            max: None,
        })
    }
}

impl Validator for ListLength {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("must have between {} and {} items", min, max),
            (Some(min), None) => format!("must have at least {} items", min),
            (None, Some(max)) => format!("must have at most {} items", max),
            (None, None) => "any number of items".to_string(),
        }
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        matches!(attribute_type, AttributeType::List(_) | AttributeType::Set(_))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(items) = value.as_elements() {
            let short = self.min.is_some_and(|min| items.len() < min);
            let long = self.max.is_some_and(|max| items.len() > max);
            if short || long {
                diagnostics.push(invalid(
                    path,
                    format!("{} {}", path, self.description()),
                    format!("Got {} items", items.len()),
                ));
            }
        }
    }
}

/// Applies an element validator to every item of a list or set
pub struct Each {
    pub inner: Arc<dyn Validator>,
}

impl Each {
    pub fn create(inner: Arc<dyn Validator>) -> Arc<dyn Validator> {
        Arc::new(Self { inner })
    }
}

impl Validator for Each {
    fn description(&self) -> String {
        format!("each element {}", self.inner.description())
    }

    fn accepts(&self, attribute_type: &AttributeType) -> bool {
        match attribute_type {
            AttributeType::List(elem) | AttributeType::Set(elem) => self.inner.accepts(elem),
            _ => false,
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(items) = value.as_elements() {
            for (i, item) in items.iter().enumerate() {
                if item.is_null() || item.is_unknown() {
                    continue;
                }
                self.inner
                    .validate(item, &path.clone().index(i as i64), diagnostics);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(validator: &Arc<dyn Validator>, value: Dynamic) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        validator.validate(&value, &AttributePath::new("test_field"), &mut diags);
        diags
    }

    #[test]
    fn not_whitespace_rejects_blank_strings() {
        let v = StringNotWhitespace::create();
        assert!(run(&v, Dynamic::from("t1")).is_empty());
        assert_eq!(run(&v, Dynamic::from("   ")).len(), 1);
        assert_eq!(run(&v, Dynamic::from("")).len(), 1);
    }

    #[test]
    fn uuid_validator() {
        let v = IsUuid::create();
        assert!(run(&v, Dynamic::from("b6bfc074-a267-400f-b8f1-db0850c369b1")).is_empty());

        let diags = run(&v, Dynamic::from("cluster-123"));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().map(|p| p.to_string()).as_deref(),
            Some("test_field")
        );
    }

    #[test]
    fn int_range_reports_lower_bound() {
        let v = IntRange::at_least(30);
        assert!(run(&v, Dynamic::Int(100)).is_empty());

        let diags = run(&v, Dynamic::Int(10));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("at least 30"));
    }

    #[test]
    fn each_applies_inner_validator_to_elements() {
        let v = Each::create(StringInSlice::create(&["amd64", "arm64"]));
        assert!(run(&v, Dynamic::string_list(["amd64", "arm64"])).is_empty());

        let diags = run(&v, Dynamic::string_list(["amd64", "s390x"]));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute.as_ref().map(|p| p.to_string()).as_deref(),
            Some("test_field[1]")
        );
    }

    #[test]
    fn validators_declare_accepted_types() {
        assert!(IsUuid::create().accepts(&AttributeType::String));
        assert!(!IsUuid::create().accepts(&AttributeType::Int));
        assert!(ListLength::between(1, 2)
            .accepts(&AttributeType::List(Box::new(AttributeType::String))));
        assert!(!Each::create(IntRange::at_least(0))
            .accepts(&AttributeType::List(Box::new(AttributeType::String))));
    }

    #[test]
    fn list_length_bounds() {
        let v = ListLength::between(1, 2);
        assert_eq!(run(&v, Dynamic::List(vec![])).len(), 1);
        assert!(run(&v, Dynamic::string_list(["amd64"])).is_empty());
        assert_eq!(run(&v, Dynamic::string_list(["a", "b", "c"])).len(), 1);
    }
}
