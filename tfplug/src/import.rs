//! Import identifier parsing
//!
//! Import ids have the shape `<parent>/<key>`, where the key is either the
//! remote identity (a UUID) or a human name that has to be resolved by
//! listing the parent's objects.

use crate::error::{Result, TfplugError};

/// How the key segment of an import id should be resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ImportKey {
    /// The key parses as a UUID and is used as the identity directly
    Identity(String),
    /// The key is a name that must be resolved by listing
    Name(String),
}

impl ImportKey {
    pub fn as_str(&self) -> &str {
        match self {
            ImportKey::Identity(s) | ImportKey::Name(s) => s,
        }
    }
}

/// A parsed `<parent>/<key>` import identifier
#[derive(Debug, Clone, PartialEq)]
pub struct ImportId {
    pub parent: String,
    pub key: ImportKey,
}

impl ImportId {
    /// Parses an import id, naming `expected` in the error on any shape
    /// other than two non-empty segments
    pub fn parse(raw: &str, expected: &str) -> Result<Self> {
        let format_error = || TfplugError::ImportFormat {
            expected: expected.to_string(),
            got: raw.to_string(),
        };

        let mut parts = raw.split('/');
        let (Some(parent), Some(key), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format_error());
        };
        if parent.trim().is_empty() || key.trim().is_empty() {
            return Err(format_error());
        }

        let key = if uuid::Uuid::parse_str(key).is_ok() {
            ImportKey::Identity(key.to_string())
        } else {
            ImportKey::Name(key.to_string())
        };

        Ok(Self {
            parent: parent.to_string(),
            key,
        })
    }
}
