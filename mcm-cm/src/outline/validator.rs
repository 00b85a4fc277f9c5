//! Outline document validation
//!
//! Validation runs on the raw JSON value rather than a typed deserialize so
//! each rule can reject with its own error. Any violation rejects the whole
//! outline; nothing is written until validation passes.

use mcm_common::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// One desired content item within a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub key: String,
    pub title: String,
    pub content_type: String,
}

/// A validated outline: role name → ordered item list
///
/// Keys are unique across ALL roles combined; they form a per-node
/// namespace, not a per-role one.
#[derive(Debug, Clone, Default)]
pub struct ValidatedOutline {
    pub roles: BTreeMap<String, Vec<OutlineItem>>,
}

/// Validate an outline document
pub fn validate(outline: &Value) -> Result<ValidatedOutline> {
    let roles_value = outline
        .get("roles")
        .ok_or_else(|| Error::InvalidShape("outline must contain a 'roles' object".to_string()))?;
    let roles_map = roles_value.as_object().ok_or_else(|| {
        Error::InvalidShape("outline 'roles' must be an object mapping role names to item lists".to_string())
    })?;

    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut validated = ValidatedOutline::default();

    for (role, items_value) in roles_map {
        let items_array = items_value.as_array().ok_or_else(|| {
            Error::InvalidShape(format!("role '{}' must be an array of items", role))
        })?;

        let mut items = Vec::with_capacity(items_array.len());
        for (index, item_value) in items_array.iter().enumerate() {
            let item = item_value.as_object().ok_or_else(|| {
                Error::InvalidShape(format!("item {} in role '{}' must be an object", index, role))
            })?;

            let key = require_string(item, "key", role, index)?;
            let title = require_string(item, "title", role, index)?;
            let content_type = require_string(item, "contentType", role, index)?;

            if !seen_keys.insert(key.clone()) {
                return Err(Error::DuplicateKey(key));
            }

            items.push(OutlineItem { key, title, content_type });
        }
        validated.roles.insert(role.clone(), items);
    }

    Ok(validated)
}

fn require_string(
    item: &serde_json::Map<String, Value>,
    field: &str,
    role: &str,
    index: usize,
) -> Result<String> {
    match item.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(Error::MissingField(format!(
            "item {} in role '{}' requires a non-empty '{}'",
            index, role, field
        ))),
    }
}
