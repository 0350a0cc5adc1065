//! Typed side table for named extension values.
//!
//! Values are keyed by `(elementId, extensionName)` where the element is a
//! structure, entry, or match-up id. The table replaces ad hoc attribute bags
//! on the elements themselves.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Round of the main structure that qualifiers enter.
pub const ROUND_TARGET: &str = "roundTarget";
/// Path of round numbers that produced a playoff structure.
pub const PLAYOFF_PATH: &str = "playoffPath";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionTable {
    values: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ExtensionTable {
    pub fn get(&self, element_id: &str, name: &str) -> Option<&Value> {
        self.values.get(element_id).and_then(|named| named.get(name))
    }

    pub fn set(&mut self, element_id: impl Into<String>, name: impl Into<String>, value: Value) {
        self.values
            .entry(element_id.into())
            .or_default()
            .insert(name.into(), value);
    }

    pub fn remove(&mut self, element_id: &str, name: &str) -> Option<Value> {
        let named = self.values.get_mut(element_id)?;
        let removed = named.remove(name);
        if named.is_empty() {
            self.values.remove(element_id);
        }
        removed
    }

    /// All extensions attached to one element.
    pub fn for_element(&self, element_id: &str) -> impl Iterator<Item = (&String, &Value)> {
        self.values.get(element_id).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn merge(&mut self, other: ExtensionTable) {
        for (element_id, named) in other.values {
            self.values.entry(element_id).or_default().extend(named);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let mut table = ExtensionTable::default();
        table.set("s1", ROUND_TARGET, json!(1));
        assert_eq!(table.get("s1", ROUND_TARGET), Some(&json!(1)));
        assert_eq!(table.get("s2", ROUND_TARGET), None);

        assert_eq!(table.remove("s1", ROUND_TARGET), Some(json!(1)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let mut table = ExtensionTable::default();
        table.set("s1", PLAYOFF_PATH, json!([1, 2]));
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value, json!({ "s1": { "playoffPath": [1, 2] } }));
    }
}
