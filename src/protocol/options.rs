//! Dynamic field options
//!
//! Options form a tree of labels. A label maps either to a selectable value or
//! to a category holding more options; categories themselves cannot be
//! selected. Labels are unique per level, so adding a label twice replaces the
//! earlier entry, and the order of entries on the wire is unspecified.

use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

/// One entry of a [`DynamicOption`] tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionEntry {
    /// A selectable value
    Leaf(String),
    /// A group of nested options
    Category(DynamicOption),
}

/// Result of a dynamic field options request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicOption {
    entries: HashMap<String, OptionEntry>,
}

impl DynamicOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selectable value labelled `label`
    pub fn add_string(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries
            .insert(label.into(), OptionEntry::Leaf(value.into()));
        self
    }

    /// Add a category of nested options labelled `label`
    pub fn add_category(&mut self, label: impl Into<String>, options: DynamicOption) -> &mut Self {
        self.entries
            .insert(label.into(), OptionEntry::Category(options));
        self
    }

    pub fn get(&self, label: &str) -> Option<&OptionEntry> {
        self.entries.get(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(serde::Serialize)]
struct WireOption<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a DynamicOption>,
}

impl Serialize for DynamicOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|(label, entry)| match entry {
            OptionEntry::Leaf(value) => WireOption {
                label,
                value: Some(value),
                values: None,
            },
            OptionEntry::Category(children) => WireOption {
                label,
                value: None,
                values: Some(children),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::encode_success;
    use serde_json::{Value, json};

    fn sorted_by_label(value: &Value) -> Vec<Value> {
        let mut items = value.as_array().cloned().unwrap_or_default();
        items.sort_by_key(|item| item["label"].as_str().unwrap_or_default().to_string());
        items
    }

    #[test]
    fn test_nested_options() {
        let mut bar = DynamicOption::new();
        bar.add_string("baz", "456");

        let mut options = DynamicOption::new();
        options.add_string("foo", "123").add_category("bar", bar);

        let value: Value = serde_json::from_slice(&encode_success(&options).unwrap()).unwrap();
        assert_eq!(
            sorted_by_label(&value["data"]),
            vec![
                json!({ "label": "bar", "values": [{ "label": "baz", "value": "456" }] }),
                json!({ "label": "foo", "value": "123" }),
            ]
        );
    }

    #[test]
    fn test_duplicate_label_overwrites() {
        let mut options = DynamicOption::new();
        options.add_string("foo", "1").add_string("foo", "2");
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("foo"), Some(&OptionEntry::Leaf("2".to_string())));
    }

    #[test]
    fn test_empty_options_encode_as_empty_list() {
        let bytes = encode_success(&DynamicOption::new()).unwrap();
        insta::assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"{"data":[]}"#);
    }
}
