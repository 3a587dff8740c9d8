use crate::models::record::parse_int;
use crate::models::Amount;
use std::collections::BTreeMap;

/// One value in a call result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNode {
    Data(String),
    Struct(OutputMap),
    /// Occurrences of a dimensioned data structure, in host order
    Array(Vec<OutputMap>),
}

/// Named values returned by the host
///
/// Character fields come back padded to their fixed width; the typed
/// accessors trim before converting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputMap {
    fields: BTreeMap<String, OutputNode>,
}

impl OutputMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, node: OutputNode) {
        self.fields.insert(name.into(), node);
    }

    /// Append one occurrence to the array stored under `name`
    pub fn push_row(&mut self, name: &str, row: OutputMap) {
        match self.fields.get_mut(name) {
            Some(OutputNode::Array(rows)) => rows.push(row),
            _ => {
                self.fields
                    .insert(name.to_string(), OutputNode::Array(vec![row]));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&OutputNode> {
        self.fields.get(name)
    }

    /// Raw text of a scalar, padding included
    pub fn raw(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(OutputNode::Data(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.raw(name).map(str::trim)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.raw(name).and_then(parse_int)
    }

    pub fn amount(&self, name: &str) -> Option<Amount> {
        self.raw(name).and_then(|s| s.parse().ok())
    }

    /// Trimmed text, empty when absent
    pub fn string_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    pub fn int_or_default(&self, name: &str) -> i64 {
        self.int(name).unwrap_or(0)
    }

    pub fn amount_or_default(&self, name: &str) -> Amount {
        self.amount(name).unwrap_or_default()
    }

    pub fn record(&self, name: &str) -> Option<&OutputMap> {
        match self.fields.get(name) {
            Some(OutputNode::Struct(map)) => Some(map),
            // a single occurrence of an array reads the same as a struct
            Some(OutputNode::Array(rows)) => rows.first(),
            _ => None,
        }
    }

    pub fn rows(&self, name: &str) -> &[OutputMap] {
        match self.fields.get(name) {
            Some(OutputNode::Array(rows)) => rows,
            Some(OutputNode::Struct(map)) => std::slice::from_ref(map),
            _ => &[],
        }
    }
}

/// Result of one procedure call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOutput {
    pub procedure: String,
    pub values: OutputMap,
}

impl CallOutput {
    pub fn new(procedure: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            values: OutputMap::new(),
        }
    }

    /// Integer return value of the procedure, if it declared one
    pub fn return_code(&self) -> Option<i64> {
        self.values.int("return")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_trim_padding() {
        let mut map = OutputMap::new();
        map.insert("Make", OutputNode::Data("Toyota      ".into()));
        map.insert("Year", OutputNode::Data("2021".into()));
        map.insert("Price", OutputNode::Data("15999.00".into()));

        assert_eq!(map.raw("Make"), Some("Toyota      "));
        assert_eq!(map.text("Make"), Some("Toyota"));
        assert_eq!(map.int("Year"), Some(2021));
        assert_eq!(map.amount("Price"), Some(Amount::from_cents(1_599_900)));
        assert_eq!(map.int_or_default("Missing"), 0);
        assert_eq!(map.string_or_default("Missing"), "");
    }

    #[test]
    fn test_rows_and_records() {
        let mut row = OutputMap::new();
        row.insert("Period", OutputNode::Data("2024-01".into()));

        let mut map = OutputMap::new();
        map.push_row("Metrics", row.clone());
        map.push_row("Metrics", row.clone());
        map.insert("Summary", OutputNode::Struct(row.clone()));

        assert_eq!(map.rows("Metrics").len(), 2);
        assert_eq!(map.rows("Summary").len(), 1);
        assert!(map.rows("Nothing").is_empty());
        assert_eq!(map.record("Metrics"), Some(&row));
        assert_eq!(map.record("Summary"), Some(&row));
    }
}
