// Typed filter descriptions for the selection view
//
// Every value accepts either a single string or a list of strings on the
// wire; both become a `ValueSet` when deserialized or built.

use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A set of category strings, normalized from a scalar or a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<String>")]
pub struct ValueSet(BTreeSet<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for ValueSet {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => ValueSet(BTreeSet::from([s])),
            OneOrMany::Many(v) => ValueSet(v.into_iter().collect()),
        }
    }
}

impl From<ValueSet> for Vec<String> {
    fn from(set: ValueSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl ValueSet {
    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ValueSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ValueSet(iter.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for ValueSet {
    fn from(value: &str) -> Self {
        std::iter::once(value).collect()
    }
}

impl From<String> for ValueSet {
    fn from(value: String) -> Self {
        std::iter::once(value).collect()
    }
}

impl From<Vec<&str>> for ValueSet {
    fn from(values: Vec<&str>) -> Self {
        values.into_iter().collect()
    }
}

impl<const N: usize> From<[&str; N]> for ValueSet {
    fn from(values: [&str; N]) -> Self {
        values.into_iter().collect()
    }
}

/// Column selection by signal metadata.
///
/// Keys other than `Signal`, `Location` and `Sensor` are kept in
/// `unrecognized` and otherwise ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    #[serde(rename = "Signal", default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<ValueSet>,
    #[serde(rename = "Location", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ValueSet>,
    #[serde(rename = "Sensor", default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<ValueSet>,
    #[serde(flatten, default)]
    pub unrecognized: BTreeMap<String, serde_json::Value>,
}

impl ColumnFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(mut self, values: impl Into<ValueSet>) -> Self {
        self.signal = Some(values.into());
        self
    }

    pub fn location(mut self, values: impl Into<ValueSet>) -> Self {
        self.location = Some(values.into());
        self
    }

    pub fn sensor(mut self, values: impl Into<ValueSet>) -> Self {
        self.sensor = Some(values.into());
        self
    }

    /// Set an attribute by name. Unknown names are recorded, not rejected.
    pub fn with_key(mut self, key: &str, values: impl Into<ValueSet>) -> Self {
        let values = values.into();
        match key {
            SIGNAL_KEY => self.signal = Some(values),
            LOCATION_KEY => self.location = Some(values),
            SENSOR_KEY => self.sensor = Some(values),
            other => {
                let values = serde_json::Value::from(Vec::<String>::from(values));
                self.unrecognized.insert(other.to_string(), values);
            }
        }
        self
    }

    /// The recognized constraints, as (attribute, accepted values).
    pub fn constraints(&self) -> Vec<(&'static str, &ValueSet)> {
        [
            (SIGNAL_KEY, &self.signal),
            (LOCATION_KEY, &self.location),
            (SENSOR_KEY, &self.sensor),
        ]
        .into_iter()
        .filter_map(|(key, values)| values.as_ref().map(|v| (key, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints().is_empty() && self.unrecognized.is_empty()
    }
}

/// Row selection by activity label: class name -> accepted label names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelFilter(BTreeMap<String, ValueSet>);

impl LabelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, labels: impl Into<ValueSet>) -> Self {
        self.0.insert(class.to_string(), labels.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueSet)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Row selection by subject and session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFilter {
    #[serde(rename = "PID", default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<ValueSet>,
    #[serde(rename = "RunID", default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<ValueSet>,
}

impl RunFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pid(mut self, values: impl Into<ValueSet>) -> Self {
        self.pid = Some(values.into());
        self
    }

    pub fn run_id(mut self, values: impl Into<ValueSet>) -> Self {
        self.run_id = Some(values.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        let empty = |v: &Option<ValueSet>| v.as_ref().map_or(true, ValueSet::is_empty);
        empty(&self.pid) && empty(&self.run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_list_values_normalize_to_sets() {
        let filter: ColumnFilter =
            serde_json::from_str(r#"{"Signal": ["accX", "accY"], "Location": "BACK"}"#).unwrap();
        assert_eq!(filter.signal, Some(ValueSet::from(["accX", "accY"])));
        assert_eq!(filter.location, Some(ValueSet::from("BACK")));
        assert!(filter.sensor.is_none());
        assert!(filter.unrecognized.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_kept_aside() {
        let filter: ColumnFilter = serde_json::from_str(r#"{"Unit": "mg"}"#).unwrap();
        assert!(filter.constraints().is_empty());
        assert!(!filter.is_empty());
        assert!(filter.unrecognized.contains_key("Unit"));

        let built = ColumnFilter::new().with_key("Unit", "mg").with_key("Sensor", "IMU");
        assert_eq!(built.constraints().len(), 1);
        assert_eq!(built.unrecognized.len(), 1);
    }

    #[test]
    fn test_label_and_run_filters_from_json() {
        let labels: LabelFilter =
            serde_json::from_str(r#"{"Locomotion": "Stand", "HL_Activity": ["Coffee"]}"#).unwrap();
        assert_eq!(labels.iter().count(), 2);

        let runs: RunFilter = serde_json::from_str(r#"{"PID": "1"}"#).unwrap();
        assert_eq!(runs.pid, Some(ValueSet::from("1")));
        assert!(!runs.is_empty());
        assert!(RunFilter::new().is_empty());
    }
}
