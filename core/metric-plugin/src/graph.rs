//! Graph definitions: the metadata a plugin declares about its metrics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// All the graphs of a plugin, by graph name.
///
/// A `BTreeMap` keeps the output of the plugin stable from one run to the next.
pub type GraphDefinition = BTreeMap<String, Graph>;

/// A graph, which groups one or more metrics that share a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Human-readable title of the graph.
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<Metric>,
}

/// A metric that appears in a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Name of the metric, used as the last component of the metric key.
    /// It must match a key of the map returned by
    /// [`MetricPlugin::fetch_metrics`](crate::MetricPlugin::fetch_metrics).
    pub name: String,
    /// Legend of the metric, often the physical unit of the value.
    pub label: String,
    #[serde(default)]
    pub stacked: bool,
}

impl Graph {
    pub fn new(label: impl Into<String>, unit: Unit) -> Self {
        Self {
            label: label.into(),
            unit,
            metrics: Vec::new(),
        }
    }

    /// Adds a non-stacked metric to the graph.
    pub fn with_metric(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        self.metrics.push(Metric {
            name: name.into(),
            label: label.into(),
            stacked: false,
        });
        self
    }
}

/// Upper-cases the first letter of every word.
///
/// Letters, digits and underscores belong to a word, any other character
/// starts a new one: `"my-pdu"` becomes `"My-Pdu"`.
pub fn title_case(s: &str) -> String {
    let mut at_word_start = true;
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        if at_word_start {
            res.extend(c.to_uppercase());
        } else {
            res.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    res
}
