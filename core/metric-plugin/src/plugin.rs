use std::collections::HashMap;

use crate::graph::GraphDefinition;

/// Trait for metric plugins.
///
/// Implement this trait to define your plugin, then give it to a
/// [`Runner`](crate::Runner).
pub trait MetricPlugin {
    /// Declares the graphs of the plugin.
    ///
    /// The agent asks for them once, the values are then matched to the
    /// graphs by metric name.
    fn graph_definition(&self) -> GraphDefinition;

    /// Measures the current value of the metrics, by metric name.
    ///
    /// Metrics that could not be measured should be left out of the map.
    fn fetch_metrics(&self) -> anyhow::Result<HashMap<String, f64>>;

    /// Prefix of every metric key. An empty prefix means no prefix.
    fn metric_key_prefix(&self) -> String {
        String::new()
    }
}
