//! Contract between a metrics agent and its plugins.
//!
//! The agent runs the plugin executable periodically. On each run, the plugin
//! fetches its metrics once, prints them on the standard output and exits.
//! When the agent needs to know how to draw the metrics, it sets
//! [`runner::META_ENV_VAR`] and the plugin prints its graph definitions instead.
//!
//! # Example
//! ```no_run
//! use std::collections::HashMap;
//! use metric_plugin::{graph::{Graph, GraphDefinition}, units::Unit, MetricPlugin, Runner};
//!
//! struct Dice;
//!
//! impl MetricPlugin for Dice {
//!     fn graph_definition(&self) -> GraphDefinition {
//!         GraphDefinition::from([("dice".to_string(), Graph::new("Dice", Unit::Integer).with_metric("d6", "Face"))])
//!     }
//!
//!     fn fetch_metrics(&self) -> anyhow::Result<HashMap<String, f64>> {
//!         Ok(HashMap::from([("d6".to_string(), 4.0)]))
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     Runner::new(Dice).run(&mut std::io::stdout().lock())
//! }
//! ```

pub mod graph;
mod plugin;
pub mod runner;
pub mod units;

pub use plugin::MetricPlugin;
pub use runner::Runner;
