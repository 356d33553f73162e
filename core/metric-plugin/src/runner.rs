//! Text protocol between the plugin and the agent.

use std::{
    collections::BTreeMap,
    io::Write,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use serde::Serialize;

use crate::{graph::Graph, plugin::MetricPlugin};

/// Environment variable set by the agent when it wants the graph definitions
/// instead of the values.
pub const META_ENV_VAR: &str = "MACKEREL_AGENT_PLUGIN_META";

/// First line of the graph definitions output.
pub const META_HEADER: &str = "# mackerel-agent-plugin";

/// Runs a [`MetricPlugin`] once and writes its output.
pub struct Runner<P: MetricPlugin> {
    plugin: P,
}

#[derive(Serialize)]
struct Definitions<'a> {
    graphs: BTreeMap<String, &'a Graph>,
}

impl<P: MetricPlugin> Runner<P> {
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    /// Writes the graph definitions if the agent asked for them, the metric values otherwise.
    pub fn run(&self, out: &mut impl Write) -> anyhow::Result<()> {
        if definitions_requested() {
            log::debug!("{META_ENV_VAR} is set, printing the graph definitions");
            self.output_definitions(out)
        } else {
            self.output_values(out, SystemTime::now())
        }
    }

    /// Writes the meta header followed by the graphs, as JSON.
    pub fn output_definitions(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let prefix = self.plugin.metric_key_prefix();
        let graphs = self.plugin.graph_definition();
        let definitions = Definitions {
            graphs: graphs.iter().map(|(name, g)| (prefixed_key(&prefix, name), g)).collect(),
        };
        let json = serde_json::to_string(&definitions).context("graph definitions serialization failed")?;
        writeln!(out, "{META_HEADER}")?;
        writeln!(out, "{json}")?;
        Ok(())
    }

    /// Fetches the metrics once and writes one `key\tvalue\ttimestamp` line per metric.
    ///
    /// Only the metrics that are declared in a graph are written, and a declared
    /// metric that is missing from the fetched values is skipped.
    /// Nothing is written if the fetch fails.
    pub fn output_values(&self, out: &mut impl Write, now: SystemTime) -> anyhow::Result<()> {
        let values = self.plugin.fetch_metrics().context("failed to fetch metrics")?;
        let timestamp = now.duration_since(UNIX_EPOCH).context("clock is before the unix epoch")?.as_secs();
        let prefix = self.plugin.metric_key_prefix();

        let mut lines = Vec::with_capacity(values.len());
        for (graph_name, graph) in self.plugin.graph_definition() {
            let graph_key = prefixed_key(&prefix, &graph_name);
            for metric in graph.metrics {
                match values.get(&metric.name) {
                    Some(value) => lines.push(format!("{graph_key}.{}\t{value:.6}\t{timestamp}", metric.name)),
                    None => log::debug!("no value for metric {}, skipping it", metric.name),
                }
            }
        }
        for line in lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

fn definitions_requested() -> bool {
    std::env::var_os(META_ENV_VAR).is_some_and(|v| !v.is_empty())
}

fn prefixed_key(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}.{name}"),
    }
}
