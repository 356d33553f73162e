use std::collections::HashMap;

use anyhow::Context;
use metric_plugin::{
    MetricPlugin,
    graph::{Graph, GraphDefinition, title_case},
    units::Unit,
};

use crate::{
    client::{Client, ConnectionSettings, Credentials},
    config::{Config, DEFAULT_METRIC_KEY_PREFIX},
    rpc::{PDU_SENSORS, Reading},
};

/// Exposes the power readings of a PDU as metrics.
pub struct RaritanPlugin {
    config: Config,
}

impl RaritanPlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Creates a new client: nothing is kept from one poll to the next.
    fn client(&self) -> anyhow::Result<Client> {
        let bulk_url = self.config.bulk_url()?;
        let client = Client::new(ConnectionSettings {
            credentials: Credentials {
                user: self.config.username.clone(),
                password: self.config.password.clone(),
            },
            bulk_url,
            allow_insecure: self.config.allow_insecure,
        })?;
        Ok(client)
    }
}

impl MetricPlugin for RaritanPlugin {
    fn graph_definition(&self) -> GraphDefinition {
        let label_prefix = title_case(&self.metric_key_prefix());
        GraphDefinition::from([
            (
                String::from("ApparentPower"),
                Graph::new(format!("{label_prefix} Apparent Power"), Unit::Float).with_metric("ApparentPower", "VA"),
            ),
            (
                String::from("ActivePower"),
                Graph::new(format!("{label_prefix} Active Power"), Unit::Float).with_metric("ActivePower", "Watts"),
            ),
        ])
    }

    fn fetch_metrics(&self) -> anyhow::Result<HashMap<String, f64>> {
        let readings = self
            .client()
            .context("failed to initialize PDU client")?
            .fetch_readings(PDU_SENSORS)
            .with_context(|| format!("failed to read the sensors of {}", self.config.endpoint))?;
        Ok(readings_to_metrics(readings))
    }

    fn metric_key_prefix(&self) -> String {
        if self.config.metric_key_prefix.is_empty() {
            String::from(DEFAULT_METRIC_KEY_PREFIX)
        } else {
            self.config.metric_key_prefix.clone()
        }
    }
}

/// Folds the readings into a map of metric values.
///
/// Readings without caption are dropped. If two readings have the same caption, the last one wins.
fn readings_to_metrics(readings: Vec<Reading>) -> HashMap<String, f64> {
    let mut metrics = HashMap::with_capacity(readings.len());
    for Reading { caption, value } in readings {
        if caption.is_empty() {
            log::warn!("dropping reading {value} of an unknown sensor");
            continue;
        }
        if let Some(previous) = metrics.insert(caption, value) {
            log::debug!("overwriting previous reading {previous} with {value}");
        }
    }
    metrics
}
