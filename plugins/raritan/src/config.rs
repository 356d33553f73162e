use anyhow::Context;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Prefix of the metric keys when none is configured.
pub const DEFAULT_METRIC_KEY_PREFIX: &str = "raritan";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host (and optional port) of the PDU, ex. `pdu-3.example:443`.
    ///
    /// A full base URL such as `http://127.0.0.1:8080` is also accepted.
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub metric_key_prefix: String,
    /// Skip the verification of the TLS certificate of the PDU.
    pub allow_insecure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::from("localhost"),
            username: String::from("admin"),
            password: String::from("raritan"),
            metric_key_prefix: String::from(DEFAULT_METRIC_KEY_PREFIX),
            allow_insecure: true,
        }
    }
}

impl Config {
    /// Returns the URL of the bulk endpoint of the PDU.
    pub fn bulk_url(&self) -> anyhow::Result<Url> {
        let endpoint = self.endpoint.trim_end_matches('/');
        let url = if endpoint.contains("://") {
            format!("{endpoint}/bulk")
        } else {
            format!("https://{endpoint}/bulk")
        };
        Url::parse(&url).with_context(|| format!("invalid endpoint '{}'", self.endpoint))
    }
}
