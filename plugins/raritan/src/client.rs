use reqwest::{
    Url,
    header::{HeaderMap, HeaderValue, InvalidHeaderValue},
};

use crate::{
    error::CallError,
    rpc::{BULK_ID, BatchRequest, BatchResponse, Reading, RpcResponse, Sensor},
};

// Client of the JSON-RPC bulk endpoint of the PDU.
pub struct Client {
    client: reqwest::blocking::Client,
    bulk_url: Url,
}

pub struct ConnectionSettings {
    pub credentials: Credentials,
    /// Full URL of the bulk endpoint, usually `https://{host}/bulk`.
    pub bulk_url: Url,
    /// Accept any certificate and hostname.
    ///
    /// PDUs ship with self-signed certificates, hence this is on by default in the plugin.
    /// It only applies to the HTTP client of this [`Client`], other clients of the process
    /// keep verifying certificates.
    pub allow_insecure: bool,
}

#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

pub fn user_agent_string() -> String {
    let plugin_crate_name = env!("CARGO_PKG_NAME");
    let plugin_version = env!("CARGO_PKG_VERSION");
    let user_agent = format!("{plugin_crate_name}/{plugin_version}");
    log::debug!("Client user agent: {user_agent}");
    user_agent
}

impl Client {
    pub fn new(conn: ConnectionSettings) -> Result<Self, CallError> {
        let mut builder = reqwest::blocking::ClientBuilder::new();
        if conn.allow_insecure {
            log::debug!("TLS certificate verification is disabled for {}", conn.bulk_url);
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let auth = conn
            .credentials
            .into_header_value()
            .map_err(CallError::InvalidCredentials)?;
        builder = builder
            .user_agent(user_agent_string())
            .default_headers(HeaderMap::from_iter([(reqwest::header::AUTHORIZATION, auth)]));
        let client = builder.build().map_err(CallError::Client)?;
        Ok(Self {
            client,
            bulk_url: conn.bulk_url,
        })
    }

    /// Reads the given sensors with a single `performBulk` call.
    ///
    /// There is no retry: any failure is returned to the caller.
    pub fn fetch_readings(&self, sensors: &[Sensor]) -> Result<Vec<Reading>, CallError> {
        let body = BatchRequest::for_sensors(sensors);
        let request = self.client.post(self.bulk_url.clone()).json(&body);
        log::trace!("sending {request:?}");

        let response = request.send().map_err(|source| self.transport_error(source))?;
        log::trace!("got response {response:?}");

        let response = Self::handle_response(response)?;
        let text = response.text().map_err(|source| self.transport_error(source))?;
        log::trace!("response body: {text}");

        let envelope: RpcResponse<BatchResponse> = serde_json::from_str(&text)?;
        if envelope.id != Some(BULK_ID) {
            log::warn!("bulk response has id {:?}, expected {BULK_ID}", envelope.id);
        }
        let batch = envelope.into_result()?;
        log::debug!("bulk response contains {} replies", batch.responses.len());
        batch.into_readings(sensors)
    }

    fn transport_error(&self, source: reqwest::Error) -> CallError {
        CallError::Transport {
            url: self.bulk_url.to_string(),
            source,
        }
    }

    fn handle_response(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, CallError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // The body is only used to enrich the error message.
        let body = response.text().unwrap_or_default();
        Err(CallError::Status { status, body })
    }
}

impl Credentials {
    pub fn into_header_value(self) -> Result<HeaderValue, InvalidHeaderValue> {
        use base64::prelude::BASE64_STANDARD;
        use base64::write::EncoderWriter;
        use std::io::Write;

        // reqwest::util::basic_auth is not accessible from the outside,
        // and default headers need a ready-made value.
        let mut buf = b"Basic ".to_vec();
        {
            let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
            let _ = write!(encoder, "{}:{}", self.user, self.password);
        }
        let mut header = HeaderValue::from_bytes(&buf)?;
        header.set_sensitive(true);
        Ok(header)
    }
}
