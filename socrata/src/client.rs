use crate::config::SocrataConfig;
use crate::error::ConfigError;
use crate::error::Result;
use crate::soql;
use async_trait::async_trait;
use permit_finder_engine::Permit;
use permit_finder_engine::PermitQuery;
use permit_finder_engine::PermitSource;
use permit_finder_engine::TransportError;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use tracing::debug;
use tracing::warn;

const APP_TOKEN_HEADER: &str = "X-App-Token";

/// Error body returned by Socrata on a rejected query.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct SocrataClient {
    http: reqwest::Client,
    base_url: String,
    offline: bool,
}

impl SocrataClient {
    pub fn new(config: &SocrataConfig) -> Result<Self> {
        config.validate().map_err(ConfigError::Invalid)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.app_token {
            headers.insert(APP_TOKEN_HEADER, HeaderValue::from_str(token)?);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            offline: config.offline,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PermitSource for SocrataClient {
    async fn query(
        &self,
        query: &PermitQuery,
    ) -> std::result::Result<Vec<Permit>, TransportError> {
        if self.offline {
            return Err(TransportError::Offline);
        }

        let params = soql::params(query);
        debug!("GET {} {params:?}", self.base_url);
        let resp = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| {
                    let text = String::from_utf8_lossy(&body).trim().to_string();
                    if text.is_empty() {
                        status.canonical_reason().unwrap_or_default().to_string()
                    } else {
                        text
                    }
                });
            warn!("permit query rejected: {status} - {message}");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let permits: Vec<Permit> = serde_json::from_slice(&body)
            .map_err(|err| TransportError::Decode(err.to_string()))?;
        debug!("permit query returned {} rows", permits.len());
        Ok(permits)
    }

    fn is_offline(&self) -> bool {
        self.offline
    }
}

/// Timeouts, refused connections and bodies cut off mid-stream are all
/// connectivity failures; only a payload that arrived whole can be malformed.
fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}
