//! Trade-remedy (Section 301) rate source.
//!
//! Queries the USTR Section 301 investigation document search with the HTS
//! code and extracts the first percentage-like token from the result page.
//! A page with no percentage is a successful lookup reporting 0: the search
//! found no applicable remedy action for that code.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, instrument};

use htsline_core::{defaults, Error, RateQuote, RateSource, Result};

/// First percentage token in the result text, e.g. "25%" or "7.5 %".
static PERCENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").expect("percent token regex is valid"));

/// Rate source backed by the trade-remedy investigation search page.
pub struct RemedySearchSource {
    client: Client,
    base_url: String,
}

impl RemedySearchSource {
    /// Create a source against a specific search endpoint.
    pub fn new(base_url: String) -> Self {
        let timeout = std::env::var("HTSLINE_REMEDY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::REMEDY_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .expect("Failed to create HTTP client");

        info!("Initializing remedy search source: url={}", base_url);

        Self { client, base_url }
    }

    /// Create from environment variables.
    ///
    /// - `HTSLINE_REMEDY_URL`: search endpoint (default: the USTR Section 301
    ///   investigation search)
    /// - `HTSLINE_REMEDY_TIMEOUT_SECS`: request timeout (default 30)
    pub fn from_env() -> Self {
        let base_url = std::env::var("HTSLINE_REMEDY_URL")
            .unwrap_or_else(|_| defaults::REMEDY_SEARCH_URL.to_string());
        Self::new(base_url)
    }
}

#[async_trait]
impl RateSource for RemedySearchSource {
    fn name(&self) -> &str {
        "section_301"
    }

    fn display_name(&self) -> &str {
        "Section 301 tariff"
    }

    #[instrument(skip(self, _description), fields(subsystem = "rates", component = "remedy", op = "lookup", hts_code = hts_code))]
    async fn lookup(&self, hts_code: &str, _description: &str) -> Result<RateQuote> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("search", hts_code)])
            .send()
            .await
            .map_err(|e| Error::Request(format!("Remedy search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "Remedy search returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Request(format!("Failed to read remedy search body: {}", e)))?;

        let quote = match PERCENT_TOKEN
            .captures(&body)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            Some(rate) => RateQuote {
                rate,
                note: Some("USTR Section 301 investigation search".to_string()),
            },
            None => RateQuote {
                rate: 0.0,
                note: Some("No remedy action found for this code".to_string()),
            },
        };

        debug!(
            rate = quote.rate,
            duration_ms = start.elapsed().as_millis() as u64,
            "Remedy lookup complete"
        );
        Ok(quote)
    }
}
