//! Address-history HTTP client.
//!
//! `GET {base}/{address}?limit={L}[&offset={offset}]`, decoded into
//! [`HistoryPage`].

use crate::config::HistoryServiceConfig;
use crate::domain::TransportError;
use crate::ports::{AddressHistorySource, HistoryPage};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// `reqwest`-backed [`AddressHistorySource`].
pub struct HttpHistorySource {
    client: Client,
    base_url: Url,
}

impl HttpHistorySource {
    /// Build a client for `config`.
    pub fn new(config: &HistoryServiceConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TransportError::Http(format!("invalid base URL {}: {e}", config.base_url))
        })?;

        if config.accept_invalid_certs {
            warn!(
                base_url = %base_url,
                "TLS certificate verification disabled for history service"
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL of one history page.
    pub fn page_url(
        &self,
        address: &str,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::Http(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(address);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &limit.to_string());
            if let Some(offset) = offset {
                query.append_pair("offset", &offset.to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl AddressHistorySource for HttpHistorySource {
    async fn fetch_page(
        &self,
        address: &str,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<HistoryPage, TransportError> {
        let url = self.page_url(address, limit, offset)?;
        debug!(url = %url, "GET history page");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str) -> HttpHistorySource {
        HttpHistorySource::new(&HistoryServiceConfig {
            base_url: base_url.to_string(),
            ..HistoryServiceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_first_page_has_no_offset() {
        let url = source("https://blockchain.info/rawaddr")
            .page_url("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", 50, None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://blockchain.info/rawaddr/1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa?limit=50"
        );
    }

    #[test]
    fn test_later_page_carries_offset() {
        let url = source("https://history.test/rawaddr/")
            .page_url("addr", 50, Some(47))
            .unwrap();
        assert_eq!(url.as_str(), "https://history.test/rawaddr/addr?limit=50&offset=47");
    }

    #[test]
    fn test_address_is_path_escaped() {
        let url = source("https://history.test/rawaddr")
            .page_url("a/b c", 50, None)
            .unwrap();
        assert_eq!(url.path(), "/rawaddr/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpHistorySource::new(&HistoryServiceConfig {
            base_url: "not a url".to_string(),
            ..HistoryServiceConfig::default()
        });
        assert!(matches!(result, Err(TransportError::Http(_))));
    }
}
