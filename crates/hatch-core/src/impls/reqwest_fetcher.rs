//! ReqwestFetcher - reqwest による NetworkFetcher

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::NetworkError;
use crate::ports::{FetchResponse, NetworkFetcher};

const USER_AGENT: &str = concat!("hatch/", env!("CARGO_PKG_VERSION"));

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Share an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        NetworkError::Transport(err.to_string())
    }
}

#[async_trait]
impl NetworkFetcher for ReqwestFetcher {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, NetworkError> {
        let request = async {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;
            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;
            Ok(FetchResponse::new(status, body.to_vec()))
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NetworkError::Cancelled),
            result = request => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn fetches_status_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/manifest.json");
                then.status(200).body(r#"{"version":"2.0.0"}"#);
            })
            .await;

        let fetcher = ReqwestFetcher::new().unwrap();
        let response = fetcher
            .get(
                &server.url("/manifest.json"),
                Duration::from_secs(5),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"version":"2.0.0"}"#.to_vec());
    }

    #[tokio::test]
    async fn non_success_status_is_not_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/manifest.json");
                then.status(503);
            })
            .await;

        let fetcher = ReqwestFetcher::new().unwrap();
        let response = fetcher
            .get(
                &server.url("/manifest.json"),
                Duration::from_secs(5),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn cancelled_token_aborts_request() {
        let server = MockServer::start_async().await;
        let fetcher = ReqwestFetcher::new().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = fetcher
            .get(&server.url("/slow"), Duration::from_secs(60), cancel)
            .await;
        assert_eq!(result, Err(NetworkError::Cancelled));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(5));
            })
            .await;

        let fetcher = ReqwestFetcher::new().unwrap();
        let result = fetcher
            .get(
                &server.url("/slow"),
                Duration::from_millis(200),
                CancellationToken::new(),
            )
            .await;
        assert!(matches!(result, Err(NetworkError::Timeout { timeout_ms: 200 })));
    }
}
