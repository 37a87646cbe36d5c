//! NetworkFetcher port - HTTP GET
//!
//! # 実装
//! - **ReqwestFetcher**: 本番用（`impls::reqwest_fetcher`）
//! - **ScriptedFetcher**: テスト用（`impls::memory`）

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::domain::NetworkError;

/// Response of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, NetworkError> {
        serde_json::from_slice(&self.body).map_err(|e| NetworkError::InvalidManifest(e.to_string()))
    }
}

/// NetworkFetcher は単発の GET を行う
///
/// # 契約
/// - `timeout` を過ぎたら `NetworkError::Timeout` を返す
/// - `cancel` が発火したらリクエストを中断して `NetworkError::Cancelled` を返す
/// - ステータスコードの判定は呼び出し側が行う（非 2xx でも `Ok` を返す）
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn get(
        &self,
        url: &str,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, NetworkError>;
}
