//! UpdateClientBuilder - UpdateClient の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンで ports を差し込む
//! - 起動時検証（Fail-fast 設計）: 設定の不備や未設定の port は build() で弾く
//! - 未設定の port は名前つきでまとめて報告する

use std::sync::Arc;

use super::client::UpdateClient;
use crate::config::{ConfigError, UpdateConfig, UrlBuilder, VERSION_PLACEHOLDER, template_url_builder};
use crate::domain::ArtifactNaming;
use crate::impls::{LocalFileStore, ReqwestFetcher, TracingNotifier, platform_launcher};
use crate::ports::{Clock, FileStore, InstallerLauncher, NetworkFetcher, NotificationSink, SystemClock};

/// UpdateClientBuilder は UpdateClient を構築
///
/// # 使用例
/// ```ignore
/// let client = UpdateClientBuilder::new(config)
///     .with_system_ports()?
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - fetcher / file_store / launcher は必須
/// - notifier と clock は省略時に TracingNotifier / SystemClock
/// - url_builder を渡さない場合は `download_url_template` に `{version}` が必要
pub struct UpdateClientBuilder {
    config: UpdateConfig,
    url_builder: Option<UrlBuilder>,
    fetcher: Option<Arc<dyn NetworkFetcher>>,
    store: Option<Arc<dyn FileStore>>,
    launcher: Option<Arc<dyn InstallerLauncher>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    clock: Option<Arc<dyn Clock>>,
}

/// BuildError は UpdateClient 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These ports must be set before build().")]
    MissingPorts(Vec<&'static str>),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid artifact naming: {0}")]
    InvalidNaming(#[from] regex::Error),

    #[error("download_url_template must contain {{version}} when no url builder is set")]
    MissingUrlTemplate,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("a global update client is already installed")]
    AlreadyInstalled,
}

impl UpdateClientBuilder {
    pub fn new(config: UpdateConfig) -> Self {
        Self {
            config,
            url_builder: None,
            fetcher: None,
            store: None,
            launcher: None,
            notifier: None,
            clock: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn NetworkFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn file_store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn launcher(mut self, launcher: Arc<dyn InstallerLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Derive artifact URLs with `builder` instead of the configured template.
    pub fn url_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.url_builder = Some(Arc::new(builder));
        self
    }

    /// 本番用の ports をまとめて設定
    ///
    /// reqwest の Client は fetcher と file store で共有します。
    pub fn with_system_ports(self) -> Result<Self, BuildError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let store = LocalFileStore::new(self.config.artifact_dir.clone(), client.clone())
            .with_content_authority(self.config.content_authority.clone());
        Ok(self
            .fetcher(Arc::new(ReqwestFetcher::with_client(client)))
            .file_store(Arc::new(store))
            .launcher(platform_launcher()))
    }

    /// 検証してから UpdateClient を生成
    ///
    /// # 検証
    /// - `UpdateConfig::validate`
    /// - url_builder 未設定なら template に `{version}` が含まれること
    /// - fetcher / file_store / launcher が揃っていること
    pub fn build(self) -> Result<UpdateClient, BuildError> {
        self.config.validate()?;
        let naming = ArtifactNaming::new(&self.config.artifact_prefix, &self.config.artifact_ext)?;

        let url_builder = match self.url_builder {
            Some(builder) => builder,
            None if self.config.download_url_template.contains(VERSION_PLACEHOLDER) => {
                template_url_builder(&self.config.download_url_template)
            }
            None => return Err(BuildError::MissingUrlTemplate),
        };

        let mut missing = Vec::new();
        if self.fetcher.is_none() {
            missing.push("fetcher");
        }
        if self.store.is_none() {
            missing.push("file_store");
        }
        if self.launcher.is_none() {
            missing.push("launcher");
        }
        let (Some(fetcher), Some(store), Some(launcher)) = (self.fetcher, self.store, self.launcher)
        else {
            return Err(BuildError::MissingPorts(missing));
        };

        Ok(UpdateClient {
            config: self.config,
            naming,
            url_builder,
            fetcher,
            store,
            launcher,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}
