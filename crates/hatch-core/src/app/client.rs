//! UpdateClient - バージョン確認・古い artifact の掃除・ダウンロード・インストール
//!
//! # 学習ポイント
//! - ports（trait object）を組み合わせてユースケースを組み立てる
//! - リトライは `retry_with_policy` に任せ、ここでは 1 回分の試行だけを書く
//! - 失敗時の通知は「最終的な失敗」でだけ出す
//!
//! # 状態
//! UpdateClient は可変状態を持ちません。設定と ports だけを保持するので、
//! `&self` のまま複数の呼び出し元から使えます（呼び出し同士の調停はしない）。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::retry::retry_with_policy;
use crate::config::{UpdateConfig, UrlBuilder};
use crate::domain::{
    ArtifactNaming, DownloadError, InstallError, NetworkError, Notice, RemoteManifest,
    UpdateError, VersionInfo, is_update_available,
};
use crate::ports::{
    Clock, FileStore, InstallIntent, InstallerLauncher, NetworkFetcher, NotificationSink,
    PlatformSupport, ProgressFn, TransferProgress,
};

/// Caller-side progress callback receiving an integer percentage.
pub type PercentFn<'a> = &'a (dyn Fn(u64) + Send + Sync);

/// Result of [`UpdateClient::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { current: String },
    Installed { version: String, file_uri: String },
}

pub struct UpdateClient {
    pub(super) config: UpdateConfig,
    pub(super) naming: ArtifactNaming,
    pub(super) url_builder: UrlBuilder,
    pub(super) fetcher: Arc<dyn NetworkFetcher>,
    pub(super) store: Arc<dyn FileStore>,
    pub(super) launcher: Arc<dyn InstallerLauncher>,
    pub(super) notifier: Arc<dyn NotificationSink>,
    pub(super) clock: Arc<dyn Clock>,
}

impl UpdateClient {
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    pub fn current_version(&self) -> &str {
        &self.config.current_version
    }

    /// Whether `remote_version` is newer than the running build.
    pub fn is_update_available(&self, remote_version: &str) -> bool {
        is_update_available(remote_version, &self.config.current_version)
    }

    /// Fetch the remote manifest, retrying with linear backoff.
    ///
    /// Each attempt is bounded by `check_timeout_ms`. After the last failed
    /// attempt the "check failed" notice is shown and the last error returned.
    pub async fn check_version(&self) -> Result<VersionInfo, NetworkError> {
        info!(url = %self.config.manifest_url, "checking for updates");
        let result = retry_with_policy(&self.config.check_retry, "check_version", move |_| {
            self.fetch_version_once()
        })
        .await;

        match result {
            Ok(info) => {
                info!(version = %info.version, current = %self.config.current_version, "remote version fetched");
                Ok(info)
            }
            Err(err) => {
                self.notifier.notify(Notice::check_failed());
                Err(err)
            }
        }
    }

    async fn fetch_version_once(&self) -> Result<VersionInfo, NetworkError> {
        let timeout = self.config.check_timeout();
        let cancel = CancellationToken::new();
        let request = self
            .fetcher
            .get(&self.config.manifest_url, timeout, cancel.clone());

        let response = match tokio::time::timeout(timeout, request).await {
            Ok(response) => response?,
            Err(_) => {
                cancel.cancel();
                return Err(NetworkError::Timeout {
                    timeout_ms: self.config.check_timeout_ms,
                });
            }
        };
        if !response.is_success() {
            return Err(NetworkError::Status {
                status: response.status,
            });
        }

        let manifest: RemoteManifest = response.json()?;
        Ok(VersionInfo {
            download_url: (self.url_builder)(&manifest.version),
            version: manifest.version,
        })
    }

    /// [`check_version`](Self::check_version), keeping the result only when it
    /// is newer than the running build.
    pub async fn check_for_update(&self) -> Result<Option<VersionInfo>, NetworkError> {
        let info = self.check_version().await?;
        if self.is_update_available(&info.version) {
            Ok(Some(info))
        } else {
            info!(current = %self.config.current_version, "already up to date");
            Ok(None)
        }
    }

    /// Delete all but the newest `keep_latest` artifacts.
    ///
    /// Best-effort: nothing here is surfaced to the caller. Returns how many
    /// files were deleted.
    pub async fn clean_old_artifacts(&self) -> usize {
        let names = match self.store.list_dir().await {
            Ok(names) => names,
            Err(err) => {
                warn!(error = %err, "cannot list artifact directory, skipping cleanup");
                return 0;
            }
        };

        let stale = self.naming.select_stale(&names, self.config.keep_latest);
        if stale.is_empty() {
            debug!(entries = names.len(), "no stale artifacts");
            return 0;
        }

        info!(count = stale.len(), keep = self.config.keep_latest, "removing stale artifacts");
        let mut deleted = 0;
        for name in stale {
            match self.store.delete(name).await {
                Ok(()) => {
                    debug!(file = name, "deleted stale artifact");
                    deleted += 1;
                }
                Err(err) => warn!(file = name, error = %err, "failed to delete stale artifact"),
            }
        }
        deleted
    }

    /// Download `url` into the artifact directory and return the file URI.
    ///
    /// Cleanup runs once first. Every attempt writes to a freshly named file.
    /// `on_progress` receives whole percentages while the total size is known.
    pub async fn download_artifact(
        &self,
        url: &str,
        on_progress: Option<PercentFn<'_>>,
    ) -> Result<String, DownloadError> {
        self.clean_old_artifacts().await;

        let forward = move |progress: TransferProgress| {
            if let (Some(callback), Some(percent)) = (on_progress, progress.percent()) {
                callback(percent);
            }
        };
        let forward: ProgressFn<'_> = &forward;

        info!(url, "downloading update");
        let result = retry_with_policy(
            &self.config.download_retry,
            "download_artifact",
            move |attempt| {
                let file_name = self.naming.file_name(self.clock.now_millis());
                debug!(attempt, file = %file_name, "starting transfer");
                self.download_once(url, file_name, forward)
            },
        )
        .await;

        match result {
            Ok(uri) => {
                info!(uri = %uri, "update downloaded");
                Ok(uri)
            }
            Err(err) => {
                self.notifier.notify(Notice::download_failed());
                Err(err)
            }
        }
    }

    async fn download_once(
        &self,
        url: &str,
        file_name: String,
        progress: ProgressFn<'_>,
    ) -> Result<String, DownloadError> {
        let result = self.store.download(url, &file_name, progress).await?;
        result.uri.ok_or(DownloadError::MissingUri { file_name })
    }

    /// Hand the artifact at `file_uri` to the platform installer.
    ///
    /// One-shot: every failure shows a notice matching its cause and is
    /// returned as is.
    pub async fn install_artifact(&self, file_uri: &str) -> Result<(), InstallError> {
        let result = self.try_install(file_uri).await;
        if let Err(err) = &result {
            error!(uri = file_uri, error = %err, "install failed");
            self.notifier.notify(Notice::for_install_error(err));
        }
        result
    }

    async fn try_install(&self, file_uri: &str) -> Result<(), InstallError> {
        // verifying-existence
        let exists = self
            .store
            .exists(file_uri)
            .await
            .map_err(|e| InstallError::launch(e.to_string()))?;
        if !exists {
            return Err(InstallError::NotFound {
                uri: file_uri.to_string(),
            });
        }

        if let PlatformSupport::Unsupported { platform } = self.launcher.platform_support() {
            return Err(InstallError::Unsupported { platform });
        }

        // translating-uri
        let platform_uri = self
            .store
            .to_platform_uri(file_uri)
            .await
            .map_err(|e| InstallError::launch(e.to_string()))?;

        // launching
        let intent = InstallIntent::view_package(platform_uri);
        self.launcher
            .launch(&intent)
            .await
            .map_err(|e| InstallError::launch(e.message))?;
        info!(uri = %intent.data_uri, "installer launched");
        Ok(())
    }

    /// Check, and when a newer version exists download and install it.
    pub async fn update(&self, on_progress: Option<PercentFn<'_>>) -> Result<UpdateOutcome, UpdateError> {
        let Some(info) = self.check_for_update().await? else {
            return Ok(UpdateOutcome::UpToDate {
                current: self.config.current_version.clone(),
            });
        };

        let file_uri = self.download_artifact(&info.download_url, on_progress).await?;
        self.install_artifact(&file_uri).await?;
        Ok(UpdateOutcome::Installed {
            version: info.version,
            file_uri,
        })
    }
}
