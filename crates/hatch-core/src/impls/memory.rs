//! In-memory ports - テスト用・開発用の実装
//!
//! # 学習ポイント
//! - スクリプト化した応答で失敗パターンを再現する
//! - 呼び出し記録（recording）で「何が呼ばれたか」を検証する
//! - `std::sync::Mutex` はロックを await 越しに持たない場合だけ使う
//!
//! # 含まれる実装
//! - **ScriptedFetcher**: 応答を順番に返す NetworkFetcher
//! - **InMemoryFileStore**: ファイル名の集合で表現した FileStore
//! - **RecordingLauncher**: 起動要求を記録する InstallerLauncher
//! - **RecordingNotifier**: 通知を記録する NotificationSink
//! - **SteppingClock**: 呼ぶたびに一定量進む Clock

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::domain::{NetworkError, Notice};
use crate::ports::{
    Clock, DownloadResult, FetchResponse, FileStore, InstallIntent, InstallerLauncher,
    LaunchError, NetworkFetcher, NotificationSink, PlatformSupport, ProgressFn, StoreError,
    TransferProgress,
};

/// URI prefix of files held by [`InMemoryFileStore`].
pub const MEMORY_ROOT: &str = "file:///memory/updates/";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ────────────────────────────────────────────────────────────────────────────
// ScriptedFetcher
// ────────────────────────────────────────────────────────────────────────────

/// One scripted reaction of [`ScriptedFetcher`].
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Respond(FetchResponse),
    Fail(NetworkError),
    /// Never answers; resolves only once the request is cancelled.
    Hang,
}

impl ScriptedResponse {
    /// 200 with `{"version": <version>}`
    pub fn manifest(version: &str) -> Self {
        let body = serde_json::json!({ "version": version }).to_string();
        ScriptedResponse::Respond(FetchResponse::new(200, body))
    }

    pub fn status(status: u16) -> Self {
        ScriptedResponse::Respond(FetchResponse::new(status, Vec::new()))
    }
}

/// ScriptedFetcher は登録された応答を先頭から順に返す
///
/// 応答が尽きたら `NetworkError::Transport` を返します。
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<(String, CancellationToken)>>,
}

impl ScriptedFetcher {
    pub fn new(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|(url, _)| url.clone()).collect()
    }

    /// Whether every request made so far had its token cancelled.
    pub fn all_cancelled(&self) -> bool {
        lock(&self.requests).iter().all(|(_, token)| token.is_cancelled())
    }
}

#[async_trait]
impl NetworkFetcher for ScriptedFetcher {
    async fn get(
        &self,
        url: &str,
        _timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<FetchResponse, NetworkError> {
        lock(&self.requests).push((url.to_string(), cancel.clone()));
        let next = lock(&self.script).pop_front();
        match next {
            Some(ScriptedResponse::Respond(response)) => Ok(response),
            Some(ScriptedResponse::Fail(err)) => Err(err),
            Some(ScriptedResponse::Hang) => {
                cancel.cancelled().await;
                Err(NetworkError::Cancelled)
            }
            None => Err(NetworkError::Transport("no scripted response left".into())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryFileStore
// ────────────────────────────────────────────────────────────────────────────

/// One scripted reaction of [`InMemoryFileStore::download`].
#[derive(Debug, Clone)]
pub enum ScriptedTransfer {
    /// Report `progress` in order, then store the file and return its URI.
    Complete { progress: Vec<TransferProgress> },
    /// Store nothing and return a result without a URI.
    NoUri,
    Fail(String),
}

#[derive(Default)]
struct StoreState {
    files: BTreeSet<String>,
    list_error: Option<String>,
    failing_deletes: HashSet<String>,
    transfers: VecDeque<ScriptedTransfer>,
    deleted: Vec<String>,
    downloads: Vec<(String, String)>,
    content_authority: Option<String>,
}

/// InMemoryFileStore はファイル名の集合だけを持つ FileStore
///
/// ダウンロードのスクリプトが尽きたら、進捗なしで成功します。
#[derive(Default)]
pub struct InMemoryFileStore {
    state: Mutex<StoreState>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state)
            .files
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_content_authority(self, authority: &str) -> Self {
        lock(&self.state).content_authority = Some(authority.to_string());
        self
    }

    /// Make `list_dir` fail with `message`.
    pub fn fail_listing(self, message: &str) -> Self {
        lock(&self.state).list_error = Some(message.to_string());
        self
    }

    /// Make deleting `name` fail.
    pub fn fail_delete(self, name: &str) -> Self {
        lock(&self.state).failing_deletes.insert(name.to_string());
        self
    }

    pub fn script_transfers(self, transfers: impl IntoIterator<Item = ScriptedTransfer>) -> Self {
        lock(&self.state).transfers.extend(transfers);
        self
    }

    pub fn uri_for(name: &str) -> String {
        format!("{MEMORY_ROOT}{name}")
    }

    /// Current file names, sorted.
    pub fn files(&self) -> Vec<String> {
        lock(&self.state).files.iter().cloned().collect()
    }

    /// Names passed to successful `delete` calls, in call order.
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.state).deleted.clone()
    }

    /// `(url, file_name)` of every download attempt, in call order.
    pub fn downloads(&self) -> Vec<(String, String)> {
        lock(&self.state).downloads.clone()
    }

    fn name_of(uri: &str) -> Result<&str, StoreError> {
        uri.strip_prefix(MEMORY_ROOT)
            .ok_or_else(|| StoreError::InvalidUri(uri.to_string()))
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn list_dir(&self) -> Result<Vec<String>, StoreError> {
        let state = lock(&self.state);
        match &state.list_error {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(state.files.iter().cloned().collect()),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        if state.failing_deletes.contains(name) {
            return Err(StoreError::Unavailable(format!("cannot delete {name}")));
        }
        state.files.remove(name);
        state.deleted.push(name.to_string());
        Ok(())
    }

    async fn exists(&self, uri: &str) -> Result<bool, StoreError> {
        let name = Self::name_of(uri)?;
        Ok(lock(&self.state).files.contains(name))
    }

    async fn download(
        &self,
        url: &str,
        file_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<DownloadResult, StoreError> {
        let transfer = {
            let mut state = lock(&self.state);
            state.downloads.push((url.to_string(), file_name.to_string()));
            state.transfers.pop_front()
        };

        match transfer.unwrap_or(ScriptedTransfer::Complete { progress: Vec::new() }) {
            ScriptedTransfer::Complete { progress: steps } => {
                for step in steps {
                    progress(step);
                }
                lock(&self.state).files.insert(file_name.to_string());
                Ok(DownloadResult {
                    uri: Some(Self::uri_for(file_name)),
                    status: Some(200),
                })
            }
            ScriptedTransfer::NoUri => Ok(DownloadResult {
                uri: None,
                status: Some(200),
            }),
            ScriptedTransfer::Fail(message) => Err(StoreError::Transfer(message)),
        }
    }

    async fn to_platform_uri(&self, uri: &str) -> Result<String, StoreError> {
        let name = Self::name_of(uri)?;
        match &lock(&self.state).content_authority {
            Some(authority) => Ok(format!("content://{authority}/{name}")),
            None => Ok(uri.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RecordingLauncher / RecordingNotifier / SteppingClock
// ────────────────────────────────────────────────────────────────────────────

/// RecordingLauncher は起動要求を記録し、設定された結果を返す
pub struct RecordingLauncher {
    support: PlatformSupport,
    failure: Option<LaunchError>,
    launched: Mutex<Vec<InstallIntent>>,
}

impl RecordingLauncher {
    pub fn supported() -> Self {
        Self {
            support: PlatformSupport::Supported,
            failure: None,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported(platform: &str) -> Self {
        Self {
            support: PlatformSupport::Unsupported {
                platform: platform.to_string(),
            },
            ..Self::supported()
        }
    }

    /// Every launch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(LaunchError::new(message)),
            ..Self::supported()
        }
    }

    pub fn launched(&self) -> Vec<InstallIntent> {
        lock(&self.launched).clone()
    }
}

#[async_trait]
impl InstallerLauncher for RecordingLauncher {
    fn platform_support(&self) -> PlatformSupport {
        self.support.clone()
    }

    async fn launch(&self, intent: &InstallIntent) -> Result<(), LaunchError> {
        lock(&self.launched).push(intent.clone());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

/// SteppingClock は呼ぶたびに `step` だけ進む
///
/// リトライごとに別のファイル名になることをテストで確認するために使います。
pub struct SteppingClock {
    next_ms: AtomicI64,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start_ms: i64, step: Duration) -> Self {
        Self {
            next_ms: AtomicI64::new(start_ms),
            step_ms: i64::try_from(step.as_millis()).unwrap_or(i64::MAX),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.next_ms.fetch_add(self.step_ms, Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_fetcher_replays_in_order() {
        let fetcher = ScriptedFetcher::new([
            ScriptedResponse::status(503),
            ScriptedResponse::manifest("1.0.0"),
        ]);
        let timeout = Duration::from_secs(1);

        let first = fetcher.get("u", timeout, CancellationToken::new()).await.unwrap();
        let second = fetcher.get("u", timeout, CancellationToken::new()).await.unwrap();
        let third = fetcher.get("u", timeout, CancellationToken::new()).await;

        assert_eq!(first.status, 503);
        assert!(second.is_success());
        assert!(matches!(third, Err(NetworkError::Transport(_))));
        assert_eq!(fetcher.request_count(), 3);
    }

    #[tokio::test]
    async fn memory_store_delete_is_idempotent() {
        let store = InMemoryFileStore::new().with_files(["a.apk"]);
        store.delete("a.apk").await.unwrap();
        store.delete("a.apk").await.unwrap();
        assert!(store.files().is_empty());
        assert_eq!(store.deleted(), vec!["a.apk", "a.apk"]);
    }

    #[tokio::test]
    async fn memory_store_translates_with_authority() {
        let store = InMemoryFileStore::new().with_content_authority("com.example.files");
        let uri = InMemoryFileStore::uri_for("App_v1.apk");
        assert_eq!(
            store.to_platform_uri(&uri).await.unwrap(),
            "content://com.example.files/App_v1.apk"
        );
        assert!(store.to_platform_uri("file:///elsewhere/x.apk").await.is_err());
    }

    #[test]
    fn stepping_clock_advances() {
        let clock = SteppingClock::new(1_000, Duration::from_millis(5));
        assert_eq!(clock.now_millis(), 1_000);
        assert_eq!(clock.now_millis(), 1_005);
    }
}
