//! LocalFileStore - ローカルディレクトリを使う FileStore
//!
//! # 実装詳細
//! - 一覧・削除は `tokio::fs`
//! - ダウンロードは `bytes_stream()` でチャンクごとに書き込み、累積バイト数を通知
//! - file URI の変換は `url` crate（絶対パスが必要なので、ディレクトリは canonicalize する）
//! - content authority が設定されていれば `content://<authority>/<name>` を返す

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

use crate::ports::{DownloadResult, FileStore, ProgressFn, StoreError, TransferProgress};

pub struct LocalFileStore {
    dir: PathBuf,
    client: reqwest::Client,
    content_authority: Option<String>,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            dir: dir.into(),
            client,
            content_authority: None,
        }
    }

    pub fn with_content_authority(mut self, authority: Option<String>) -> Self {
        self.content_authority = authority;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(uri: &str) -> Result<PathBuf, StoreError> {
        let url = Url::parse(uri).map_err(|e| StoreError::InvalidUri(format!("{uri}: {e}")))?;
        if url.scheme() != "file" {
            return Err(StoreError::InvalidUri(uri.to_string()));
        }
        url.to_file_path()
            .map_err(|()| StoreError::InvalidUri(uri.to_string()))
    }

    async fn transfer(
        &self,
        url: &str,
        path: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<u16, StoreError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Transfer(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Transfer(format!("HTTP {}", status.as_u16())));
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StoreError::Transfer(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            progress(TransferProgress { written, expected });
        }
        file.flush().await?;
        Ok(status.as_u16())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn list_dir(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, uri: &str) -> Result<bool, StoreError> {
        let path = Self::path_of(uri)?;
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn download(
        &self,
        url: &str,
        file_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<DownloadResult, StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let dir = tokio::fs::canonicalize(&self.dir).await?;
        let path = dir.join(file_name);
        debug!(url, path = %path.display(), "downloading artifact");

        match self.transfer(url, &path, progress).await {
            Ok(status) => Ok(DownloadResult {
                uri: Url::from_file_path(&path).ok().map(String::from),
                status: Some(status),
            }),
            Err(err) => {
                if let Err(e) = tokio::fs::remove_file(&path).await
                    && e.kind() != ErrorKind::NotFound
                {
                    warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
                }
                Err(err)
            }
        }
    }

    async fn to_platform_uri(&self, uri: &str) -> Result<String, StoreError> {
        let path = Self::path_of(uri)?;
        let Some(authority) = &self.content_authority else {
            return Ok(uri.to_string());
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::InvalidUri(uri.to_string()))?;
        Ok(format!("content://{authority}/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::Mutex;

    fn store(dir: &Path) -> LocalFileStore {
        LocalFileStore::new(dir, reqwest::Client::new())
    }

    #[tokio::test]
    async fn lists_and_deletes_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("App_v1.apk"), b"1").unwrap();
        std::fs::write(tmp.path().join("App_v2.apk"), b"2").unwrap();

        let store = store(tmp.path());
        let mut names = store.list_dir().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["App_v1.apk", "App_v2.apk"]);

        store.delete("App_v1.apk").await.unwrap();
        // deleting again is fine
        store.delete("App_v1.apk").await.unwrap();
        assert_eq!(store.list_dir().await.unwrap(), vec!["App_v2.apk"]);
    }

    #[tokio::test]
    async fn listing_missing_directory_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp.path().join("missing"));
        assert!(store.list_dir().await.is_err());
    }

    #[tokio::test]
    async fn download_writes_file_and_reports_progress() {
        let server = MockServer::start_async().await;
        let payload = vec![7u8; 4096];
        server
            .mock_async(|when, then| {
                when.method(GET).path("/app-2.0.0.apk");
                then.status(200).body(payload.clone());
            })
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(&tmp.path().join("updates"));
        let seen = Mutex::new(Vec::new());
        let on_progress = |p: TransferProgress| seen.lock().unwrap().push(p);

        let result = store
            .download(&server.url("/app-2.0.0.apk"), "App_v10.apk", &on_progress)
            .await
            .unwrap();

        let uri = result.uri.expect("uri");
        assert!(uri.starts_with("file://"));
        assert!(uri.ends_with("/updates/App_v10.apk"));
        assert_eq!(result.status, Some(200));
        assert!(store.exists(&uri).await.unwrap());

        let seen = seen.into_inner().unwrap();
        let last = seen.last().copied().expect("progress reported");
        assert_eq!(last.written, 4096);
        assert_eq!(last.expected, Some(4096));
        assert!(seen.windows(2).all(|w| w[0].written <= w[1].written));
    }

    #[tokio::test]
    async fn failed_download_leaves_no_file() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.apk");
                then.status(404);
            })
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let err = store
            .download(&server.url("/missing.apk"), "App_v11.apk", &|_: TransferProgress| {})
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Transfer(msg) if msg.contains("404")));
        assert!(store.list_dir().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn platform_uri_uses_content_authority() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("App_v1.apk");
        let uri = Url::from_file_path(&path).unwrap().to_string();

        let plain = store(tmp.path());
        assert_eq!(plain.to_platform_uri(&uri).await.unwrap(), uri);

        let shared = store(tmp.path()).with_content_authority(Some("com.example.files".into()));
        assert_eq!(
            shared.to_platform_uri(&uri).await.unwrap(),
            "content://com.example.files/App_v1.apk"
        );
    }

    #[tokio::test]
    async fn exists_rejects_non_file_uris() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert!(matches!(
            store.exists("https://example.com/App_v1.apk").await,
            Err(StoreError::InvalidUri(_))
        ));
        let missing = Url::from_file_path(tmp.path().join("nope.apk")).unwrap();
        assert!(!store.exists(missing.as_str()).await.unwrap());
    }
}
