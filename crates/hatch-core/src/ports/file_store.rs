//! FileStore port - アプリ専用ディレクトリのファイル操作
//!
//! FileStore は artifact ディレクトリにスコープされます。
//! 一覧と削除はディレクトリ内のファイル名、存在確認と URI 変換は
//! ダウンロード結果として返した file URI を受け取ります。
//!
//! # 実装
//! - **LocalFileStore**: 本番用（`impls::local_store`）
//! - **InMemoryFileStore**: テスト用（`impls::memory`）

use async_trait::async_trait;
use thiserror::Error;

/// Cumulative progress of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub written: u64,
    /// `None` (or `Some(0)`) when the total size is unknown.
    pub expected: Option<u64>,
}

impl TransferProgress {
    /// `floor(written / expected * 100)`, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<u64> {
        match self.expected {
            Some(expected) if expected > 0 => {
                let percent = u128::from(self.written) * 100 / u128::from(expected);
                Some(u64::try_from(percent).unwrap_or(u64::MAX))
            }
            _ => None,
        }
    }
}

/// Progress callback handed to [`FileStore::download`].
pub type ProgressFn<'a> = &'a (dyn Fn(TransferProgress) + Send + Sync);

/// Result of a nominally successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// Local file URI of the written artifact.
    pub uri: Option<String>,
    /// HTTP status of the transfer, when the store knows it.
    pub status: Option<u16>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid file uri: {0}")]
    InvalidUri(String),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// FileStore は artifact ディレクトリへのアクセスを提供
///
/// # 契約
/// - `delete` は冪等（存在しないファイルの削除はエラーにしない）
/// - `download` は `progress` に累積バイト数を渡す
/// - `to_platform_uri` はインストーラが読める URI を返す（no-op の場合もある）
#[async_trait]
pub trait FileStore: Send + Sync {
    /// ディレクトリ内のエントリ名一覧
    async fn list_dir(&self) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, name: &str) -> Result<(), StoreError>;

    async fn exists(&self, uri: &str) -> Result<bool, StoreError>;

    /// `url` を `file_name` としてダウンロードする
    async fn download(
        &self,
        url: &str,
        file_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<DownloadResult, StoreError>;

    async fn to_platform_uri(&self, uri: &str) -> Result<String, StoreError>;
}
