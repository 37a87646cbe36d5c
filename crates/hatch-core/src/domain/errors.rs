//! Errors - 操作ごとのエラー型
//!
//! - NetworkError: バージョン確認（manifest 取得）の失敗
//! - DownloadError: artifact 転送の失敗
//! - InstallError: インストール起動の失敗（not-found / unsupported / launch）
//!
//! UpdateError はこれらをまとめる上位のエラーです。

use thiserror::Error;

use crate::ports::StoreError;

/// Failure of a single manifest fetch.
///
/// The retry loop treats every variant the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("manifest request failed with HTTP {status}")]
    Status { status: u16 },

    #[error("manifest request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("manifest request was cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Failure of a single artifact download attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("artifact transfer failed: {0}")]
    Transfer(#[from] StoreError),

    #[error("download of {file_name} finished without a file uri")]
    MissingUri { file_name: String },
}

/// How a launch failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchFailureKind {
    /// No installed activity can open the package.
    NoHandler,
    /// Installing from unknown sources is not permitted.
    PermissionDenied,
    Unknown,
}

impl LaunchFailureKind {
    /// Classify a launcher error message by its text.
    pub fn classify(message: &str) -> Self {
        if message.contains("Activity not found") {
            LaunchFailureKind::NoHandler
        } else if message.contains("permission") {
            LaunchFailureKind::PermissionDenied
        } else {
            LaunchFailureKind::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    #[error("artifact not found: {uri}")]
    NotFound { uri: String },

    #[error("installing packages is not supported on {platform}")]
    Unsupported { platform: String },

    #[error("failed to launch installer: {message}")]
    Launch {
        kind: LaunchFailureKind,
        message: String,
    },
}

impl InstallError {
    pub fn launch(message: impl Into<String>) -> Self {
        let message = message.into();
        InstallError::Launch {
            kind: LaunchFailureKind::classify(&message),
            message,
        }
    }
}

/// Any failure surfaced by the update client.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("version check failed: {0}")]
    Network(#[from] NetworkError),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("install failed: {0}")]
    Install(#[from] InstallError),
}
