//! InstallerLauncher port - OS のパッケージインストーラ起動
//!
//! 直接インストールできるのは 1 プラットフォーム（Android）だけです。
//! それ以外では `platform_support()` が `Unsupported` を返し、
//! app 層は起動を試みません。
//!
//! # 実装
//! - **AmStartLauncher**: Android（`am start`）
//! - **UnsupportedLauncher**: その他のプラットフォーム
//! - **RecordingLauncher**: テスト用（`impls::memory`）

use async_trait::async_trait;
use thiserror::Error;

pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
pub const PACKAGE_MEDIA_TYPE: &str = "application/vnd.android.package-archive";

pub const FLAG_NEW_TASK: u32 = 1;
pub const FLAG_GRANT_READ_URI_PERMISSION: u32 = 16;

/// Whether this launcher can install packages on the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSupport {
    Supported,
    Unsupported { platform: String },
}

/// The action handed to the platform launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallIntent {
    pub action: String,
    pub data_uri: String,
    pub media_type: String,
    pub flags: u32,
}

impl InstallIntent {
    /// Open an installable package in a fresh task with read access to `uri`.
    pub fn view_package(uri: impl Into<String>) -> Self {
        Self {
            action: ACTION_VIEW.to_string(),
            data_uri: uri.into(),
            media_type: PACKAGE_MEDIA_TYPE.to_string(),
            flags: FLAG_NEW_TASK | FLAG_GRANT_READ_URI_PERMISSION,
        }
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }
}

/// Launch failure with the platform's human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LaunchError {
    pub message: String,
}

impl LaunchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait InstallerLauncher: Send + Sync {
    fn platform_support(&self) -> PlatformSupport;

    async fn launch(&self, intent: &InstallIntent) -> Result<(), LaunchError>;
}
