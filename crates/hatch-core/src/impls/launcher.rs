//! Installer launchers
//!
//! - **AmStartLauncher**: Android の activity manager（`am start`）で VIEW intent を投げる
//! - **UnsupportedLauncher**: 直接インストールできないプラットフォーム用

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::ports::{
    FLAG_GRANT_READ_URI_PERMISSION, FLAG_NEW_TASK, InstallIntent, InstallerLauncher, LaunchError,
    PlatformSupport,
};

/// Launches the package installer through `am start`.
pub struct AmStartLauncher {
    program: String,
}

impl AmStartLauncher {
    pub fn new() -> Self {
        Self::with_program("am")
    }

    /// Use a different `am` binary (e.g. a wrapper script).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for `am` equivalent to `intent`.
    pub fn args(intent: &InstallIntent) -> Vec<String> {
        let mut args = vec![
            "start".to_string(),
            "-a".to_string(),
            intent.action.clone(),
            "-d".to_string(),
            intent.data_uri.clone(),
            "-t".to_string(),
            intent.media_type.clone(),
        ];
        if intent.has_flag(FLAG_NEW_TASK) {
            args.push("--activity-new-task".to_string());
        }
        if intent.has_flag(FLAG_GRANT_READ_URI_PERMISSION) {
            args.push("--grant-read-uri-permission".to_string());
        }
        args
    }
}

impl Default for AmStartLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstallerLauncher for AmStartLauncher {
    fn platform_support(&self) -> PlatformSupport {
        if cfg!(target_os = "android") {
            PlatformSupport::Supported
        } else {
            PlatformSupport::Unsupported {
                platform: std::env::consts::OS.to_string(),
            }
        }
    }

    async fn launch(&self, intent: &InstallIntent) -> Result<(), LaunchError> {
        let args = Self::args(intent);
        debug!(program = %self.program, ?args, "launching installer");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| LaunchError::new(format!("failed to run {}: {e}", self.program)))?;

        // am reports most failures on stdout with a zero exit code
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || stdout.contains("Error:") || stderr.contains("Error:") {
            let message = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if message.is_empty() {
                return Err(LaunchError::new(format!(
                    "{} exited with {}",
                    self.program, output.status
                )));
            }
            return Err(LaunchError::new(message));
        }
        Ok(())
    }
}

/// Reports every platform as unsupported.
pub struct UnsupportedLauncher {
    platform: String,
}

impl UnsupportedLauncher {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    pub fn current() -> Self {
        Self::new(std::env::consts::OS)
    }
}

#[async_trait]
impl InstallerLauncher for UnsupportedLauncher {
    fn platform_support(&self) -> PlatformSupport {
        PlatformSupport::Unsupported {
            platform: self.platform.clone(),
        }
    }

    async fn launch(&self, _intent: &InstallIntent) -> Result<(), LaunchError> {
        Err(LaunchError::new(format!(
            "installing packages is not supported on {}",
            self.platform
        )))
    }
}

/// The launcher for the platform this binary was built for.
pub fn platform_launcher() -> Arc<dyn InstallerLauncher> {
    if cfg!(target_os = "android") {
        Arc::new(AmStartLauncher::new())
    } else {
        Arc::new(UnsupportedLauncher::current())
    }
}
