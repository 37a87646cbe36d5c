//! User-visible notices.
//!
//! Each failure path has its own notice so the user can tell a failed check
//! from a failed download, and install failures apart by cause.

use serde::{Deserialize, Serialize};

use super::errors::{InstallError, LaunchFailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn check_failed() -> Self {
        Self::new(
            Severity::Error,
            "Update check failed",
            "Could not reach the update server. Please check your connection and try again.",
        )
    }

    pub fn download_failed() -> Self {
        Self::new(
            Severity::Error,
            "Download failed",
            "The update could not be downloaded. Please try again later.",
        )
    }

    pub fn install_not_found() -> Self {
        Self::new(
            Severity::Error,
            "Update file missing",
            "The downloaded update could not be found. Please download it again.",
        )
    }

    pub fn install_unsupported() -> Self {
        Self::new(
            Severity::Warning,
            "Not supported",
            "Installing updates is not supported on this platform.",
        )
    }

    pub fn install_no_handler() -> Self {
        Self::new(
            Severity::Error,
            "Cannot open update",
            "No app on this device can open the update file.",
        )
    }

    pub fn install_permission_required() -> Self {
        Self::new(
            Severity::Warning,
            "Permission required",
            "Allow installing apps from unknown sources in Settings, then try again.",
        )
    }

    pub fn install_unknown() -> Self {
        Self::new(
            Severity::Error,
            "Install failed",
            "An unknown error occurred while starting the installation.",
        )
    }

    /// Notice matching the cause of an install failure.
    pub fn for_install_error(err: &InstallError) -> Self {
        match err {
            InstallError::NotFound { .. } => Self::install_not_found(),
            InstallError::Unsupported { .. } => Self::install_unsupported(),
            InstallError::Launch { kind, .. } => match kind {
                LaunchFailureKind::NoHandler => Self::install_no_handler(),
                LaunchFailureKind::PermissionDenied => Self::install_permission_required(),
                LaunchFailureKind::Unknown => Self::install_unknown(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_notices_are_distinct_per_cause() {
        let errors = [
            InstallError::NotFound { uri: "file:///x.apk".into() },
            InstallError::Unsupported { platform: "ios".into() },
            InstallError::launch("Activity not found"),
            InstallError::launch("missing permission"),
            InstallError::launch("kaboom"),
        ];
        let titles: Vec<String> = errors
            .iter()
            .map(|e| Notice::for_install_error(e).title)
            .collect();

        for (i, a) in titles.iter().enumerate() {
            for b in &titles[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn check_and_download_notices_differ() {
        assert_ne!(Notice::check_failed(), Notice::download_failed());
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Notice::install_unsupported()).unwrap();
        assert!(json.contains(r#""severity":"warning""#));
    }
}
