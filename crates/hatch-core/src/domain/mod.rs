//! Domain model (versions, artifacts, notices, errors).
//!
//! ここには I/O を含めません。ports にも app 層にも依存しない、
//! 純粋なデータ型と判定ロジックだけを置きます。

pub mod artifact;
pub mod errors;
pub mod notice;
pub mod version;

pub use self::artifact::ArtifactNaming;
pub use self::errors::{DownloadError, InstallError, LaunchFailureKind, NetworkError, UpdateError};
pub use self::notice::{Notice, Severity};
pub use self::version::{RemoteManifest, VersionInfo, compare_versions, is_update_available};
