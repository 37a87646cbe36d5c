//! プロセス全体で共有する UpdateClient
//!
//! 一度設定したら差し替えられません。初期化は最初の呼び出し元が行います。

use std::sync::OnceLock;

use super::builder::BuildError;
use super::client::UpdateClient;

static GLOBAL: OnceLock<UpdateClient> = OnceLock::new();

/// Install `client` as the process-wide instance.
pub fn install_global(client: UpdateClient) -> Result<&'static UpdateClient, BuildError> {
    GLOBAL.set(client).map_err(|_| BuildError::AlreadyInstalled)?;
    GLOBAL.get().ok_or(BuildError::AlreadyInstalled)
}

/// The process-wide instance, if one was installed.
pub fn global() -> Option<&'static UpdateClient> {
    GLOBAL.get()
}

/// The process-wide instance, building it with `init` on first use.
///
/// If two callers race, both may run `init` but only the first result is
/// kept and returned to both.
pub fn global_or_try_init<F>(init: F) -> Result<&'static UpdateClient, BuildError>
where
    F: FnOnce() -> Result<UpdateClient, BuildError>,
{
    if let Some(client) = GLOBAL.get() {
        return Ok(client);
    }
    let client = init()?;
    // losing the race drops our instance
    let _ = GLOBAL.set(client);
    GLOBAL.get().ok_or(BuildError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UpdateClientBuilder;
    use crate::config::UpdateConfig;
    use crate::impls::memory::{InMemoryFileStore, RecordingLauncher, ScriptedFetcher};
    use std::sync::Arc;

    fn client(version: &str) -> Result<UpdateClient, BuildError> {
        UpdateClientBuilder::new(UpdateConfig {
            manifest_url: "https://updates.example.com/manifest.json".into(),
            download_url_template: "https://updates.example.com/app-{version}.apk".into(),
            current_version: version.into(),
            ..UpdateConfig::default()
        })
        .fetcher(Arc::new(ScriptedFetcher::default()))
        .file_store(Arc::new(InMemoryFileStore::new()))
        .launcher(Arc::new(RecordingLauncher::supported()))
        .build()
    }

    // the static is shared by the whole test binary, so the lifecycle is one test
    #[test]
    fn global_is_initialised_once() {
        let failed = global_or_try_init(|| Err(BuildError::MissingPorts(vec!["fetcher"])));
        assert!(matches!(failed, Err(BuildError::MissingPorts(_))));
        assert!(global().is_none());

        let first = global_or_try_init(|| client("1.0.0")).unwrap();
        assert_eq!(first.current_version(), "1.0.0");

        let again = global_or_try_init(|| client("9.9.9")).unwrap();
        assert!(std::ptr::eq(first, again));

        assert!(matches!(
            install_global(client("2.0.0").unwrap()),
            Err(BuildError::AlreadyInstalled)
        ));
        assert_eq!(global().map(UpdateClient::current_version), Some("1.0.0"));
    }
}
