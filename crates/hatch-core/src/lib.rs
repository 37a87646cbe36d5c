//! hatch-core
//!
//! Core building blocks for the hatch self-update client.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（version, artifact naming, errors, notices）
//! - **ports**: 抽象化レイヤー（NetworkFetcher, FileStore, InstallerLauncher, NotificationSink, Clock）
//! - **app**: アプリケーションロジック（UpdateClient, builder, retry, global）
//! - **impls**: 実装（reqwest / ローカルファイル / am start / tracing と、テスト用の in-memory）
//! - **config**: UpdateConfig（JSON）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{BuildError, UpdateClient, UpdateClientBuilder, UpdateOutcome};
pub use config::{ConfigError, UpdateConfig};
pub use domain::{
    DownloadError, InstallError, NetworkError, UpdateError, VersionInfo, compare_versions,
};
