//! Impls - ports の実装
//!
//! # 本番用
//! - **ReqwestFetcher**: reqwest による HTTP GET
//! - **LocalFileStore**: ローカルディレクトリ + ストリーミングダウンロード
//! - **AmStartLauncher / UnsupportedLauncher**: インストーラ起動
//! - **TracingNotifier**: 通知をログに流す
//!
//! # テスト用・開発用
//! - **memory**: ScriptedFetcher, InMemoryFileStore, RecordingLauncher, RecordingNotifier, SteppingClock

pub mod launcher;
pub mod local_store;
pub mod memory;
pub mod reqwest_fetcher;
pub mod tracing_notifier;

// 主要な型を再エクスポート
pub use self::launcher::{AmStartLauncher, UnsupportedLauncher, platform_launcher};
pub use self::local_store::LocalFileStore;
pub use self::reqwest_fetcher::ReqwestFetcher;
pub use self::tracing_notifier::TracingNotifier;
