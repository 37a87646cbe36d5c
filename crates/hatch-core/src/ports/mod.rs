//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait はアップデートクライアントが依存する外部機能
//! （HTTP、端末のファイルストア、OS のインストーラ起動、ユーザー通知）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - コア（app 層）は trait だけを知る
//! - 本番用の実装とテスト用の実装は `impls` に置く
//! - すべて `Send + Sync`（`Arc<dyn _>` で共有する前提）

pub mod clock;
pub mod fetcher;
pub mod file_store;
pub mod installer;
pub mod notifier;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::fetcher::{FetchResponse, NetworkFetcher};
pub use self::file_store::{DownloadResult, FileStore, ProgressFn, StoreError, TransferProgress};
pub use self::installer::{
    ACTION_VIEW, FLAG_GRANT_READ_URI_PERMISSION, FLAG_NEW_TASK, InstallIntent, InstallerLauncher,
    LaunchError, PACKAGE_MEDIA_TYPE, PlatformSupport,
};
pub use self::notifier::NotificationSink;
