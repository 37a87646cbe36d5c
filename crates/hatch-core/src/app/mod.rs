//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアップデートのユースケースを実装します。
//!
//! # 主要コンポーネント
//! - **UpdateClient**: バージョン確認・掃除・ダウンロード・インストール
//! - **UpdateClientBuilder**: ports のワイヤリングと起動時検証
//! - **RetryPolicy / retry_with_policy**: 線形バックオフ付きのリトライ
//! - **global**: プロセス全体で共有する UpdateClient

pub mod builder;
pub mod client;
pub mod global;
pub mod retry;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, UpdateClientBuilder};
pub use self::client::{PercentFn, UpdateClient, UpdateOutcome};
pub use self::global::{global, global_or_try_init, install_global};
pub use self::retry::{RetryPolicy, retry_with_policy};
