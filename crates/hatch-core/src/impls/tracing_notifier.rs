//! TracingNotifier - 通知を tracing のログとして出す NotificationSink
//!
//! UI を持たない環境（CLI、バックグラウンドサービス）でのデフォルト。

use tracing::{error, info, warn};

use crate::domain::{Notice, Severity};
use crate::ports::NotificationSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let Notice {
            severity,
            title,
            body,
        } = notice;
        match severity {
            Severity::Info => info!(target: "hatch::notice", %title, "{body}"),
            Severity::Warning => warn!(target: "hatch::notice", %title, "{body}"),
            Severity::Error => error!(target: "hatch::notice", %title, "{body}"),
        }
    }
}
