//! NotificationSink port - ユーザーへの通知（トーストなど）
//!
//! fire-and-forget です。呼び出し側をブロックせず、失敗も返しません。

use crate::domain::Notice;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}
