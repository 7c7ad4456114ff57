use deck_protocol::{MsgToUi, NotifyKind, ipc::UiTx};
use tracing::{debug, info};

use crate::{Error, Result};

/// Sends status text and redraw requests to the UI layer.
#[derive(Clone, Debug)]
pub struct NotificationDispatcher {
    /// UI message channel.
    tx: UiTx,
}

impl NotificationDispatcher {
    /// Create a new dispatcher from a UI message channel.
    pub fn new(tx: UiTx) -> Self {
        Self { tx }
    }

    /// Send a raw message.
    pub fn send(&self, msg: MsgToUi) -> Result<()> {
        self.tx.send(msg).map_err(|_| Error::ChannelClosed)
    }

    /// Send a notification with the given kind, title, and text.
    pub fn send_notification(&self, kind: NotifyKind, title: &str, text: String) -> Result<()> {
        // Always log notification displays at info level, regardless of urgency.
        info!(kind = ?kind, title = %title, text = %text, "notification_display");
        self.send(MsgToUi::Notify {
            kind,
            title: title.to_string(),
            text,
        })
    }

    /// Convenience helper to send an error notification.
    pub fn send_error(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Error, title, text)
    }

    /// Convenience helper to send a warning.
    pub fn send_warn(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Warn, title, text)
    }

    /// Convenience helper to send an informational message.
    pub fn send_info(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Info, title, text)
    }

    /// Convenience helper to confirm a completed operation.
    pub fn send_success(&self, title: &str, text: String) -> Result<()> {
        self.send_notification(NotifyKind::Success, title, text)
    }

    /// Ask the UI to dismiss every visible notification.
    pub fn clear(&self) -> Result<()> {
        debug!("notifications_cleared");
        self.send(MsgToUi::ClearNotifications)
    }

    /// Surface an action failure. Never fails: a closed UI channel only
    /// means nobody is listening.
    pub fn report(&self, title: &str, err: &Error) {
        let sent = match err {
            Error::NotConfigured { .. } | Error::DanglingReference { .. } => {
                self.send_warn(title, err.to_string())
            }
            _ => self.send_error(title, err.to_string()),
        };
        if sent.is_err() {
            debug!("notification_dropped");
        }
    }
}
