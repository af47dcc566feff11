use autopdf_converter::{Notification, NotificationLevel, Notifier};
use tracing::{error, info, warn};

/// Reports pipeline notifications through the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            level,
            title,
            message,
        } = notification;

        match level {
            NotificationLevel::Info => info!(target: "autopdf::notification", "{title}: {message}"),
            NotificationLevel::Warning => warn!(target: "autopdf::notification", "{title}: {message}"),
            NotificationLevel::Error => error!(target: "autopdf::notification", "{title}: {message}"),
        }
    }
}
