use tokio::sync::mpsc;

use crate::types::Notification;

/// Notification channel sender: the runtime pushes toasts here.
pub type NotificationSender = mpsc::Sender<Notification>;
/// Notification channel receiver: the UI consumes from here.
pub type NotificationReceiver = mpsc::Receiver<Notification>;

/// Create a notification channel with the given buffer size.
pub fn channel(buffer: usize) -> (NotificationSender, NotificationReceiver) {
    mpsc::channel(buffer)
}
