use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(all(unix, not(target_os = "macos")))]
use notify_rust::NotificationHandle;
use notify_rust::{Notification, Timeout};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::NotificationSink;
use crate::error::EffectError;

const APP_NAME: &str = "Pomobloom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Desktop notifications through `notify-rust`.
///
/// Permission is decided once at start-up. A display failure revokes it,
/// so a missing notification daemon costs one warning, not one per cycle.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    granted: Arc<AtomicBool>,
}

impl DesktopNotifier {
    /// Settle the notification permission for the process lifetime.
    pub fn request_permission(enabled: bool) -> Self {
        let notifier = Self {
            granted: Arc::new(AtomicBool::new(enabled)),
        };
        debug!(permission = ?notifier.permission(), "notification permission");
        notifier
    }

    pub fn permission(&self) -> Permission {
        if self.granted.load(Ordering::Relaxed) {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn show(
        &self,
        title: &str,
        body: &str,
        timeout: Timeout,
        dismiss_after: Option<Duration>,
    ) -> Result<(), EffectError> {
        if self.permission() == Permission::Denied {
            return Err(EffectError::PermissionDenied);
        }

        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .timeout(timeout);

        let granted = Arc::clone(&self.granted);
        // The D-Bus round trip blocks; keep it off the driver task.
        let shown = tokio::task::spawn_blocking(move || match notification.show() {
            Ok(handle) => Some(handle),
            Err(e) => {
                let e = EffectError::Notification(e.to_string());
                warn!(error = %e, "disabling notifications");
                granted.store(false, Ordering::Relaxed);
                None
            }
        });
        if let Some(after) = dismiss_after {
            close_after(shown, after, close_handle);
        }
        Ok(())
    }
}

/// Close a shown notification once `after` has elapsed. The expire hint
/// passed at display time is not honoured by every daemon.
fn close_after<H, F>(shown: JoinHandle<Option<H>>, after: Duration, close: F)
where
    H: Send + 'static,
    F: FnOnce(H) + Send + 'static,
{
    tokio::spawn(async move {
        let Ok(Some(handle)) = shown.await else {
            return;
        };
        tokio::time::sleep(after).await;
        if let Err(e) = tokio::task::spawn_blocking(move || close(handle)).await {
            debug!(error = %e, "notification close task failed");
        }
    });
}

#[cfg(all(unix, not(target_os = "macos")))]
fn close_handle(handle: NotificationHandle) {
    handle.close();
}

// macOS and Windows rely on the expire hint alone.
#[cfg(not(all(unix, not(target_os = "macos"))))]
fn close_handle<H>(_handle: H) {}

impl NotificationSink for DesktopNotifier {
    fn request_transient(
        &self,
        title: &str,
        body: &str,
        auto_dismiss: Duration,
    ) -> Result<(), EffectError> {
        let millis = u32::try_from(auto_dismiss.as_millis()).unwrap_or(u32::MAX);
        self.show(
            title,
            body,
            Timeout::Milliseconds(millis),
            Some(auto_dismiss),
        )
    }

    fn request_persistent(&self, title: &str, body: &str) -> Result<(), EffectError> {
        self.show(title, body, Timeout::Never, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_notifier_denies_requests() {
        let notifier = DesktopNotifier::request_permission(false);
        assert_eq!(notifier.permission(), Permission::Denied);
        assert!(matches!(
            notifier.request_persistent("t", "b"),
            Err(EffectError::PermissionDenied)
        ));
        assert!(matches!(
            notifier.request_transient("t", "b", Duration::from_secs(4)),
            Err(EffectError::PermissionDenied)
        ));
    }

    #[test]
    fn enabled_notifier_starts_granted() {
        let notifier = DesktopNotifier::request_permission(true);
        assert_eq!(notifier.permission(), Permission::Granted);
    }

    #[tokio::test(start_paused = true)]
    async fn shown_notification_is_closed_after_dismiss_delay() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);
        let shown = tokio::spawn(async { Some(7u32) });
        close_after(shown, Duration::from_secs(4), move |id| {
            assert_eq!(id, 7);
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(3900)).await;
        assert!(!closed.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(200)).await;
        // Let the blocking close run to completion.
        for _ in 0..50 {
            if closed.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_display_is_never_closed() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);
        let shown = tokio::spawn(async { None::<u32> });
        close_after(shown, Duration::from_secs(4), move |_| {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(!closed.load(Ordering::SeqCst));
    }
}
