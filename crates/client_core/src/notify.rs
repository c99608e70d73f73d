use tokio::time::{Duration, Instant};

use crate::activity::EntryKind;

/// How long a notification stays visible, measured from the moment it was
/// shown.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: EntryKind,
}

/// Single-slot message surface. A newer notification preempts the current
/// one; nothing else dismisses it before its TTL elapses.
#[derive(Debug, Default)]
pub struct NotificationSlot {
    current: Option<(Notification, Instant)>,
}

impl NotificationSlot {
    pub fn show(&mut self, message: impl Into<String>, kind: EntryKind) -> Notification {
        let notification = Notification {
            message: message.into(),
            kind,
        };
        self.current = Some((notification.clone(), Instant::now()));
        notification
    }

    /// The visible notification, or `None` once the TTL has elapsed.
    pub fn current(&self) -> Option<&Notification> {
        match &self.current {
            Some((notification, shown_at)) if shown_at.elapsed() < NOTIFICATION_TTL => {
                Some(notification)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn newer_notification_preempts_the_current_one() {
        let mut slot = NotificationSlot::default();
        slot.show("first", EntryKind::Success);
        slot.show("second", EntryKind::Error);

        let visible = slot.current().expect("visible");
        assert_eq!(visible.message, "second");
        assert_eq!(visible.kind, EntryKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_ttl() {
        let mut slot = NotificationSlot::default();
        slot.show("saved", EntryKind::Success);

        tokio::time::advance(Duration::from_millis(2_900)).await;
        assert!(slot.current().is_some());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(slot.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slot_can_be_reused_after_expiry() {
        let mut slot = NotificationSlot::default();
        slot.show("first", EntryKind::Info);
        tokio::time::advance(NOTIFICATION_TTL + Duration::from_millis(1)).await;
        assert!(slot.current().is_none());

        slot.show("second", EntryKind::Info);
        assert_eq!(slot.current().expect("visible").message, "second");
    }
}
