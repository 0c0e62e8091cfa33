//! Desktop notification delivery for due reminders.

use notify_rust::{Notification, Timeout};

use crate::error::{Error, Result};
use crate::services::reminder::{Reminder, ReminderSink};

const SUMMARY: &str = "Task reminder";
const TIMEOUT_MS: u32 = 10_000;

/// Shows reminders as system notifications.
pub struct NotificationService {
    enabled: bool,
}

impl NotificationService {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn build(&self, reminder: &Reminder) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(SUMMARY)
            .body(&reminder.body())
            .timeout(Timeout::Milliseconds(TIMEOUT_MS));
        notification
    }

    /// Show the reminder and block a helper thread on the user's response,
    /// forwarding it to `actions`. Action buttons are only supported by the
    /// freedesktop notification protocol.
    #[cfg(all(unix, not(target_os = "macos")))]
    pub fn deliver_with_actions(
        &self,
        reminder: &Reminder,
        actions: tokio::sync::mpsc::Sender<super::reminder::coordinator::ReminderAction>,
    ) -> Result<()> {
        use super::reminder::coordinator::ReminderAction;

        if !self.enabled {
            return Ok(());
        }

        let handle = self
            .build(reminder)
            .hint(notify_rust::Hint::Custom(
                "x-dunst-stack-tag".to_string(),
                reminder.tag(),
            ))
            .action(ReminderAction::Open.action_key(), "Open")
            .action(ReminderAction::Snooze.action_key(), "Snooze")
            .show()
            .map_err(|err| Error::Notify(err.to_string()))?;

        std::thread::spawn(move || {
            handle.wait_for_action(|key| {
                if let Some(action) = ReminderAction::from_action_key(key) {
                    if actions.blocking_send(action).is_err() {
                        log::debug!("reminder action receiver dropped");
                    }
                }
            });
        });

        Ok(())
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderSink for NotificationService {
    fn deliver(&self, reminder: &Reminder) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.build(reminder)
            .show()
            .map_err(|err| Error::Notify(err.to_string()))?;
        Ok(())
    }
}
