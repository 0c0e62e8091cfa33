//! Foreground/background coordination for reminder checks.
//!
//! When one or more foreground contexts are alive, a background wake-up
//! delegates the check to them (they hold the freshest task data). Only when
//! none are reachable does the background context check on its own.

use tokio::sync::mpsc;

use super::SchedulerCommand;

const FOREGROUND_CHANNEL_CAPACITY: usize = 8;

/// What a background wake-up decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delegation {
    /// The check was handed to this many foreground contexts.
    Delegated(usize),
    /// No foreground context is reachable; the caller checks itself.
    CheckLocally,
}

/// User response to a delivered reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    Open,
    Snooze,
}

impl ReminderAction {
    pub fn from_action_key(key: &str) -> Option<Self> {
        match key {
            "open" => Some(Self::Open),
            "snooze" => Some(Self::Snooze),
            _ => None,
        }
    }

    pub fn action_key(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Snooze => "snooze",
        }
    }
}

/// Tracks live foreground contexts and routes check requests to them.
#[derive(Default)]
pub struct BackgroundCoordinator {
    foregrounds: Vec<mpsc::Sender<SchedulerCommand>>,
}

impl BackgroundCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a foreground context; the returned receiver feeds its
    /// scheduler's control channel. Dropping the receiver deregisters it.
    pub fn register_foreground(&mut self) -> mpsc::Receiver<SchedulerCommand> {
        let (sender, receiver) = mpsc::channel(FOREGROUND_CHANNEL_CAPACITY);
        self.foregrounds.push(sender);
        receiver
    }

    pub fn foreground_count(&self) -> usize {
        self.foregrounds.iter().filter(|s| !s.is_closed()).count()
    }

    /// Route a periodic wake-up. Dead foregrounds are pruned first.
    pub async fn dispatch_check(&mut self) -> Delegation {
        self.foregrounds.retain(|sender| !sender.is_closed());

        let mut delivered = 0;
        for sender in &self.foregrounds {
            if sender.send(SchedulerCommand::CheckNow).await.is_ok() {
                delivered += 1;
            }
        }

        if delivered == 0 {
            Delegation::CheckLocally
        } else {
            Delegation::Delegated(delivered)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_foregrounds_checks_locally() {
        let mut coordinator = BackgroundCoordinator::new();
        assert_eq!(coordinator.dispatch_check().await, Delegation::CheckLocally);
    }

    #[tokio::test]
    async fn test_live_foregrounds_receive_check_request() {
        let mut coordinator = BackgroundCoordinator::new();
        let mut first = coordinator.register_foreground();
        let mut second = coordinator.register_foreground();

        assert_eq!(coordinator.dispatch_check().await, Delegation::Delegated(2));
        assert_eq!(first.recv().await, Some(SchedulerCommand::CheckNow));
        assert_eq!(second.recv().await, Some(SchedulerCommand::CheckNow));
    }

    #[tokio::test]
    async fn test_dropped_foreground_falls_back_to_local_check() {
        let mut coordinator = BackgroundCoordinator::new();
        let receiver = coordinator.register_foreground();
        drop(receiver);

        assert_eq!(coordinator.dispatch_check().await, Delegation::CheckLocally);
        assert_eq!(coordinator.foreground_count(), 0);
    }

    #[test]
    fn test_action_keys_round_trip() {
        assert_eq!(
            ReminderAction::from_action_key("open"),
            Some(ReminderAction::Open)
        );
        assert_eq!(
            ReminderAction::from_action_key("snooze"),
            Some(ReminderAction::Snooze)
        );
        assert_eq!(ReminderAction::from_action_key("dismiss"), None);
        assert_eq!(ReminderAction::Snooze.action_key(), "snooze");
    }
}
