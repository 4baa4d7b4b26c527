use crate::session::schedule::Millis;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub expires_at: Millis,
}

/// Queue of auto-dismissing notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    duration: Millis,
    queue: Vec<Notification>,
}

impl Notifier {
    pub fn new(duration: Millis) -> Self {
        Self { duration, queue: Vec::new() }
    }

    pub fn post(&mut self, level: Level, message: impl Into<String>, now: Millis) {
        self.queue.push(Notification {
            level,
            message: message.into(),
            expires_at: now.saturating_add(self.duration),
        });
    }

    /// Drop expired notifications
    pub fn dismiss_expired(&mut self, now: Millis) {
        self.queue.retain(|n| n.expires_at > now);
    }

    /// Notifications still visible at `now`
    pub fn active(&self, now: Millis) -> impl Iterator<Item = &Notification> {
        self.queue.iter().filter(move |n| n.expires_at > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_expire() {
        let mut notifier = Notifier::new(3000);
        notifier.post(Level::Error, "Could not export image", 100);
        assert_eq!(notifier.active(3099).count(), 1);
        assert_eq!(notifier.active(3100).count(), 0);

        notifier.dismiss_expired(5000);
        assert_eq!(notifier.active(0).count(), 0);
    }
}
