//! Operation results paired with the notifications they produced

use modbot_core::events::Notification;

/// A service result plus the modlog notifications it emits
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub notifications: Vec<Notification>,
}

impl<T> Outcome<T> {
    /// No notification
    pub fn quiet(value: T) -> Self {
        Self {
            value,
            notifications: Vec::new(),
        }
    }

    pub fn notify(value: T, notification: Notification) -> Self {
        Self {
            value,
            notifications: vec![notification],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            notifications: self.notifications,
        }
    }
}
