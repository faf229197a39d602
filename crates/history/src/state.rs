use std::fmt;

/// Lifecycle of a history subscription.
///
/// ```text
/// Uninitialized → AwaitingUser → Subscribed → Updating | Erroring → Unsubscribed
/// ```
///
/// `Unsubscribed` is terminal. `Erroring` is never left except by
/// unsubscribing; there is no automatic reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryState {
    #[default]
    Uninitialized,
    /// Waiting for the session to resolve a user.
    AwaitingUser,
    /// Live query open; no snapshot delivered yet.
    Subscribed,
    /// At least one snapshot delivered.
    Updating,
    /// The live query failed and delivered its final update.
    Erroring,
    Unsubscribed,
}

impl HistoryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HistoryState::Unsubscribed)
    }

    /// Whether moving to `next` follows the lifecycle.
    pub fn can_transition_to(&self, next: HistoryState) -> bool {
        use HistoryState::*;
        match (self, next) {
            (Unsubscribed, _) => false,
            (_, Unsubscribed) => true,
            (Uninitialized, AwaitingUser) => true,
            (AwaitingUser, Subscribed | Erroring) => true,
            (Subscribed, Updating | Erroring) => true,
            (Updating, Updating | Erroring) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HistoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryState::Uninitialized => write!(f, "Uninitialized"),
            HistoryState::AwaitingUser => write!(f, "AwaitingUser"),
            HistoryState::Subscribed => write!(f, "Subscribed"),
            HistoryState::Updating => write!(f, "Updating"),
            HistoryState::Erroring => write!(f, "Erroring"),
            HistoryState::Unsubscribed => write!(f, "Unsubscribed"),
        }
    }
}
