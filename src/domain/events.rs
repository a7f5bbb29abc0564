//! Refresh command shared by every update channel.
//!
//! Both the server push stream and the poll fallback drive the scan list
//! through this one signal; neither channel mutates state directly. The
//! variant records why the refresh happened, for logging only - every signal
//! triggers the same authoritative re-fetch.

/// Why a list refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSignal {
    /// The server pushed a "something changed" notification.
    ServerPush,
    /// The poll fallback timer fired.
    PollTick,
    /// A lifecycle action (create/delete/halt/resume) completed.
    AfterAction,
    /// Explicit operator-initiated refresh.
    Manual,
}

impl std::fmt::Display for RefreshSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::ServerPush => "server-push",
            Self::PollTick => "poll-tick",
            Self::AfterAction => "after-action",
            Self::Manual => "manual",
        };
        write!(f, "{reason}")
    }
}
