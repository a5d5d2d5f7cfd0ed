//! Store events surfaced to presentation layers.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Transient user-facing signal, the toast equivalent.
    Notice { kind: NoticeKind, message: String },
    /// The server no longer recognizes the session; a logout was forced.
    SessionExpired,
    /// A background refresh failed; distinct from action notices so UI can
    /// render a persistent indicator.
    SyncFailed { message: String },
}

impl StoreEvent {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Notice { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Notice { kind: NoticeKind::Error, message: message.into() }
    }
}
