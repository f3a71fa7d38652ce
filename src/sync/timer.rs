//! Deadline tracking for a single outstanding connection attempt.

/// Optional absolute expiry (monotonic milliseconds).
///
/// Armed only while an association has been requested and has not yet
/// completed; cleared on success, timeout and explicit release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionTimer {
    deadline_ms: Option<u64>,
}

impl ConnectionTimer {
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Arm the timer. Re-arming replaces the previous deadline.
    pub fn start(&mut self, deadline_ms: u64) {
        self.deadline_ms = Some(deadline_ms);
    }

    /// `true` once `now_ms` is strictly past the deadline. Always `false`
    /// when no attempt is outstanding.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|deadline| deadline < now_ms)
    }

    pub fn clear(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline_ms
    }
}
