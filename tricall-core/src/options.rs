//! # Call Options
//!
//! Protocol call configuration derived from a caller-supplied timeout. The
//! only field this core ever sets is the deadline; retries, compression and
//! the rest of the transport's knobs are deliberately out of scope here.
use std::time::{Duration, Instant};

/// Per-call protocol options.
///
/// The default options carry no deadline. Deadlines are enforced by the
/// transport, not by this core: [`CallOptions::time_remaining`] converts the
/// absolute deadline back into the relative form transports consume.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    deadline: Option<Instant>,
}

impl CallOptions {
    /// Builds options from an optional timeout in seconds.
    ///
    /// Absent timeout yields the default options (no deadline); a present
    /// timeout yields a deadline of now plus that many seconds.
    pub fn for_timeout(timeout_secs: Option<u64>) -> Self {
        Self {
            deadline: timeout_secs.map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }

    /// The absolute deadline, if one was requested.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline. Zero once the deadline has passed,
    /// `None` when no deadline was requested.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
