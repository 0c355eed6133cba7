use std::fmt;

use chrono::{Local, NaiveDateTime};

const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Timestamp shared by every artifact of one invocation.
///
/// Captured once at startup. Second resolution: two single-mode invocations
/// started within the same second produce the same stamp and therefore the
/// same output paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunStamp(String);

impl RunStamp {
    /// Captures the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.format(STAMP_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
