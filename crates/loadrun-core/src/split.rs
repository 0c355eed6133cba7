//! Per-category distribution of a `--users` override across plan phases.

/// One phase's share of the total user count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseShare {
    /// Engine parameter that receives this phase's user count.
    pub parameter: &'static str,
    /// Whole-number percentage of the override.
    pub percent: u32,
}

/// A phase with its computed user count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseUsers {
    pub parameter: &'static str,
    pub users: u32,
}

/// How a test category consumes a user-count override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Split across named phases by fixed percentages.
    Phases(&'static [PhaseShare]),
    /// The plan exposes no user-count parameters; the override is not applied.
    Unsupported,
}

impl SplitPolicy {
    pub const ENTERPRISE_BACKEND: Self = Self::Phases(&[
        PhaseShare {
            parameter: "browse_users",
            percent: 40,
        },
        PhaseShare {
            parameter: "shopping_users",
            percent: 40,
        },
        PhaseShare {
            parameter: "checkout_users",
            percent: 20,
        },
    ]);

    pub const UI: Self = Self::Phases(&[
        PhaseShare {
            parameter: "homepage_users",
            percent: 33,
        },
        PhaseShare {
            parameter: "shopping_users",
            percent: 50,
        },
        PhaseShare {
            parameter: "checkout_users",
            percent: 17,
        },
    ]);

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Phases(_))
    }

    /// Splits `users` across phases.
    ///
    /// Each share is truncated independently; the parts are not re-normalised,
    /// so their sum may fall short of `users`. Returns `None` when unsupported.
    pub fn apply(&self, users: u32) -> Option<Vec<PhaseUsers>> {
        match self {
            Self::Phases(shares) => Some(
                shares
                    .iter()
                    .map(|share| PhaseUsers {
                        parameter: share.parameter,
                        users: (u64::from(users) * u64::from(share.percent) / 100) as u32,
                    })
                    .collect(),
            ),
            Self::Unsupported => None,
        }
    }
}
