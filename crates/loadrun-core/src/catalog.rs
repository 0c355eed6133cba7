//! Static catalog of test types.
//!
//! Every runnable test type maps to exactly one test-plan file, a default load
//! shape and a JVM heap profile. The catalog is immutable and built at compile
//! time; lookups never touch the filesystem.

use std::fmt;

use crate::error::{LoadrunError, LoadrunResult};
use crate::split::SplitPolicy;

/// Token that selects the batch sequence instead of a single descriptor.
pub const ALL_TOKEN: &str = "all";

/// Basic test types executed by the batch, in order.
pub const BATCH_SEQUENCE: [&str; 5] = ["load", "stress", "spike", "soak", "stability"];

/// Broad family a test type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCategory {
    /// Single-scenario load shapes (load, stress, spike, soak, stability).
    Basic,
    /// Multi-phase backend journey (browse, shopping, checkout).
    EnterpriseBackend,
    /// Browser-level journey (homepage, shopping, checkout).
    Ui,
}

impl TestCategory {
    /// How a `--users` override is distributed across the plan's phases.
    pub fn split_policy(self) -> SplitPolicy {
        match self {
            Self::EnterpriseBackend => SplitPolicy::ENTERPRISE_BACKEND,
            Self::Ui => SplitPolicy::UI,
            Self::Basic => SplitPolicy::Unsupported,
        }
    }

    /// Prefix applied to the environment properties file name.
    pub fn properties_prefix(self) -> Option<&'static str> {
        match self {
            Self::Ui => Some("ui-"),
            Self::Basic | Self::EnterpriseBackend => None,
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "basic",
            Self::EnterpriseBackend => "enterprise-backend",
            Self::Ui => "ui",
        };
        f.write_str(name)
    }
}

/// JVM heap sizing bucket for the engine process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapProfile {
    Small,
    Medium,
    Large,
}

impl fmt::Display for HeapProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        f.write_str(name)
    }
}

/// Immutable description of one test type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTypeDescriptor {
    /// Canonical name used on the command line.
    pub name: &'static str,
    /// Alternative spellings accepted on the command line.
    pub aliases: &'static [&'static str],
    /// Test-plan file name, relative to the test-plans directory.
    pub plan_file: &'static str,
    /// Default concurrent users baked into the plan.
    pub default_users: u32,
    /// Default run length in seconds baked into the plan.
    pub default_duration_secs: u32,
    pub heap: HeapProfile,
    pub category: TestCategory,
}

impl TestTypeDescriptor {
    /// Returns true if `token` names this test type.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.contains(&token)
    }

    /// Lower-cased plan file stem, used to name every output artifact.
    pub fn test_name(&self) -> String {
        let stem = self
            .plan_file
            .rsplit_once('.')
            .map_or(self.plan_file, |(stem, _)| stem);
        stem.to_lowercase()
    }
}

const fn basic(
    name: &'static str,
    plan_file: &'static str,
    default_users: u32,
    default_duration_secs: u32,
    heap: HeapProfile,
) -> TestTypeDescriptor {
    TestTypeDescriptor {
        name,
        aliases: &[],
        plan_file,
        default_users,
        default_duration_secs,
        heap,
        category: TestCategory::Basic,
    }
}

static CATALOG: [TestTypeDescriptor; 7] = [
    basic("load", "Load_Test.jmx", 50, 300, HeapProfile::Small),
    basic("stress", "Stress_Test.jmx", 200, 600, HeapProfile::Medium),
    basic("spike", "Spike_Test.jmx", 500, 300, HeapProfile::Medium),
    basic("soak", "Soak_Test.jmx", 100, 3600, HeapProfile::Medium),
    basic("stability", "Stability_Test.jmx", 75, 1800, HeapProfile::Small),
    TestTypeDescriptor {
        name: "enterprise",
        aliases: &["enterprise-backend"],
        plan_file: "Enterprise_Backend_Test.jmx",
        default_users: 500,
        default_duration_secs: 900,
        heap: HeapProfile::Medium,
        category: TestCategory::EnterpriseBackend,
    },
    TestTypeDescriptor {
        name: "ui",
        aliases: &["enterprise-ui"],
        plan_file: "Enterprise_UI_Test.jmx",
        default_users: 300,
        default_duration_secs: 600,
        heap: HeapProfile::Large,
        category: TestCategory::Ui,
    },
];

/// What a test-type token asks the runner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSelection {
    Single(&'static TestTypeDescriptor),
    /// Run [`BATCH_SEQUENCE`] in order.
    All,
}

/// All descriptors, in catalog order.
pub fn descriptors() -> &'static [TestTypeDescriptor] {
    &CATALOG
}

/// Looks up a single test type by name or alias.
pub fn resolve(token: &str) -> LoadrunResult<&'static TestTypeDescriptor> {
    CATALOG
        .iter()
        .find(|descriptor| descriptor.matches(token))
        .ok_or_else(|| LoadrunError::UnknownTestType(token.to_string()))
}

/// Interprets a test-type token, including the batch token.
pub fn select(token: &str) -> LoadrunResult<TestSelection> {
    if token == ALL_TOKEN {
        return Ok(TestSelection::All);
    }
    resolve(token).map(TestSelection::Single)
}

/// Descriptors executed by the batch, in order.
pub fn batch_sequence() -> impl Iterator<Item = &'static TestTypeDescriptor> {
    BATCH_SEQUENCE
        .into_iter()
        .filter_map(|name| resolve(name).ok())
}
